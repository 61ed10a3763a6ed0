//! Error types for carrier-fetch.

use std::io;

use carrier_verify::VerificationError;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// DNS, connect, TLS or body read failure during the probe or the transfer.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("filesystem error: {0}")]
    Filesystem(#[from] io::Error),

    /// The transfer finished but the content does not match the expected digest.
    #[error(transparent)]
    Checksum(#[from] VerificationError),

    #[error("no downloader registered for scheme `{0}`")]
    UnsupportedScheme(String),

    #[error("download cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn transport(e: impl Into<BoxError>) -> Self { Error::Transport(e.into()) }

    /// `true` for checksum failures, where the bytes arrived but are wrong.
    pub fn is_checksum_mismatch(&self) -> bool {
        matches!(self, Error::Checksum(VerificationError::Mismatch { .. }))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
