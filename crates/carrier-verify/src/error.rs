use std::io;

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("checksum mismatch: expected {}, got {}", hex::encode(expected), hex::encode(actual))]
    Mismatch {
        expected: Vec<u8>,
        actual:   Vec<u8>,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}

pub type Result<T> = std::result::Result<T, VerificationError>;
