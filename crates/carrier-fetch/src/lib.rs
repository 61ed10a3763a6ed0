//! Resumable, progress-observable single-file downloads.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable configuration and source resolution
//! - [`core`] - Pure helpers (range headers, status checks, percentages)
//! - `effects` - I/O behind the [`HttpClient`] and [`Downloader`] traits
//!
//! # Key Features
//!
//! - **Scheme Registry**: downloaders are picked by URL scheme from a
//!   [`DownloaderRegistry`]; new schemes are added by registration
//! - **Resume**: [`HttpDownloader`] continues partial files with `Range`
//!   requests when the server advertises byte ranges
//! - **Lock-Free Progress**: counters are atomics, readable from any task
//!   while a transfer runs
//! - **Verification**: an optional [`carrier_verify::Checksum`] is checked
//!   after the transfer, failing with a distinct error kind
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use carrier_fetch::{DownloadClient, DownloadConfig};
//!
//! # async fn run() -> carrier_fetch::Result<()> {
//! let config = DownloadConfig::new("https://example.com/image.iso", "image.iso");
//! let client = Arc::new(DownloadClient::new(config)?);
//!
//! let observer = client.clone();
//! tokio::spawn(async move {
//!     loop {
//!         println!("{}%", observer.percent_progress());
//!         tokio::time::sleep(std::time::Duration::from_millis(500)).await;
//!     }
//! });
//!
//! let path = client.get().await?;
//! println!("saved to {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
mod effects;
mod error;

pub use self::core::{UNKNOWN_PROGRESS, percent};
pub use data::{DownloadConfig, HttpSettings, Source};
pub use effects::{
    BodyResponse, BoxStream, DownloadClient, Downloader, DownloaderFactory, DownloaderRegistry,
    HttpClient, HttpDownloader, ProbeResponse, verify_file,
};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use error::{BoxError, Error, Result};
