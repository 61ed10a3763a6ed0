//! I/O: network transfers, file writes and the orchestrating client.
//!
//! Everything that touches a socket or the filesystem lives here, behind the
//! [`HttpClient`] and [`Downloader`] traits so tests can swap in mocks.

mod checksum;
mod client;
mod downloader;
mod http;
mod http_downloader;

pub use checksum::verify_file;
pub use client::DownloadClient;
pub use downloader::{Downloader, DownloaderFactory, DownloaderRegistry};
pub use http::{BodyResponse, BoxStream, HttpClient, ProbeResponse};
pub use http_downloader::HttpDownloader;

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
