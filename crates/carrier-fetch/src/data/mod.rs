//! Immutable configuration types.
//!
//! Everything here is plain data: built once by the caller, then shared
//! read-only with the client and its downloaders.

mod config;
mod source;

pub use config::{DownloadConfig, HttpSettings};
pub use source::Source;
