use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{Error, Result};

/// Where the bytes of a download come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A URL whose scheme selects a registered downloader.
    Remote(Url),
    /// A file on the local filesystem, absolute.
    Local(PathBuf),
}

impl Source {
    /// Resolves a locator against the working directory.
    ///
    /// `file://` URLs and plain paths are local. Single-letter schemes are
    /// read as Windows drive letters (`C:\data\file.bin`).
    pub fn resolve(locator: &str, pwd: &Path) -> Result<Self> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(Error::InvalidUrl("empty source".to_string()));
        }

        match Url::parse(locator) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Source::Local)
                .map_err(|()| Error::InvalidUrl(locator.to_string())),
            Ok(url) if url.scheme().len() > 1 => Ok(Source::Remote(url)),
            Err(e) if locator.contains("://") => {
                Err(Error::InvalidUrl(format!("{locator}: {e}")))
            }
            _ => Ok(Source::Local(pwd.join(locator))),
        }
    }

    pub fn scheme(&self) -> &str {
        match self {
            Source::Remote(url) => url.scheme(),
            Source::Local(_) => "file",
        }
    }
}
