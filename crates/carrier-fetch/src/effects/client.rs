use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::fs::{self, OpenOptions};
use tracing::{debug, error, info};
use url::Url;

use crate::core::{UNKNOWN_PROGRESS, percent};
use crate::data::{DownloadConfig, Source};
use crate::effects::checksum::verify_file;
use crate::effects::downloader::{Downloader, DownloaderRegistry};
use crate::error::{Error, Result};

/// Drives one logical download described by a [`DownloadConfig`].
///
/// [`get`](Self::get) runs on the caller's task. [`percent_progress`](Self::percent_progress)
/// and [`cancel`](Self::cancel) may be called from any other task meanwhile,
/// typically through an `Arc<DownloadClient>`.
pub struct DownloadClient {
    config:   Arc<DownloadConfig>,
    registry: Arc<DownloaderRegistry>,
    active:   RwLock<Option<Arc<dyn Downloader>>>,
}

impl DownloadClient {
    /// Freeze `config` and resolve its registry.
    ///
    /// Without an explicit registry, `http` and `https` map to a fresh
    /// [`HttpDownloader`](crate::HttpDownloader) per transfer, built from the
    /// config's HTTP settings. The default registry belongs to this client
    /// alone.
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let registry = match &config.registry {
            Some(registry) => registry.clone(),
            None => Arc::new(Self::default_registry(&config)?),
        };
        Ok(Self {
            config: Arc::new(config),
            registry,
            active: RwLock::new(None),
        })
    }

    #[cfg(feature = "reqwest")]
    fn default_registry(config: &DownloadConfig) -> Result<DownloaderRegistry> {
        DownloaderRegistry::with_http(&config.http)
    }

    #[cfg(not(feature = "reqwest"))]
    fn default_registry(_config: &DownloadConfig) -> Result<DownloaderRegistry> {
        Ok(DownloaderRegistry::new())
    }

    pub fn config(&self) -> &DownloadConfig { &self.config }

    pub fn registry(&self) -> &DownloaderRegistry { &self.registry }

    /// Fetch the source into the target path and verify it.
    ///
    /// Returns the path holding the content: the target path, or the source
    /// path itself for a local source when `copy_file` is off. On error the
    /// target may hold partial content and must not be trusted. Nothing is
    /// retried.
    pub async fn get(&self) -> Result<PathBuf> {
        let result = self.fetch().await;
        if let Err(e) = &result {
            error!(url = %self.config.url, error = %e, "error getting url");
        }
        result
    }

    async fn fetch(&self) -> Result<PathBuf> {
        let pwd = std::env::current_dir()?;
        let path = match Source::resolve(&self.config.url, &pwd)? {
            Source::Remote(url) => self.fetch_remote(&url).await?,
            Source::Local(path) => self.fetch_local(&path).await?,
        };

        if let Some(checksum) = &self.config.checksum {
            verify_file(&path, checksum).await?;
        }
        Ok(path)
    }

    async fn fetch_remote(&self, url: &Url) -> Result<PathBuf> {
        let downloader = self
            .registry
            .create(url.scheme())
            .ok_or_else(|| Error::UnsupportedScheme(url.scheme().to_string()))?;

        let target = &self.config.target_path;
        create_parent(target).await?;
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(target)
            .await?;

        *self.active.write() = Some(downloader.clone());
        downloader.download(&mut file, url).await?;
        file.sync_all().await?;

        Ok(target.clone())
    }

    async fn fetch_local(&self, path: &Path) -> Result<PathBuf> {
        let metadata = fs::metadata(path).await?;
        if metadata.is_dir() {
            return Err(Error::Filesystem(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", path.display()),
            )));
        }

        if !self.config.copy_file {
            debug!(path = %path.display(), "using local file in place");
            return Ok(path.to_path_buf());
        }

        let target = &self.config.target_path;
        if same_file(path, target).await {
            return Ok(target.clone());
        }

        create_parent(target).await?;
        let copied = fs::copy(path, target).await?;
        info!(from = %path.display(), to = %target.display(), bytes = copied, "copied local file");
        Ok(target.clone())
    }

    /// Whole percentage of the active transfer, or `-1` before one started.
    ///
    /// Reports `0` while the total size is still unknown.
    pub fn percent_progress(&self) -> i32 {
        match self.active.read().as_ref() {
            Some(downloader) => percent(downloader.progress(), downloader.total()),
            None => UNKNOWN_PROGRESS,
        }
    }

    /// `(bytes written, bytes expected)` of the active transfer.
    pub fn bytes_progress(&self) -> Option<(u64, u64)> {
        self.active
            .read()
            .as_ref()
            .map(|downloader| (downloader.progress(), downloader.total()))
    }

    /// Ask the active transfer to stop. Does nothing if none is running.
    pub fn cancel(&self) {
        if let Some(downloader) = self.active.read().as_ref() {
            downloader.cancel();
        }
    }
}

async fn create_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}

async fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a).await, fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
