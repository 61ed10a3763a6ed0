use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs::File;
use url::Url;

use crate::error::Result;

/// Moves the bytes behind a URL into an open file.
///
/// One instance serves one transfer. The counters are readable from other
/// tasks while [`download`](Downloader::download) runs.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Transfer `source` into `destination`.
    ///
    /// Each implementation decides where in `destination` writing starts.
    /// Called at most once per instance.
    async fn download(&self, destination: &mut File, source: &Url) -> Result<()>;

    /// Bytes written so far.
    fn progress(&self) -> u64;

    /// Expected final size, `0` while unknown.
    fn total(&self) -> u64;

    /// Ask an in-flight transfer to stop at the next chunk boundary.
    fn cancel(&self);
}

/// Creates a fresh [`Downloader`] for every transfer.
pub type DownloaderFactory = Arc<dyn Fn() -> Arc<dyn Downloader> + Send + Sync>;

/// Mapping from URL scheme to downloader factory.
///
/// Scheme keys are matched exactly (case-sensitive). New schemes are supported
/// by registering a factory, never by wrapping an existing downloader.
#[derive(Clone, Default)]
pub struct DownloaderRegistry {
    factories: HashMap<String, DownloaderFactory>,
}

impl DownloaderRegistry {
    pub fn new() -> Self { Self::default() }

    /// Registry with `http` and `https` mapped to an
    /// [`HttpDownloader`](crate::HttpDownloader) over one shared
    /// [`ReqwestClient`](crate::ReqwestClient).
    #[cfg(feature = "reqwest")]
    pub fn with_http(settings: &crate::data::HttpSettings) -> Result<Self> {
        use crate::effects::{HttpDownloader, ReqwestClient};

        let client = ReqwestClient::with_settings(settings)?;
        let settings = settings.clone();
        let factory: DownloaderFactory = Arc::new(move || {
            Arc::new(HttpDownloader::with_settings(client.clone(), &settings)) as Arc<dyn Downloader>
        });

        let mut registry = Self::new();
        registry.insert("http", factory.clone());
        registry.insert("https", factory);
        Ok(registry)
    }

    /// Register a factory for `scheme`, replacing any previous one.
    pub fn register<F>(&mut self, scheme: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn Downloader> + Send + Sync + 'static,
    {
        self.insert(scheme, Arc::new(factory));
    }

    pub fn insert(&mut self, scheme: impl Into<String>, factory: DownloaderFactory) {
        self.factories.insert(scheme.into(), factory);
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with<F>(mut self, scheme: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Downloader> + Send + Sync + 'static,
    {
        self.register(scheme, factory);
        self
    }

    pub fn get(&self, scheme: &str) -> Option<&DownloaderFactory> { self.factories.get(scheme) }

    /// A new downloader for `scheme`, if one is registered.
    pub fn create(&self, scheme: &str) -> Option<Arc<dyn Downloader>> {
        self.get(scheme).map(|factory| factory())
    }

    pub fn contains(&self, scheme: &str) -> bool { self.factories.contains_key(scheme) }

    /// Registered schemes, sorted.
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }
}

impl fmt::Debug for DownloaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloaderRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}
