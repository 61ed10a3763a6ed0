use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use carrier_verify::Checksum;
use serde::{Deserialize, Serialize};

use crate::effects::DownloaderRegistry;
use crate::error::{Error, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Transport settings shared by every HTTP request of a download.
///
/// Loadable from TOML; every field is optional:
///
/// ```
/// use carrier_fetch::HttpSettings;
///
/// let settings = HttpSettings::from_toml_str(r#"
///     user_agent = "carrier/0.1"
///     read_timeout_secs = 10
///
///     [headers]
///     Authorization = "Bearer token"
/// "#).unwrap();
///
/// assert_eq!(settings.user_agent, "carrier/0.1");
/// assert_eq!(settings.connect_timeout_secs, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Sent as `User-Agent`. Empty means the transport's default.
    pub user_agent: String,

    /// Connection timeout in seconds, `0` disables it.
    pub connect_timeout_secs: u64,

    /// Per-read timeout in seconds, `0` disables it.
    pub read_timeout_secs: u64,

    /// Static headers sent with the probe and the transfer request.
    pub headers: BTreeMap<String, String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent:           String::new(),
            connect_timeout_secs: DEFAULT_TIMEOUT_SECS,
            read_timeout_secs:    DEFAULT_TIMEOUT_SECS,
            headers:              BTreeMap::new(),
        }
    }
}

impl HttpSettings {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&content)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_secs > 0).then(|| Duration::from_secs(self.connect_timeout_secs))
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_secs > 0).then(|| Duration::from_secs(self.read_timeout_secs))
    }
}

/// Configuration for a single download.
///
/// Once handed to [`DownloadClient::new`](crate::DownloadClient::new) the
/// configuration is frozen behind an `Arc`.
///
/// # Examples
///
/// ```
/// use carrier_fetch::DownloadConfig;
/// use carrier_verify::{Checksum, HashAlgorithm};
///
/// let checksum = Checksum::from_hex(
///     HashAlgorithm::Sha256,
///     "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
/// ).unwrap();
///
/// let config = DownloadConfig::new("https://example.com/file.iso", "file.iso")
///     .user_agent("carrier/0.1")
///     .header("Authorization", "Bearer token")
///     .checksum(checksum);
///
/// assert_eq!(config.http.user_agent, "carrier/0.1");
/// assert!(!config.copy_file);
/// ```
#[derive(Clone)]
pub struct DownloadConfig {
    /// Source locator: a URL or a local path.
    pub url: String,

    /// Where the file is written.
    pub target_path: PathBuf,

    /// Scheme to downloader mapping. `None` installs the HTTP defaults.
    pub registry: Option<Arc<DownloaderRegistry>>,

    /// Copy local sources into `target_path` instead of returning their path.
    pub copy_file: bool,

    /// Verified against the result after a successful transfer.
    pub checksum: Option<Checksum>,

    pub http: HttpSettings,
}

impl fmt::Debug for DownloadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadConfig")
            .field("url", &self.url)
            .field("target_path", &self.target_path)
            .field("registry", &self.registry.as_ref().map(|r| r.schemes()))
            .field("copy_file", &self.copy_file)
            .field("checksum", &self.checksum)
            .field("http", &self.http)
            .finish()
    }
}

impl DownloadConfig {
    pub fn new(url: impl Into<String>, target_path: impl Into<PathBuf>) -> Self {
        Self {
            url:         url.into(),
            target_path: target_path.into(),
            registry:    None,
            copy_file:   false,
            checksum:    None,
            http:        HttpSettings::default(),
        }
    }

    #[must_use]
    pub fn registry(mut self, registry: Arc<DownloaderRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn copy_file(mut self, copy_file: bool) -> Self {
        self.copy_file = copy_file;
        self
    }

    #[must_use]
    pub fn checksum(mut self, checksum: Checksum) -> Self {
        self.checksum = Some(checksum);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http.user_agent = user_agent.into();
        self
    }

    /// Add a static header, replacing an earlier one with the same name.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.http.headers.insert(key.into(), value.into());
        self
    }

    /// Replace the transport settings wholesale.
    #[must_use]
    pub fn http_settings(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_from_empty_toml() {
        let settings = HttpSettings::from_toml_str("").unwrap();
        assert_eq!(settings, HttpSettings::default());
        assert_eq!(settings.connect_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_settings_zero_disables_timeout() {
        let settings = HttpSettings::from_toml_str("read_timeout_secs = 0").unwrap();
        assert_eq!(settings.read_timeout(), None);
        assert!(settings.connect_timeout().is_some());
    }

    #[test]
    fn test_settings_rejects_bad_toml() {
        let result = HttpSettings::from_toml_str("read_timeout_secs = \"soon\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_config_builder() {
        let config = DownloadConfig::new("http://example.com/a", "a")
            .copy_file(true)
            .header("X-Token", "1")
            .header("X-Token", "2");

        assert!(config.copy_file);
        assert!(config.registry.is_none());
        assert_eq!(config.http.headers.get("X-Token").map(String::as_str), Some("2"));
    }
}
