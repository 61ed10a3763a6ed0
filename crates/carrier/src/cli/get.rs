use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use carrier_fetch::{DownloadClient, DownloadConfig, HttpSettings};
use carrier_verify::{Checksum, HashAlgorithm};
use clap::Args;
use tracing::warn;

use crate::ui::tracker::{ProgressTracker, ProgressTrackerConfig, Tracker};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Debug, Args)]
pub struct GetArg {
    /// URL or local path to fetch.
    pub source: String,

    /// Where the file is written. A partial file here is resumed.
    pub dest: PathBuf,

    #[arg(long, value_name = "HEX", group = "digest")]
    pub md5: Option<String>,

    #[arg(long, value_name = "HEX", group = "digest")]
    pub sha1: Option<String>,

    #[arg(long, value_name = "HEX", group = "digest")]
    pub sha256: Option<String>,

    #[arg(long, value_name = "HEX", group = "digest")]
    pub sha512: Option<String>,

    #[arg(long, value_name = "HEX", group = "digest")]
    pub blake3: Option<String>,

    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Copy local sources to the destination instead of using them in place.
    #[arg(long)]
    pub copy: bool,

    /// TOML file with HTTP settings.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Connect and read timeout in seconds, 0 disables it.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Do not draw a progress bar.
    #[arg(short, long)]
    pub quiet: bool,
}

impl GetArg {
    fn checksum(&self) -> Result<Option<Checksum>> {
        let digests = [
            (HashAlgorithm::Md5, &self.md5),
            (HashAlgorithm::Sha1, &self.sha1),
            (HashAlgorithm::Sha256, &self.sha256),
            (HashAlgorithm::Sha512, &self.sha512),
            (HashAlgorithm::Blake3, &self.blake3),
        ];
        let Some((algorithm, hex)) = digests
            .into_iter()
            .find_map(|(algorithm, hex)| hex.as_ref().map(|hex| (algorithm, hex)))
        else {
            return Ok(None);
        };
        let checksum = Checksum::from_hex(algorithm, hex)
            .with_context(|| format!("invalid {algorithm} digest"))?;
        Ok(Some(checksum))
    }

    async fn http_settings(&self) -> Result<HttpSettings> {
        let mut settings = match &self.config {
            Some(path) => HttpSettings::load(path)
                .await
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => HttpSettings::default(),
        };
        if let Some(user_agent) = &self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(secs) = self.timeout {
            settings.connect_timeout_secs = secs;
            settings.read_timeout_secs = secs;
        }
        Ok(settings)
    }

    async fn download_config(&self) -> Result<DownloadConfig> {
        let mut config = DownloadConfig::new(self.source.clone(), self.dest.clone())
            .copy_file(self.copy)
            .http_settings(self.http_settings().await?);
        if let Some(checksum) = self.checksum()? {
            config = config.checksum(checksum);
        }
        Ok(config)
    }

    pub async fn execute(self) -> Result<()> {
        let config = self.download_config().await?;
        let client = Arc::new(DownloadClient::new(config)?);

        let mut task = tokio::spawn({
            let client = client.clone();
            async move { client.get().await }
        });

        let interrupt = tokio::spawn({
            let client = client.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupted, cancelling download");
                    client.cancel();
                }
            }
        });

        let tracker = ProgressTracker::new(ProgressTrackerConfig { hidden: self.quiet });
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        let joined = loop {
            tokio::select! {
                joined = &mut task => break joined,
                _ = ticker.tick() => tracker.update(client.percent_progress(), client.bytes_progress()),
            }
        };
        interrupt.abort();

        let result = joined.context("download task panicked")?;
        match result {
            Ok(path) => {
                tracker.update(client.percent_progress(), client.bytes_progress());
                tracker.finish(Some("done".to_string()));
                println!("{}", path.display());
                Ok(())
            }
            Err(e) => {
                tracker.abandon();
                Err(e).with_context(|| format!("failed to get {}", self.source))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg() -> GetArg {
        GetArg {
            source:     "https://example.com/file".to_string(),
            dest:       PathBuf::from("file"),
            md5:        None,
            sha1:       None,
            sha256:     None,
            sha512:     None,
            blake3:     None,
            user_agent: None,
            copy:       false,
            config:     None,
            timeout:    None,
            quiet:      true,
        }
    }

    #[test]
    fn test_no_checksum() {
        assert!(arg().checksum().unwrap().is_none());
    }

    #[test]
    fn test_sha256_checksum() {
        let arg = GetArg { sha256: Some("00".repeat(32)), ..arg() };
        let checksum = arg.checksum().unwrap().unwrap();

        assert_eq!(checksum.algorithm(), HashAlgorithm::Sha256);
        assert_eq!(checksum.expected(), &[0u8; 32]);
    }

    #[test]
    fn test_md5_and_sha1_checksums() {
        let md5 = GetArg { md5: Some("5eb63bbbe01eeed093cb22bb8f5acdc3".to_string()), ..arg() };
        let checksum = md5.checksum().unwrap().unwrap();
        assert_eq!(checksum.algorithm(), HashAlgorithm::Md5);
        checksum.verify_bytes(b"hello world").unwrap();

        let sha1 = GetArg { sha1: Some("2aae6c35c94fcfb415dbe95f408b9ce91ee846ed".to_string()), ..arg() };
        let checksum = sha1.checksum().unwrap().unwrap();
        assert_eq!(checksum.algorithm(), HashAlgorithm::Sha1);
        checksum.verify_bytes(b"hello world").unwrap();
    }

    #[test]
    fn test_bad_checksum_hex() {
        let arg = GetArg { sha512: Some("zz".to_string()), ..arg() };
        assert!(arg.checksum().is_err());
    }

    #[tokio::test]
    async fn test_flags_override_settings() {
        let arg = GetArg {
            user_agent: Some("carrier-test".to_string()),
            timeout: Some(0),
            ..arg()
        };
        let settings = arg.http_settings().await.unwrap();

        assert_eq!(settings.user_agent, "carrier-test");
        assert!(settings.connect_timeout().is_none());
        assert!(settings.read_timeout().is_none());
    }

    #[tokio::test]
    async fn test_missing_config_file() {
        let arg = GetArg { config: Some(PathBuf::from("/nonexistent/carrier.toml")), ..arg() };
        assert!(arg.http_settings().await.is_err());
    }
}
