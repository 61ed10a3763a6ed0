//! Resumable ranged transfer over HTTP.

use std::io::{self, SeekFrom};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use futures_util::TryStreamExt;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::core::{
    CHUNK_SIZE, PARTIAL_CONTENT, RANGE_NOT_SATISFIABLE, accepts_byte_ranges, content_range_start,
    is_success, range_header,
};
use crate::data::HttpSettings;
use crate::effects::downloader::Downloader;
use crate::effects::http::HttpClient;
use crate::error::{Error, Result};

/// A partial destination the server agreed to continue.
#[derive(Debug, Clone, Copy)]
struct Resume {
    offset:     u64,
    remote_len: Option<u64>,
}

/// [`Downloader`] for `http` and `https` sources.
///
/// A HEAD probe decides between resuming and overwriting: when the server
/// advertises `Accept-Ranges: bytes` the transfer continues from the current
/// end of the destination with a `Range` request, otherwise the destination
/// is truncated and rewritten from offset 0. A `206` reply whose
/// `Content-Range` does not start at the requested offset is discarded and the
/// whole resource is fetched again without a range.
///
/// The resume path trusts the existing prefix. If the resource changed since
/// the partial write, the result is a mix of old and new bytes.
pub struct HttpDownloader<C> {
    client:     C,
    user_agent: String,
    headers:    Vec<(String, String)>,
    progress:   AtomicU64,
    total:      AtomicU64,
    cancel:     CancellationToken,
}

impl<C: HttpClient> HttpDownloader<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            user_agent: String::new(),
            headers: Vec::new(),
            progress: AtomicU64::new(0),
            total: AtomicU64::new(0),
            cancel: CancellationToken::new(),
        }
    }

    /// A downloader sending the user agent and static headers of `settings`.
    pub fn with_settings(client: C, settings: &HttpSettings) -> Self {
        let headers = settings
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self::new(client)
            .user_agent(settings.user_agent.clone())
            .headers(headers)
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn client(&self) -> &C { &self.client }

    /// Configured user agent first, then the static headers.
    ///
    /// A static `User-Agent` only applies when no user agent is configured.
    /// Static `Range` entries are dropped since the range is decided per
    /// transfer.
    fn request_headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(self.headers.len() + 2);
        let has_user_agent = !self.user_agent.is_empty();
        if has_user_agent {
            headers.push(("User-Agent".to_string(), self.user_agent.clone()));
        }
        headers.extend(
            self.headers
                .iter()
                .filter(|(k, _)| !k.eq_ignore_ascii_case("range"))
                .filter(|(k, _)| !(has_user_agent && k.eq_ignore_ascii_case("user-agent")))
                .cloned(),
        );
        headers
    }

    /// Probe the source and, if it supports byte ranges, position
    /// `destination` at its end.
    ///
    /// Probe failures only disable resuming. So do stat and seek failures on
    /// the destination; the caller then rewrites it from offset 0.
    async fn prepare_resume(
        &self,
        destination: &mut File,
        source: &Url,
        headers: &[(String, String)],
    ) -> Option<Resume> {
        let probe = match self.client.head(source, headers).await {
            Ok(probe) => probe,
            Err(e) => {
                debug!(url = %source, error = %e, "probe failed, not resuming");
                return None;
            }
        };
        if !is_success(probe.status) {
            debug!(url = %source, status = probe.status, "probe rejected, not resuming");
            return None;
        }
        if !accepts_byte_ranges(probe.accept_ranges.as_deref()) {
            debug!(url = %source, "server does not accept byte ranges");
            return None;
        }

        let size = destination.metadata().await.ok()?.len();
        destination.seek(SeekFrom::End(0)).await.ok()?;
        Some(Resume {
            offset:     size,
            remote_len: probe.content_length,
        })
    }

    /// Stream `reader` into `destination` one [`CHUNK_SIZE`] read at a time.
    ///
    /// The counter moves before the write, so an observer may briefly see
    /// bytes that are not on disk yet.
    async fn copy_body<R>(&self, reader: &mut R, destination: &mut File, source: &Url) -> Result<()>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut buffer = [0u8; CHUNK_SIZE];
        loop {
            if self.cancel.is_cancelled() {
                info!(url = %source, written = self.progress.load(Ordering::Relaxed), "download cancelled");
                return Err(Error::Cancelled);
            }

            let n = reader.read(&mut buffer).await.map_err(Error::transport)?;
            if n == 0 {
                return Ok(());
            }

            self.progress.fetch_add(n as u64, Ordering::Relaxed);
            destination.write_all(&buffer[..n]).await?;
        }
    }

    async fn restart(&self, destination: &mut File) -> Result<()> {
        destination.seek(SeekFrom::Start(0)).await?;
        destination.set_len(0).await?;
        self.progress.store(0, Ordering::Relaxed);
        Ok(())
    }
}

#[async_trait]
impl<C: HttpClient + 'static> Downloader for HttpDownloader<C> {
    async fn download(&self, destination: &mut File, source: &Url) -> Result<()> {
        info!(url = %source, "starting download");

        destination.seek(SeekFrom::Start(0)).await?;
        self.progress.store(0, Ordering::Relaxed);
        self.total.store(0, Ordering::Relaxed);

        let headers = self.request_headers();
        let resume = self.prepare_resume(destination, source, &headers).await;
        let mut response = match resume {
            Some(resume) => {
                debug!(url = %source, offset = resume.offset, "resuming");
                let mut ranged = headers.clone();
                ranged.push(("Range".to_string(), range_header(resume.offset)));
                self.client.get(source, &ranged).await.map_err(Error::transport)?
            }
            None => {
                self.restart(destination).await?;
                self.client.get(source, &headers).await.map_err(Error::transport)?
            }
        };

        if let Some(resume) = resume {
            let status = response.status;
            match status {
                PARTIAL_CONTENT
                    if content_range_start(response.content_range.as_deref())
                        == Some(resume.offset) =>
                {
                    self.progress.store(resume.offset, Ordering::Relaxed);
                }
                PARTIAL_CONTENT => {
                    debug!(
                        url = %source,
                        content_range = response.content_range.as_deref().unwrap_or("-"),
                        "unexpected range, fetching the whole resource"
                    );
                    self.restart(destination).await?;
                    response = self.client.get(source, &headers).await.map_err(Error::transport)?;
                }
                RANGE_NOT_SATISFIABLE if resume.remote_len == Some(resume.offset) => {
                    debug!(url = %source, size = resume.offset, "destination already complete");
                    self.progress.store(resume.offset, Ordering::Relaxed);
                    self.total.store(resume.offset, Ordering::Relaxed);
                    return Ok(());
                }
                _ if is_success(status) => {
                    debug!(url = %source, status, "range ignored, rewriting from the start");
                    self.restart(destination).await?;
                }
                _ => {}
            }
        }

        if !is_success(response.status) {
            return Err(Error::Status {
                url:    source.to_string(),
                status: response.status,
            });
        }

        let start = self.progress.load(Ordering::Relaxed);
        if let Some(len) = response.content_length {
            self.total.store(start.saturating_add(len), Ordering::Relaxed);
        }

        let body = response.body.map_err(io::Error::other);
        let mut reader = StreamReader::new(body);
        let copied = self.copy_body(&mut reader, destination, source).await;
        destination.flush().await?;
        copied?;

        if response.content_length.is_none() {
            self.total.store(self.progress(), Ordering::Relaxed);
        }

        info!(url = %source, bytes = self.progress(), "download finished");
        Ok(())
    }

    fn progress(&self) -> u64 { self.progress.load(Ordering::Relaxed) }

    fn total(&self) -> u64 { self.total.load(Ordering::Relaxed) }

    fn cancel(&self) { self.cancel.cancel(); }
}
