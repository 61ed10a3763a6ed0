//! Custom schemes, local sources, cancellation and concurrent observers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use carrier_fetch::{
    BodyResponse, DownloadClient, DownloadConfig, Downloader, DownloaderRegistry, Error,
    HttpClient, HttpDownloader, ProbeResponse,
};
use tempfile::tempdir;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

#[derive(Debug, thiserror::Error)]
#[error("slow origin failure")]
struct SlowError;

/// Serves `chunks` chunks of 1000 bytes with a pause before each one.
#[derive(Clone)]
struct SlowOrigin {
    chunks: usize,
    delay:  Duration,
}

impl HttpClient for SlowOrigin {
    type Error = SlowError;

    async fn head(
        &self,
        _url: &Url,
        _headers: &[(String, String)],
    ) -> Result<ProbeResponse, SlowError> {
        Ok(ProbeResponse { status: 405, ..Default::default() })
    }

    async fn get(
        &self,
        _url: &Url,
        _headers: &[(String, String)],
    ) -> Result<BodyResponse<SlowError>, SlowError> {
        let chunks = self.chunks;
        let delay = self.delay;
        let body = futures_util::stream::unfold(0usize, move |i| async move {
            if i == chunks {
                return None;
            }
            tokio::time::sleep(delay).await;
            Some((Ok::<_, SlowError>(Bytes::from(vec![b'x'; 1000])), i + 1))
        });
        Ok(BodyResponse {
            status:         200,
            content_length: Some(chunks as u64 * 1000),
            content_range:  None,
            body:           Box::pin(body),
        })
    }
}

fn slow_registry(chunks: usize, delay: Duration) -> Arc<DownloaderRegistry> {
    let origin = SlowOrigin { chunks, delay };
    Arc::new(DownloaderRegistry::new().with("slow", move || {
        Arc::new(HttpDownloader::new(origin.clone())) as Arc<dyn Downloader>
    }))
}

/// Writes a fixed payload in one go.
struct MemoryDownloader {
    payload: &'static [u8],
    written: std::sync::atomic::AtomicU64,
}

#[async_trait]
impl Downloader for MemoryDownloader {
    async fn download(&self, destination: &mut File, _source: &Url) -> carrier_fetch::Result<()> {
        destination.set_len(0).await?;
        destination.write_all(self.payload).await?;
        destination.flush().await?;
        self.written
            .store(self.payload.len() as u64, std::sync::atomic::Ordering::Relaxed);
        Ok(())
    }

    fn progress(&self) -> u64 { self.written.load(std::sync::atomic::Ordering::Relaxed) }

    fn total(&self) -> u64 { self.payload.len() as u64 }

    fn cancel(&self) {}
}

#[tokio::test]
async fn test_custom_scheme_downloader() {
    let registry = DownloaderRegistry::new().with("mem", || {
        Arc::new(MemoryDownloader { payload: b"from memory", written: Default::default() })
            as Arc<dyn Downloader>
    });
    let dir = tempdir().unwrap();
    let target = dir.path().join("nested").join("out.txt");
    let client = DownloadClient::new(
        DownloadConfig::new("mem://bucket/object", &target).registry(Arc::new(registry)),
    )
    .unwrap();

    let path = client.get().await.unwrap();

    assert_eq!(path, target);
    assert_eq!(std::fs::read(&target).unwrap(), b"from memory");
    assert_eq!(client.percent_progress(), 100);
}

#[tokio::test]
async fn test_custom_registry_replaces_defaults() {
    let registry = DownloaderRegistry::new().with("mem", || {
        Arc::new(MemoryDownloader { payload: b"", written: Default::default() })
            as Arc<dyn Downloader>
    });
    let dir = tempdir().unwrap();
    let client = DownloadClient::new(
        DownloadConfig::new("http://example.com/file", dir.path().join("file"))
            .registry(Arc::new(registry)),
    )
    .unwrap();

    let err = client.get().await.unwrap_err();

    assert!(matches!(err, Error::UnsupportedScheme(ref s) if s == "http"));
}

#[tokio::test]
async fn test_local_copy() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.txt");
    let target = dir.path().join("copies").join("target.txt");
    std::fs::write(&source, b"local bytes").unwrap();

    let url = Url::from_file_path(&source).unwrap();
    let client =
        DownloadClient::new(DownloadConfig::new(url.as_str(), &target).copy_file(true)).unwrap();

    let path = client.get().await.unwrap();

    assert_eq!(path, target);
    assert_eq!(std::fs::read(&target).unwrap(), b"local bytes");
    assert_eq!(client.percent_progress(), -1);
}

#[tokio::test]
async fn test_local_source_used_in_place() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.txt");
    let target = dir.path().join("target.txt");
    std::fs::write(&source, b"local bytes").unwrap();

    let client =
        DownloadClient::new(DownloadConfig::new(source.to_str().unwrap(), &target)).unwrap();

    let path = client.get().await.unwrap();

    assert_eq!(path, source);
    assert!(!target.exists());
}

#[tokio::test]
async fn test_local_source_missing() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("missing.txt");

    let client = DownloadClient::new(
        DownloadConfig::new(source.to_str().unwrap(), dir.path().join("target")).copy_file(true),
    )
    .unwrap();

    let err = client.get().await.unwrap_err();

    assert!(matches!(err, Error::Filesystem(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_stops_transfer() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("slow.bin");
    let client = Arc::new(
        DownloadClient::new(
            DownloadConfig::new("slow://origin/file", &target)
                .registry(slow_registry(200, Duration::from_millis(10))),
        )
        .unwrap(),
    );

    let runner = client.clone();
    let handle = tokio::spawn(async move { runner.get().await });

    for _ in 0..500 {
        if client.percent_progress() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    client.cancel();

    let err = handle.await.unwrap().unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    let (progress, total) = client.bytes_progress().unwrap();
    assert!(progress < total);
    assert_eq!(std::fs::metadata(&target).unwrap().len(), progress);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_observer_sees_monotonic_progress() {
    let dir = tempdir().unwrap();
    let client = Arc::new(
        DownloadClient::new(
            DownloadConfig::new("slow://origin/file", dir.path().join("slow.bin"))
                .registry(slow_registry(20, Duration::from_millis(5))),
        )
        .unwrap(),
    );

    let runner = client.clone();
    let handle = tokio::spawn(async move { runner.get().await });

    let mut seen = Vec::new();
    while !handle.is_finished() {
        seen.push(client.percent_progress());
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    handle.await.unwrap().unwrap();
    seen.push(client.percent_progress());

    assert!(seen.iter().all(|p| (-1..=100).contains(p)));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last(), Some(&100));
}
