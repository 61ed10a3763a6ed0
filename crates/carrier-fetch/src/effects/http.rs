use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;
use url::Url;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// What the probe request learned about the resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,

    /// Raw `Accept-Ranges` header, if any.
    pub accept_ranges: Option<String>,

    /// Raw `Content-Length` header, if any. For a HEAD request this is the
    /// length of the whole resource.
    pub content_length: Option<u64>,
}

/// Status line and streaming body of a transfer request.
pub struct BodyResponse<E> {
    pub status: u16,

    /// Length of the body about to be streamed. With a `Range` request this is
    /// the remaining length, not the size of the whole resource.
    pub content_length: Option<u64>,

    /// Raw `Content-Range` header, if any. Only meaningful on a 206 reply.
    pub content_range: Option<String>,

    pub body: BoxStream<'static, Result<Bytes, E>>,
}

/// Asynchronous HTTP client abstraction.
///
/// The minimal surface the HTTP downloader needs: a metadata probe and a
/// streaming GET. Non-2xx statuses are *not* errors at this level; the caller
/// decides what they mean.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issue a HEAD request.
    fn head(
        &self,
        url: &Url,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<ProbeResponse, Self::Error>> + Send;

    /// Issue a GET request and hand back the body as a stream.
    fn get(
        &self,
        url: &Url,
        headers: &[(String, String)],
    ) -> impl Future<Output = Result<BodyResponse<Self::Error>, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, HeaderMap};

    use super::*;
    use crate::data::HttpSettings;
    use crate::error::{Error, Result};

    /// Production HTTP client implementation using reqwest.
    ///
    /// Proxies are taken from the environment (`HTTP_PROXY`, `HTTPS_PROXY`,
    /// `NO_PROXY`) as reqwest does by default.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self> { Self::with_settings(&HttpSettings::default()) }

        /// Build a client honouring the timeouts in `settings`.
        pub fn with_settings(settings: &HttpSettings) -> Result<Self> {
            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = settings.connect_timeout() {
                builder = builder.connect_timeout(timeout);
            }
            if let Some(timeout) = settings.read_timeout() {
                builder = builder.read_timeout(timeout);
            }
            let client = builder.build().map_err(Error::transport)?;
            Ok(Self { client })
        }

        fn header_str(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<&str> {
            headers.get(name).and_then(|v| v.to_str().ok())
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn head(
            &self,
            url: &Url,
            headers: &[(String, String)],
        ) -> std::result::Result<ProbeResponse, Self::Error> {
            let mut request = self.client.head(url.clone());
            for (key, value) in headers {
                request = request.header(key, value);
            }

            let response = request.send().await?;
            let headers = response.headers();
            Ok(ProbeResponse {
                status:         response.status().as_u16(),
                accept_ranges:  Self::header_str(headers, ACCEPT_RANGES).map(str::to_string),
                content_length: Self::header_str(headers, CONTENT_LENGTH)
                    .and_then(|s| s.trim().parse::<u64>().ok()),
            })
        }

        async fn get(
            &self,
            url: &Url,
            headers: &[(String, String)],
        ) -> std::result::Result<BodyResponse<Self::Error>, Self::Error> {
            let mut request = self.client.get(url.clone());
            for (key, value) in headers {
                request = request.header(key, value);
            }

            let response = request.send().await?;
            let status = response.status().as_u16();
            let content_length = response.content_length();
            let content_range =
                Self::header_str(response.headers(), CONTENT_RANGE).map(str::to_string);

            Ok(BodyResponse {
                status,
                content_length,
                content_range,
                body: Box::pin(response.bytes_stream()),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
