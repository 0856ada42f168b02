//! HTTP fetcher backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, HeaderMap, HeaderName};
use tracing::debug;

use crate::domain::entities::{FetchedResponse, ResourceKey, ResponseMetadata};
use crate::domain::errors::FetchError;
use crate::domain::ports::FetcherPort;

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

/// Fetches resources over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &HttpFetcherConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FetcherPort for HttpFetcher {
    async fn fetch(&self, key: &ResourceKey) -> Result<FetchedResponse, FetchError> {
        debug!(key = %key, "Downloading image");

        let response = self
            .client
            .get(key.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
            ));
        }

        let metadata = metadata_from_headers(status.as_u16(), response.headers());

        let bytes = response.bytes().await.map_err(map_transport_error)?;

        debug!(key = %key, size = bytes.len(), "Downloaded image");
        Ok(FetchedResponse::new(bytes, metadata))
    }
}

fn map_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::network(format!("Request failed: {e}"))
    }
}

fn metadata_from_headers(status: u16, headers: &HeaderMap) -> ResponseMetadata {
    let header = |name: HeaderName| headers.get(name).and_then(|v| v.to_str().ok());

    let mut metadata = ResponseMetadata::new(status);
    if let Some(content_type) = header(CONTENT_TYPE) {
        metadata = metadata.with_content_type(content_type);
    }
    if let Some(etag) = header(ETAG) {
        metadata = metadata.with_etag(etag);
    }
    if let Some(max_age) = header(CACHE_CONTROL).and_then(parse_max_age) {
        metadata = metadata.with_max_age(max_age);
    }
    metadata
}

/// Extracts the freshness lifetime from a `Cache-Control` value.
///
/// `no-store` and `no-cache` make the response immediately stale.
fn parse_max_age(cache_control: &str) -> Option<u64> {
    let mut max_age = None;
    for directive in cache_control.split(',').map(str::trim) {
        let (name, value) = directive
            .split_once('=')
            .map_or((directive, None), |(n, v)| (n.trim(), Some(v.trim())));

        if name.eq_ignore_ascii_case("no-store") || name.eq_ignore_ascii_case("no-cache") {
            return Some(0);
        }
        if name.eq_ignore_ascii_case("max-age") {
            max_age = value.and_then(|v| v.trim_matches('"').parse().ok());
        }
    }
    max_age
}
