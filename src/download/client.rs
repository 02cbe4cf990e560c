//! HTTP client wrapper for fetching single items.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use super::error::FetchError;

/// HTTP client for single-shot downloads.
///
/// Created once per run and reused for every request, taking advantage of
/// connection pooling. Each fetch issues exactly one GET and buffers the
/// full response body; there is no retry, streaming, or resumption.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Total request timeout: 5 minutes
    /// - Gzip decompression: enabled
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeouts(DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// `request_timeout_secs` bounds the whole request including body
    /// transfer, so a stalled server cannot hang the sequential run.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeouts(connect_timeout_secs: u64, request_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches `url` and writes the full response body to `path`.
    ///
    /// The body is written for any received response, success status or
    /// not; a non-success status is logged but still counts as a completed
    /// fetch. Returns the number of body bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] when the request or body transfer
    /// fails, and [`FetchError::Io`] when the body cannot be written. In
    /// both cases no file is left at `path` unless the write itself failed
    /// partway.
    pub async fn fetch_to_path(&self, url: &str, path: &Path) -> Result<usize, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "non-success status, body kept anyway");
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::network(url, e))?;
        tokio::fs::write(path, &body)
            .await
            .map_err(|e| FetchError::io(path, e))?;

        debug!(url = %url, bytes = body.len(), path = %path.display(), "wrote response body");
        Ok(body.len())
    }
}
