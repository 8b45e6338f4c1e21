//! Rate-limited HTTP client wrapper.
//!
//! This module provides the [`HttpClient`] struct through which every
//! outbound request flows. Each request first acquires a slot from the
//! shared [`RateLimiter`], then is sent without any timeout beyond the
//! connect phase and without retry.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::{Client, Response};
use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::constants::CONNECT_TIMEOUT_SECS;
use super::error::TransportError;
use super::rate_limiter::RateLimiter;
use crate::user_agent;

/// HTTP client with a global requests-per-window ceiling.
///
/// Cheap to clone: clones share the connection pool and the rate limiter.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use asset_preview::transport::{HttpClient, RateLimiter};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new(Arc::new(RateLimiter::per_second(150)))?;
/// let response = client.get("https://example.com/").await?;
/// println!("status: {}", response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    rate_limiter: Arc<RateLimiter>,
}

impl HttpClient {
    /// Creates a client with the default connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the TLS backend or system
    /// configuration prevents building a client.
    pub fn new(rate_limiter: Arc<RateLimiter>) -> Result<Self, TransportError> {
        Self::with_connect_timeout(rate_limiter, CONNECT_TIMEOUT_SECS)
    }

    /// Creates a client with an explicit connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the client cannot be built.
    #[instrument(level = "debug", skip(rate_limiter))]
    pub fn with_connect_timeout(
        rate_limiter: Arc<RateLimiter>,
        connect_timeout_secs: u64,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(TransportError::ClientBuild)?;
        debug!(
            max_requests = rate_limiter.max_requests(),
            rate_limit_disabled = rate_limiter.is_disabled(),
            "created HTTP client"
        );
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// Returns the shared rate limiter.
    #[must_use]
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Sends a plain GET request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the URL is invalid, the request fails,
    /// or the server answers with a non-success status.
    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, url: &str) -> Result<Response, TransportError> {
        let url = parse_url(url)?;
        self.rate_limiter.acquire().await;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::network(url.as_str(), e))?;
        check_status(url.as_str(), response)
    }

    /// Sends a POST request with a JSON body and extra headers.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the URL is invalid, the request fails,
    /// or the server answers with a non-success status.
    #[instrument(level = "debug", skip(self, body, headers))]
    pub async fn post_json<B>(
        &self,
        url: &str,
        body: &B,
        headers: &HeaderMap,
    ) -> Result<Response, TransportError>
    where
        B: Serialize + ?Sized,
    {
        let url = parse_url(url)?;
        self.rate_limiter.acquire().await;
        let response = self
            .client
            .post(url.clone())
            .headers(headers.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::network(url.as_str(), e))?;
        check_status(url.as_str(), response)
    }

    /// Streams the body of a GET response into `destination`.
    ///
    /// The file is only created once the server has answered with a success
    /// status. It is written through a buffered writer that is flushed on
    /// success and closed when this call returns either way. A failure
    /// mid-stream leaves the partial file on disk.
    ///
    /// # Returns
    ///
    /// The number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] for request, status, stream, or IO failures.
    #[instrument(skip(self), fields(url = %url, path = %destination.display()))]
    pub async fn stream_to_file(
        &self,
        url: &str,
        destination: &Path,
    ) -> Result<u64, TransportError> {
        let response = self.get(url).await?;

        let file = File::create(destination)
            .await
            .map_err(|e| TransportError::io(destination, e))?;

        let bytes = stream_body(file, response, url, destination).await?;
        debug!(bytes, "stream complete");
        Ok(bytes)
    }
}

fn parse_url(url: &str) -> Result<Url, TransportError> {
    Url::parse(url).map_err(|_| TransportError::invalid_url(url))
}

fn check_status(url: &str, response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(TransportError::http_status(url, status.as_u16()))
    }
}

/// Copies the response body into `file`, returning bytes written.
///
/// Takes the file by value so it is closed on every return path.
async fn stream_body(
    file: File,
    response: Response,
    url: &str,
    path: &Path,
) -> Result<u64, TransportError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| TransportError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| TransportError::io(path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .shutdown()
        .await
        .map_err(|e| TransportError::io(path, e))?;

    Ok(bytes_written)
}
