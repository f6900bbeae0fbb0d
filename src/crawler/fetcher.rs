//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with a browser user agent
//! - GET requests with a bounded number of attempts and a fixed delay
//! - Reporting the final URL after redirects
//! - Buffered page bodies and streamed binary downloads

use crate::config::CrawlerConfig;
use crate::FetchError;
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

/// How the response body should be handed back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Read the whole body as text
    Buffered,
    /// Leave the body on the wire and read it chunk by chunk
    Streamed,
}

/// Response body in the requested mode
#[derive(Debug)]
pub enum FetchBody {
    Text(String),
    Stream(ByteStream),
}

/// Successful fetch
#[derive(Debug)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub final_url: Url,
    pub body: FetchBody,
}

/// Buffered HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    pub body: String,
}

/// Response body that has not been read yet
#[derive(Debug)]
pub struct ByteStream {
    url: String,
    response: Response,
}

impl ByteStream {
    /// Reads the next chunk, or None once the body is exhausted
    pub async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, FetchError> {
        let chunk = self.response.chunk().await.map_err(|e| FetchError::Body {
            url: self.url.clone(),
            source: e,
        })?;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }

    /// Reads the remaining body into memory
    pub async fn collect(mut self) -> Result<Vec<u8>, FetchError> {
        let mut bytes = Vec::new();
        while let Some(chunk) = self.next_chunk().await? {
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

/// Builds an HTTP client that identifies itself with `user_agent`
///
/// Redirects are followed by the client; the fetcher reports the final URL.
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// GET with bounded retries
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Fetcher {
    /// Creates a fetcher; `max_attempts` is clamped to at least one
    pub fn new(client: Client, max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    /// Creates a fetcher from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent)?;
        Ok(Self::new(
            client,
            config.max_attempts,
            Duration::from_millis(config.retry_delay_ms),
        ))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fetches a URL
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return immediately |
    /// | Non-2xx, attempts left | Sleep `retry_delay`, retry |
    /// | Transport error, attempts left | Sleep `retry_delay`, retry |
    /// | Attempts exhausted | Fail with the error of the final attempt |
    pub async fn fetch(&self, url: &str, mode: BodyMode) -> Result<FetchResponse, FetchError> {
        let response = self.send_with_retries(url).await?;
        let final_url = response.url().clone();

        let body = match mode {
            BodyMode::Buffered => FetchBody::Text(response.text().await.map_err(|e| {
                FetchError::Body {
                    url: url.to_string(),
                    source: e,
                }
            })?),
            BodyMode::Streamed => FetchBody::Stream(ByteStream {
                url: url.to_string(),
                response,
            }),
        };

        Ok(FetchResponse { final_url, body })
    }

    /// Fetches an HTML page into memory
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.fetch(url, BodyMode::Buffered).await?;
        let body = match response.body {
            FetchBody::Text(text) => text,
            FetchBody::Stream(stream) => String::from_utf8_lossy(&stream.collect().await?).into_owned(),
        };
        Ok(FetchedPage {
            final_url: response.final_url,
            body,
        })
    }

    /// Downloads a binary resource by streaming its body
    pub async fn fetch_bytes(&self, url: &str) -> Result<(Url, Vec<u8>), FetchError> {
        let response = self.fetch(url, BodyMode::Streamed).await?;
        let bytes = match response.body {
            FetchBody::Stream(stream) => stream.collect().await?,
            FetchBody::Text(text) => text.into_bytes(),
        };
        Ok((response.final_url, bytes))
    }

    async fn send_with_retries(&self, url: &str) -> Result<Response, FetchError> {
        let mut attempt = 1;

        loop {
            let error = match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => FetchError::Status {
                    status: response.status().as_u16(),
                    url: url.to_string(),
                },
                Err(e) => FetchError::Transport {
                    url: url.to_string(),
                    source: e,
                },
            };

            if attempt >= self.max_attempts {
                return Err(error);
            }

            tracing::warn!(
                "Attempt {}/{} failed: {}. Trying again",
                attempt,
                self.max_attempts,
                error
            );
            tokio::time::sleep(self.retry_delay).await;
            attempt += 1;
        }
    }
}
