//! HTTP fetcher implementation
//!
//! This module defines the [`Fetcher`] capability the scanner consumes and its
//! reqwest-backed implementation, which handles:
//! - Building HTTP clients with a proper user agent string
//! - GET requests bounded by the per-request timeout
//! - Error classification into [`FetchError`]

use crate::config::UserAgentConfig;
use crate::crawler::parser::{HtmlPage, Page};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// Network retrieval capability
///
/// Implementations must give up promptly when the returned future is dropped;
/// the scanner drops it on cancellation and on per-request timeout. Any error is
/// treated opaquely and reported as a failed result.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    /// Fetches `url` and returns the parsed page
    async fn fetch(&self, url: &str) -> Result<Box<dyn Page>, FetchError>;
}

/// Fetches pages over HTTP(S) with reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests are bounded by `request_timeout`
    pub fn new(user_agent: &UserAgentConfig, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, request_timeout)?,
            timeout: request_timeout,
        })
    }

    fn classify(&self, url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            FetchError::Http {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL and parses it as HTML
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Transport failure | `FetchError::Http` |
    /// | Timeout | `FetchError::Timeout` |
    /// | Non-2xx status | `FetchError::Status` |
    /// | Content-Type present but not HTML | `FetchError::ContentMismatch` |
    /// | Body read failure | `FetchError::Http` / `FetchError::Timeout` |
    ///
    /// Redirects are followed by the client; links are resolved against the
    /// final URL.
    async fn fetch(&self, url: &str) -> Result<Box<dyn Page>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !is_html(content_type) {
                return Err(FetchError::ContentMismatch {
                    url: url.to_string(),
                    content_type: content_type.to_string(),
                });
            }
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| self.classify(url, e))?;

        tracing::trace!("Fetched {} bytes from {}", body.len(), final_url);

        Ok(Box::new(HtmlPage::parse(&body, &final_url)))
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use depthwalk::config::UserAgentConfig;
/// use depthwalk::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(5)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    request_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(request_timeout)
        .connect_timeout(request_timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns whether a Content-Type header value denotes an HTML document
fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}
