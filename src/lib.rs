//! Depthwalk: a bounded, concurrent web crawler
//!
//! This crate crawls outward from a single seed URL, fetching each page at most
//! once, extracting its links and recursively visiting them up to a depth bound
//! that can be raised while the crawl is running. Every fetch attempt produces one
//! result on a channel drained by a quota-enforcing consumer, which cancels the
//! whole crawl once enough successes or errors have been seen.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for session-level Depthwalk operations
///
/// Per-URL failures never surface here; they travel as [`FetchError`] inside a
/// [`crawler::CrawlResult::Failure`].
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Crawl has already been started for this session")]
    AlreadyStarted,

    #[error("Result stream has already been taken")]
    ResultsTaken,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Errors produced while fetching or parsing a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout after {timeout:?} for {url}")]
    Timeout { url: String, timeout: Duration },

    #[error("Expected HTML from {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),
}

impl FetchError {
    /// Returns the URL this error concerns, when one is known
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Http { url, .. }
            | Self::Status { url, .. }
            | Self::Timeout { url, .. }
            | Self::ContentMismatch { url, .. } => Some(url),
            Self::Url(_) => None,
        }
    }
}

/// Result type alias for Depthwalk operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlResult, Crawler, CrawlerOptions, Fetcher, Page};
pub use state::{Cancellation, DepthBound, StopReason, VisitedSet};
pub use url::normalize_url;
