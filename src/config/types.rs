use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Depthwalk
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from (depth 1)
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Initial depth bound; raised at runtime by `depth-increment` steps
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of successful results after which the crawl stops
    #[serde(rename = "max-results", default = "default_quota")]
    pub max_results: u64,

    /// Number of failed results after which the crawl stops
    #[serde(rename = "max-errors", default = "default_quota")]
    pub max_errors: u64,

    /// Maximum number of fetches in flight at once
    #[serde(
        rename = "max-concurrent-fetches",
        default = "default_max_concurrent_fetches"
    )]
    pub max_concurrent_fetches: u32,

    /// Amount added to the depth bound on each external increase request
    #[serde(rename = "depth-increment", default = "default_depth_increment")]
    pub depth_increment: u32,
}

/// Timeout configuration, in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    /// Per-request timeout
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Wall-clock limit for the whole crawl
    #[serde(rename = "global-timeout", default = "default_global_timeout")]
    pub global_timeout: u64,
}

impl TimeoutConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn global_timeout(&self) -> Duration {
        Duration::from_secs(self.global_timeout)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            global_timeout: default_global_timeout(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version` or `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

fn default_max_depth() -> u32 {
    1
}

fn default_quota() -> u64 {
    10_000
}

fn default_max_concurrent_fetches() -> u32 {
    32
}

fn default_depth_increment() -> u32 {
    2
}

fn default_request_timeout() -> u64 {
    5
}

fn default_global_timeout() -> u64 {
    30
}

fn default_crawler_name() -> String {
    "depthwalk".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
