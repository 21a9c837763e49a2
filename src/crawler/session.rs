//! Crawl session handle
//!
//! [`Crawler`] is what a host process drives: it owns the result channel, seeds
//! the first scan task and exposes the runtime controls (depth bound increase and
//! cancellation). All scan tasks of one session share a single dedup store and
//! depth bound.

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::scanner::{ResultReceiver, ResultSender, Scanner};
use crate::state::{Cancellation, DepthBound, StopReason, VisitedSet};
use crate::url::normalize_url;
use crate::{ConfigError, CrawlError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Capacity of the result channel
///
/// Producers wait for the consumer almost as with a rendezvous channel; tokio's
/// bounded channel cannot have zero capacity.
const RESULT_CHANNEL_CAPACITY: usize = 1;

/// Settings fixed for the lifetime of a crawl session
#[derive(Debug, Clone)]
pub struct CrawlerOptions {
    /// Initial depth bound
    pub max_depth: u32,

    /// Per-request timeout applied around every fetch
    pub request_timeout: Duration,

    /// Maximum number of fetches in flight at once
    pub max_concurrent_fetches: usize,
}

impl CrawlerOptions {
    /// Extracts crawler options from the configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_depth: config.crawler.max_depth,
            request_timeout: config.timeouts.request_timeout(),
            max_concurrent_fetches: config.crawler.max_concurrent_fetches as usize,
        }
    }

    /// Checks the options; a crawl never starts with invalid settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth < 1 {
            return Err(ConfigError::Validation(format!(
                "max_depth must be >= 1, got {}",
                self.max_depth
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "request_timeout must be > 0".to_string(),
            ));
        }

        if self.max_concurrent_fetches < 1 {
            return Err(ConfigError::Validation(format!(
                "max_concurrent_fetches must be >= 1, got {}",
                self.max_concurrent_fetches
            )));
        }

        Ok(())
    }
}

impl Default for CrawlerOptions {
    fn default() -> Self {
        Self {
            max_depth: 1,
            request_timeout: Duration::from_secs(5),
            max_concurrent_fetches: 32,
        }
    }
}

/// A bounded, concurrent crawl session
///
/// # Example
///
/// ```no_run
/// use depthwalk::config::UserAgentConfig;
/// use depthwalk::crawler::{Crawler, CrawlerOptions, HttpFetcher};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::new(&UserAgentConfig::default(), Duration::from_secs(5))?;
/// let mut crawler = Crawler::new(fetcher, CrawlerOptions::default())?;
/// let mut results = crawler.results().unwrap();
/// crawler.start("https://golang.org", 1)?;
///
/// while let Some(result) = results.recv().await {
///     println!("{:?}", result);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Crawler<F: Fetcher> {
    scanner: Arc<Scanner<F>>,
    depth_bound: DepthBound,
    cancel: Cancellation,
    results_tx: Option<ResultSender>,
    results_rx: Option<ResultReceiver>,
}

impl<F: Fetcher> Crawler<F> {
    /// Creates a session with its own cancellation signal
    pub fn new(fetcher: F, options: CrawlerOptions) -> Result<Self, ConfigError> {
        Self::with_cancellation(fetcher, options, Cancellation::new())
    }

    /// Creates a session observing an existing cancellation signal
    pub fn with_cancellation(
        fetcher: F,
        options: CrawlerOptions,
        cancel: Cancellation,
    ) -> Result<Self, ConfigError> {
        options.validate()?;

        let depth_bound = DepthBound::new(options.max_depth);
        let scanner = Scanner::new(
            fetcher,
            depth_bound.clone(),
            cancel.clone(),
            options.max_concurrent_fetches,
            options.request_timeout,
        );
        let (tx, rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);

        Ok(Self {
            scanner: Arc::new(scanner),
            depth_bound,
            cancel,
            results_tx: Some(tx),
            results_rx: Some(rx),
        })
    }

    /// Begins the crawl at `seed_url` with the given initial depth
    ///
    /// Returns immediately; results stream through [`Crawler::results`]. A session
    /// can be started once. The returned handle belongs to the seed task only.
    pub fn start(&mut self, seed_url: &str, initial_depth: u32) -> Result<JoinHandle<()>, CrawlError> {
        let seed = normalize_url(seed_url)?;
        let tx = self.results_tx.take().ok_or(CrawlError::AlreadyStarted)?;

        tracing::info!(
            "Starting crawl at {} (depth {}, bound {})",
            seed,
            initial_depth,
            self.depth_bound.get()
        );

        Ok(self.scanner.spawn(tx, seed.to_string(), initial_depth))
    }

    /// Takes the receiving end of the result channel
    ///
    /// Returns `None` if it was already taken. The channel closes once every
    /// scan task has finished.
    pub fn results(&mut self) -> Option<ResultReceiver> {
        self.results_rx.take()
    }

    /// Raises the depth bound by `delta`; safe to call at any time
    ///
    /// Only tasks that read the bound afterwards see the new value; branches that
    /// already stopped at the old bound are not revisited.
    pub fn increase_depth_bound(&self, delta: u32) -> u32 {
        let bound = self.depth_bound.increase(delta);
        tracing::debug!(depth = bound, "Increased depth bound by {}", delta);
        bound
    }

    /// Handle to the shared depth bound
    pub fn depth_bound(&self) -> DepthBound {
        self.depth_bound.clone()
    }

    /// Handle to the shared cancellation signal
    pub fn cancellation(&self) -> Cancellation {
        self.cancel.clone()
    }

    /// Cancels the whole crawl
    pub fn cancel(&self, reason: StopReason) -> bool {
        self.cancel.cancel(reason)
    }

    /// Handle to the dedup store
    pub fn visited(&self) -> VisitedSet {
        self.scanner.visited().clone()
    }
}
