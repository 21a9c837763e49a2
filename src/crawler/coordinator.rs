//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator wires one crawl session together:
//! - Building the fetcher and the [`Crawler`] from configuration
//! - Seeding the traversal at depth 1
//! - Running the result processor until a stop condition
//! - Enforcing the global crawl timeout
//! - Collecting the final report

use crate::config::{validate, Config};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::processor::{Quotas, ResultProcessor};
use crate::crawler::session::{Crawler, CrawlerOptions};
use crate::output::CrawlReport;
use crate::state::{Cancellation, DepthBound, StopReason};
use crate::CrawlError;

/// Depth at which the seed URL is scanned
const SEED_DEPTH: u32 = 1;

/// Handle for steering a running crawl from outside
///
/// Cheap to clone; every clone controls the same session.
#[derive(Debug, Clone)]
pub struct CrawlControl {
    depth_bound: DepthBound,
    cancel: Cancellation,
    increment: u32,
}

impl CrawlControl {
    /// Raises the depth bound by the configured increment
    pub fn increase_depth(&self) -> u32 {
        self.increase_depth_by(self.increment)
    }

    /// Raises the depth bound by `delta` and returns the new bound
    pub fn increase_depth_by(&self, delta: u32) -> u32 {
        let bound = self.depth_bound.increase(delta);
        tracing::info!("Depth bound increased to {}", bound);
        bound
    }

    /// Asks the crawl to stop
    ///
    /// Returns `false` if the crawl had already stopped for another reason.
    pub fn terminate(&self) -> bool {
        let first = self.cancel.cancel(StopReason::Terminated);
        if first {
            tracing::info!("Crawl termination requested");
        }
        first
    }

    /// Current depth bound
    pub fn depth_bound(&self) -> u32 {
        self.depth_bound.get()
    }

    /// Returns whether the session has stopped
    pub fn is_finished(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<F: Fetcher = HttpFetcher> {
    config: Config,
    crawler: Crawler<F>,
    quotas: Quotas,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - Invalid configuration or HTTP client failure
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.timeouts.request_timeout())?;
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: Fetcher> Coordinator<F> {
    /// Creates a coordinator around any [`Fetcher`]
    pub fn with_fetcher(config: Config, fetcher: F) -> Result<Self, CrawlError> {
        validate(&config)?;

        let crawler = Crawler::new(fetcher, CrawlerOptions::from_config(&config))?;
        let quotas = Quotas::from_config(&config);

        Ok(Self {
            config,
            crawler,
            quotas,
        })
    }

    /// Returns a handle for raising the depth bound or terminating the crawl
    pub fn control(&self) -> CrawlControl {
        CrawlControl {
            depth_bound: self.crawler.depth_bound(),
            cancel: self.crawler.cancellation(),
            increment: self.config.crawler.depth_increment,
        }
    }

    /// Runs the crawl to completion
    ///
    /// Returns once a quota runs out, the global timeout elapses, termination is
    /// requested through a [`CrawlControl`] or every scan task has finished.
    pub async fn run(mut self) -> Result<CrawlReport, CrawlError> {
        let results = self.crawler.results().ok_or(CrawlError::ResultsTaken)?;
        let cancel = self.crawler.cancellation();
        let seed_url = self.config.crawler.seed_url.clone();

        let global_timeout = self.config.timeouts.global_timeout();
        let timer = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(global_timeout) => {
                        if cancel.cancel(StopReason::Timeout) {
                            tracing::warn!("Global timeout of {:?} reached", global_timeout);
                        }
                    }
                }
            })
        };

        if let Err(e) = self.crawler.start(&seed_url, SEED_DEPTH) {
            timer.abort();
            return Err(e);
        }

        let mut report = ResultProcessor::new(self.quotas, cancel).run(results).await;
        timer.abort();

        report.seed_url = Some(seed_url);
        report.final_depth_bound = Some(self.crawler.depth_bound().get());
        report.urls_claimed = Some(self.crawler.visited().len());

        tracing::info!(
            "Crawl finished ({}): {} pages, {} errors",
            report
                .stop_reason
                .map(|r| r.as_str())
                .unwrap_or("unknown"),
            report.success_count(),
            report.error_count()
        );

        Ok(report)
    }
}

/// Runs a crawl described by `config` over HTTP
///
/// # Example
///
/// ```no_run
/// use depthwalk::config::load_config;
/// use depthwalk::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = run_crawl(config).await?;
/// println!("{} pages", report.success_count());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, CrawlError> {
    Coordinator::new(config)?.run().await
}
