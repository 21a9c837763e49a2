//! Result processor - quota enforcement for a crawl session
//!
//! The processor is the single consumer of the result channel. It tallies
//! successes and errors against the configured quotas and cancels the whole
//! crawl when either one is exhausted. Quotas are hard cutoffs: once a quota
//! runs out the session is over and nothing resets it.

use crate::config::Config;
use crate::crawler::scanner::{CrawlResult, ResultReceiver};
use crate::output::CrawlReport;
use crate::state::{Cancellation, StopReason};

/// Ceilings on cumulative results consumed by the processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quotas {
    /// Successful results after which the crawl stops
    pub max_results: u64,

    /// Failed results after which the crawl stops
    pub max_errors: u64,
}

impl Quotas {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_results: config.crawler.max_results,
            max_errors: config.crawler.max_errors,
        }
    }
}

/// Consumes crawl results until a quota runs out or the session is cancelled
pub struct ResultProcessor {
    quotas: Quotas,
    cancel: Cancellation,
}

impl ResultProcessor {
    pub fn new(quotas: Quotas, cancel: Cancellation) -> Self {
        Self { quotas, cancel }
    }

    /// Drains `results` and returns the report of everything consumed
    ///
    /// Stops when:
    /// - the success quota reaches zero (cancels with `MaxResults`)
    /// - the error quota reaches zero (cancels with `MaxErrors`)
    /// - the session is cancelled elsewhere (timeout, terminate request)
    /// - every scan task has finished and the channel closes (`Exhausted`)
    ///
    /// Cancellation is checked before each receive, so no result is processed
    /// after the session has been cancelled. The receiver is dropped on return,
    /// which releases any producer still waiting to send.
    pub async fn run(self, mut results: ResultReceiver) -> CrawlReport {
        let mut report = CrawlReport::new();
        let mut remaining_results = self.quotas.max_results;
        let mut remaining_errors = self.quotas.max_errors;

        let reason = loop {
            let received = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    let reason = self.cancel.reason().unwrap_or(StopReason::Terminated);
                    tracing::warn!("Crawl cancelled: {}", reason);
                    break reason;
                }
                received = results.recv() => received,
            };

            let Some(result) = received else {
                tracing::info!("All scan tasks finished");
                break self.stop(StopReason::Exhausted);
            };

            match &result {
                CrawlResult::Success { url, title, depth } => {
                    tracing::info!(depth = *depth, "Crawler result: [url: {}] Title: {}", url, title);
                    remaining_results = remaining_results.saturating_sub(1);
                }
                CrawlResult::Failure { error, depth, .. } => {
                    tracing::warn!(depth = *depth, "Crawler result returned error: {}", error);
                    remaining_errors = remaining_errors.saturating_sub(1);
                }
            }
            report.record(&result);

            if remaining_results == 0 {
                tracing::info!("Crawler reached max results ({})", self.quotas.max_results);
                break self.stop(StopReason::MaxResults);
            }
            if remaining_errors == 0 {
                tracing::error!("Crawler reached max errors ({})", self.quotas.max_errors);
                break self.stop(StopReason::MaxErrors);
            }
        };

        report.finish(reason);
        report
    }

    /// Cancels the session and returns the reason that actually took effect
    fn stop(&self, reason: StopReason) -> StopReason {
        self.cancel.cancel(reason);
        self.cancel.reason().unwrap_or(reason)
    }
}
