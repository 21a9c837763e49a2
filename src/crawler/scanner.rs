//! Traversal engine
//!
//! One scan task runs per discovered link. Each task checks the depth bound,
//! the cancellation signal and the dedup store, in that order, before it is
//! allowed to fetch. A task that fetches emits exactly one result and, on
//! success, spawns one child task per link at `depth + 1` without waiting for
//! them.
//!
//! Fetches are gated by a semaphore so at most `max_concurrent_fetches` run at
//! once; the number of spawned tasks itself is not bounded.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::Page;
use crate::state::{Cancellation, DepthBound, VisitedSet};
use crate::url::normalize_url;
use crate::FetchError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;

/// Sending half of the result channel, one clone per live scan task
pub type ResultSender = mpsc::Sender<CrawlResult>;

/// Receiving half of the result channel, owned by the single consumer
pub type ResultReceiver = mpsc::Receiver<CrawlResult>;

/// Outcome of one fetch attempt
#[derive(Debug)]
pub enum CrawlResult {
    /// The page was fetched and parsed
    Success {
        url: String,
        title: String,
        depth: u32,
    },

    /// The fetch or parse failed
    Failure {
        url: Option<String>,
        error: FetchError,
        depth: u32,
    },
}

impl CrawlResult {
    /// The URL this result is about, when known
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Success { url, .. } => Some(url),
            Self::Failure { url, error, .. } => url.as_deref().or_else(|| error.url()),
        }
    }

    /// Link distance from the seed of the task that produced this result
    pub fn depth(&self) -> u32 {
        match self {
            Self::Success { depth, .. } | Self::Failure { depth, .. } => *depth,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Shared state of every scan task in one crawl session
pub(crate) struct Scanner<F> {
    fetcher: F,
    visited: VisitedSet,
    depth_bound: DepthBound,
    cancel: Cancellation,
    fetch_permits: Arc<Semaphore>,
    request_timeout: Duration,
}

impl<F: Fetcher> Scanner<F> {
    pub(crate) fn new(
        fetcher: F,
        depth_bound: DepthBound,
        cancel: Cancellation,
        max_concurrent_fetches: usize,
        request_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            visited: VisitedSet::new(),
            depth_bound,
            cancel,
            fetch_permits: Arc::new(Semaphore::new(max_concurrent_fetches)),
            request_timeout,
        }
    }

    pub(crate) fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Starts a detached scan task for `url` at `depth`
    pub(crate) fn spawn(
        self: &Arc<Self>,
        results: ResultSender,
        url: String,
        depth: u32,
    ) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(self).scan(results, url, depth))
    }

    /// Scans one URL
    ///
    /// The future is boxed because it spawns further scans of itself.
    fn scan(
        self: Arc<Self>,
        results: ResultSender,
        url: String,
        depth: u32,
    ) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move {
            // The bound is read at call time; a later increase does not revive
            // a branch that already returned here.
            if !self.depth_bound.allows(depth) {
                tracing::trace!("Depth {} exceeds bound, skipping {}", depth, url);
                return;
            }

            if self.cancel.is_cancelled() {
                return;
            }

            let url = match normalize_url(&url) {
                Ok(normalized) => normalized.to_string(),
                Err(e) => {
                    // Claim the raw spelling so a bad link is reported once
                    if self.claim(&url) {
                        tracing::debug!("Rejecting malformed link {}: {}", url, e);
                        self.emit(
                            &results,
                            CrawlResult::Failure {
                                url: Some(url),
                                error: FetchError::Url(e),
                                depth,
                            },
                        )
                        .await;
                    }
                    return;
                }
            };

            if !self.claim(&url) {
                tracing::trace!("Already claimed or cancelled: {}", url);
                return;
            }

            let Some(fetched) = self.fetch(&url).await else {
                return;
            };

            let page = match fetched {
                Ok(page) => page,
                Err(error) => {
                    tracing::debug!("Can't get page {}: {}", url, error);
                    self.emit(
                        &results,
                        CrawlResult::Failure {
                            url: Some(url),
                            error,
                            depth,
                        },
                    )
                    .await;
                    return;
                }
            };

            let delivered = self
                .emit(
                    &results,
                    CrawlResult::Success {
                        url: url.clone(),
                        title: page.title(),
                        depth,
                    },
                )
                .await;
            if !delivered {
                return;
            }

            let child_depth = depth.saturating_add(1);
            if !self.depth_bound.allows(child_depth) {
                tracing::trace!("Not following links of {}: depth bound reached", url);
                return;
            }

            for link in page.links() {
                if self.cancel.is_cancelled() {
                    return;
                }
                tracing::debug!(depth = child_depth, "Started new scan task for {}", link);
                self.spawn(results.clone(), link, child_depth);
            }
        })
    }

    /// Fetches `url` under a concurrency permit and the per-request timeout
    ///
    /// Returns `None` if the session was cancelled while waiting for a permit
    /// or while the fetch was in flight; no result is emitted in that case.
    async fn fetch(&self, url: &str) -> Option<Result<Box<dyn Page>, FetchError>> {
        let _permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            permit = Arc::clone(&self.fetch_permits).acquire_owned() => permit.ok()?,
        };

        tracing::debug!("Fetching {}", url);

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::debug!("Fetch of {} abandoned on cancellation", url);
                None
            }
            fetched = tokio::time::timeout(self.request_timeout, self.fetcher.fetch(url)) => {
                Some(fetched.unwrap_or_else(|_| {
                    Err(FetchError::Timeout {
                        url: url.to_string(),
                        timeout: self.request_timeout,
                    })
                }))
            }
        }
    }

    /// Claims `url` unless the crawl was cancelled while this task was starting
    fn claim(&self, url: &str) -> bool {
        !self.cancel.is_cancelled() && self.visited.claim(url)
    }

    /// Hands a result to the consumer
    ///
    /// The send races the cancellation signal, so a task never stays blocked on
    /// a consumer that has stopped. Returns whether the result was delivered.
    async fn emit(&self, results: &ResultSender, result: CrawlResult) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = results.send(result) => sent.is_ok(),
        }
    }
}
