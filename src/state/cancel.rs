use std::fmt;
use std::sync::{Arc, OnceLock};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Why a crawl session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The success quota was exhausted
    MaxResults,

    /// The error quota was exhausted
    MaxErrors,

    /// The global crawl timeout elapsed
    Timeout,

    /// The host process asked the crawl to terminate
    Terminated,

    /// Every task finished and the result stream closed on its own
    Exhausted,
}

impl StopReason {
    /// Short machine-friendly name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxResults => "max_results",
            Self::MaxErrors => "max_errors",
            Self::Timeout => "timeout",
            Self::Terminated => "terminated",
            Self::Exhausted => "exhausted",
        }
    }

    /// Returns true if a quota caused the stop
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::MaxResults | Self::MaxErrors)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared, one-way cancellation signal for a crawl session
///
/// Wraps a [`CancellationToken`] and remembers the first [`StopReason`] given to
/// [`Cancellation::cancel`]. Later cancels are no-ops for the reason, so the
/// recorded cause is always the one that actually stopped the crawl.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    token: CancellationToken,
    reason: Arc<OnceLock<StopReason>>,
}

impl Cancellation {
    /// Creates an active (not yet cancelled) signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the session
    ///
    /// Returns `true` if this call was the one that cancelled it.
    pub fn cancel(&self, reason: StopReason) -> bool {
        let first = self.reason.set(reason).is_ok();
        self.token.cancel();
        first
    }

    /// Returns whether the session has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The reason recorded by the first cancel, if any
    pub fn reason(&self) -> Option<StopReason> {
        self.reason.get().copied()
    }

    /// Completes once the session is cancelled
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}
