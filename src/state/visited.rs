use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Set of URLs claimed for processing during one crawl session
///
/// Cloning yields another handle to the same set. The only mutating operation is
/// [`VisitedSet::claim`], which checks and inserts under a single lock so that no
/// two callers can both see a URL as unclaimed.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url` for this session
    ///
    /// Returns `true` iff this call is the first to claim `url`; only the
    /// claimant may go on to fetch it.
    pub fn claim(&self, url: &str) -> bool {
        self.lock().insert(url.to_string())
    }

    /// Returns whether `url` has already been claimed
    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    /// Number of URLs claimed so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the set half-updated, so a
    // poisoned guard is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
