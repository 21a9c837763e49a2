use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Runtime-mutable ceiling on link distance from the seed
///
/// Reads are lock-free and never block the writer. The bound only ever grows;
/// there is no decrease operation.
#[derive(Debug, Clone)]
pub struct DepthBound {
    value: Arc<AtomicU32>,
}

impl DepthBound {
    /// Creates a bound with the given initial value
    pub fn new(initial: u32) -> Self {
        Self {
            value: Arc::new(AtomicU32::new(initial)),
        }
    }

    /// Current value of the bound
    pub fn get(&self) -> u32 {
        self.value.load(Ordering::Acquire)
    }

    /// Returns whether a task at `depth` is still within the bound
    pub fn allows(&self, depth: u32) -> bool {
        depth <= self.get()
    }

    /// Raises the bound by `delta` and returns the new value
    ///
    /// Saturates at `u32::MAX` instead of wrapping.
    pub fn increase(&self, delta: u32) -> u32 {
        let previous = self
            .value
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_add(delta))
            })
            .unwrap_or_else(|current| current);
        previous.saturating_add(delta)
    }
}
