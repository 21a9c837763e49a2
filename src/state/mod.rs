//! State module for the shared crawl state
//!
//! Everything mutated by more than one concurrent scan task lives here.
//!
//! # Components
//!
//! - `VisitedSet`: the dedup store, with an atomic claim operation
//! - `DepthBound`: the runtime-mutable depth ceiling
//! - `Cancellation`: the one-way cancellation signal and the reason it fired

mod cancel;
mod depth;
mod visited;

// Re-export main types
pub use cancel::{Cancellation, StopReason};
pub use depth::DepthBound;
pub use visited::VisitedSet;
