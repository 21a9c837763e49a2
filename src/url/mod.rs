//! URL handling module for Depthwalk
//!
//! Every URL that reaches the dedup store goes through [`normalize_url`] (or
//! [`normalize_parsed`] when the page parser has already resolved it), so the
//! store keys on one canonical spelling per page.

mod normalize;

pub use normalize::{normalize_parsed, normalize_url};
