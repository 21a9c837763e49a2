//! Configuration module for Depthwalk
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Configuration is immutable once loaded; the only runtime-mutable setting is the
//! depth bound, which lives in [`crate::state::DepthBound`].
//!
//! # Example
//!
//! ```no_run
//! use depthwalk::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("depthwalk.toml")).unwrap();
//! println!("Crawler will start at depth bound: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, TimeoutConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    apply_overrides, compute_config_hash, load_config, load_config_with_hash, parse_config,
};
pub use validation::validate;
