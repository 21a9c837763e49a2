//! Output module for crawl reports
//!
//! This module handles:
//! - Collecting consumed results into a [`CrawlReport`]
//! - Printing crawl statistics to the console
//! - Writing markdown summaries of a crawl

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_report, CrawlReport, FailureRecord, PageRecord};
