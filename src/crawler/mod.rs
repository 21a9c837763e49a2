//! Crawler module for concurrent, depth-bounded traversal
//!
//! This module contains the core crawling logic, including:
//! - Fetching pages behind the [`Fetcher`] trait
//! - HTML parsing and link extraction
//! - One scan task per discovered link, sharing a dedup store and depth bound
//! - Quota enforcement over the result stream
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod processor;
mod scanner;
mod session;

pub use coordinator::{run_crawl, CrawlControl, Coordinator};
pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use parser::{HtmlPage, Page};
pub use processor::{Quotas, ResultProcessor};
pub use scanner::{CrawlResult, ResultReceiver, ResultSender};
pub use session::{Crawler, CrawlerOptions};
