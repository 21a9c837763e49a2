//! Crawl report and console statistics
//!
//! A [`CrawlReport`] is assembled by the result processor from every result it
//! consumes, then completed by the coordinator with the final session state.

use crate::crawler::CrawlResult;
use crate::state::StopReason;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub depth: u32,
}

/// A failed fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub url: Option<String>,
    pub error: String,
    pub depth: u32,
}

/// Everything the result processor consumed during one session
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// When result processing started
    pub started_at: DateTime<Utc>,

    /// When result processing stopped
    pub finished_at: Option<DateTime<Utc>>,

    /// Why the session stopped
    pub stop_reason: Option<StopReason>,

    /// Successful results, in receive order
    pub pages: Vec<PageRecord>,

    /// Failed results, in receive order
    pub failures: Vec<FailureRecord>,

    /// The seed URL the session started from
    pub seed_url: Option<String>,

    /// Depth bound at the end of the session (after any runtime increases)
    pub final_depth_bound: Option<u32>,

    /// Number of URLs claimed in the dedup store
    pub urls_claimed: Option<usize>,
}

impl CrawlReport {
    /// Creates an empty report starting now
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            stop_reason: None,
            pages: Vec::new(),
            failures: Vec::new(),
            seed_url: None,
            final_depth_bound: None,
            urls_claimed: None,
        }
    }

    /// Records one consumed result
    pub fn record(&mut self, result: &CrawlResult) {
        match result {
            CrawlResult::Success { url, title, depth } => self.pages.push(PageRecord {
                url: url.clone(),
                title: title.clone(),
                depth: *depth,
            }),
            CrawlResult::Failure { error, depth, .. } => self.failures.push(FailureRecord {
                url: result.url().map(str::to_string),
                error: error.to_string(),
                depth: *depth,
            }),
        }
    }

    /// Marks the report as complete
    pub fn finish(&mut self, reason: StopReason) {
        self.finished_at = Some(Utc::now());
        self.stop_reason = Some(reason);
    }

    pub fn success_count(&self) -> usize {
        self.pages.len()
    }

    pub fn error_count(&self) -> usize {
        self.failures.len()
    }

    pub fn total_results(&self) -> usize {
        self.success_count() + self.error_count()
    }

    /// Wall-clock time between start and finish
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|finished| finished - self.started_at)
    }

    /// Percentage of consumed results that were errors
    pub fn error_rate(&self) -> f64 {
        if self.total_results() == 0 {
            return 0.0;
        }
        (self.error_count() as f64 / self.total_results() as f64) * 100.0
    }

    /// Number of results (successes and failures) per depth
    pub fn results_by_depth(&self) -> BTreeMap<u32, usize> {
        let mut by_depth = BTreeMap::new();
        let depths = self
            .pages
            .iter()
            .map(|p| p.depth)
            .chain(self.failures.iter().map(|f| f.depth));
        for depth in depths {
            *by_depth.entry(depth).or_insert(0) += 1;
        }
        by_depth
    }
}

impl Default for CrawlReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    if let Some(seed) = &report.seed_url {
        println!("  Seed URL: {}", seed);
    }
    if let Some(reason) = report.stop_reason {
        println!("  Stop reason: {}", reason);
    }
    if let Some(duration) = report.duration() {
        println!(
            "  Duration: {:.2}s",
            duration.num_milliseconds() as f64 / 1000.0
        );
    }
    if let Some(bound) = report.final_depth_bound {
        println!("  Final depth bound: {}", bound);
    }
    if let Some(claimed) = report.urls_claimed {
        println!("  URLs claimed: {}", claimed);
    }
    println!();

    println!("Results by Depth:");
    for (depth, count) in report.results_by_depth() {
        println!("  {}: {}", depth, count);
    }
    println!();

    if !report.failures.is_empty() {
        println!("Errors ({}):", report.error_count());
        for failure in &report.failures {
            println!(
                "  - [{}] {}",
                failure.url.as_deref().unwrap_or("<unknown>"),
                failure.error
            );
        }
        println!();
    }

    println!(
        "Pages: {} fetched, {} failed ({:.1}% errors)",
        report.success_count(),
        report.error_count(),
        report.error_rate()
    );
}
