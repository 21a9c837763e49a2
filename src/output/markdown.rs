//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a crawl report,
//! including run information, statistics, the pages found and the errors seen.

use crate::output::stats::CrawlReport;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of `report` to `output_path`
pub fn generate_markdown_summary(report: &CrawlReport, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_summary(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Depthwalk Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    if let Some(seed) = &report.seed_url {
        md.push_str(&format!("- **Seed URL**: {}\n", seed));
    }
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    if let Some(finished) = report.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = report.duration() {
        md.push_str(&format!(
            "- **Duration**: {:.2} seconds\n",
            duration.num_milliseconds() as f64 / 1000.0
        ));
    }
    if let Some(reason) = report.stop_reason {
        md.push_str(&format!("- **Stop Reason**: {}\n", reason));
    }
    if let Some(bound) = report.final_depth_bound {
        md.push_str(&format!("- **Final Depth Bound**: {}\n", bound));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Fetched**: {}\n", report.success_count()));
    md.push_str(&format!("- **Errors**: {}\n", report.error_count()));
    if let Some(claimed) = report.urls_claimed {
        md.push_str(&format!("- **URLs Claimed**: {}\n", claimed));
    }
    md.push_str(&format!("- **Error Rate**: {:.2}%\n\n", report.error_rate()));

    // Depth breakdown
    let by_depth = report.results_by_depth();
    if !by_depth.is_empty() {
        md.push_str("## Results by Depth\n\n");
        md.push_str("| Depth | Results |\n");
        md.push_str("|-------|---------|\n");
        for (depth, count) in by_depth {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    if !report.pages.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| Depth | URL | Title |\n");
        md.push_str("|-------|-----|-------|\n");
        for page in &report.pages {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                page.depth,
                page.url,
                escape_cell(&page.title)
            ));
        }
        md.push('\n');
    }

    if !report.failures.is_empty() {
        md.push_str("## Errors\n\n");
        for failure in &report.failures {
            md.push_str(&format!(
                "- `{}`: {}\n",
                failure.url.as_deref().unwrap_or("<unknown>"),
                failure.error
            ));
        }
        md.push('\n');
    }

    md
}

/// Escapes characters that would break a markdown table cell
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
