//! Depthwalk main entry point
//!
//! This is the command-line interface for the Depthwalk crawler.

use anyhow::Context;
use clap::Parser;
use depthwalk::config::{apply_overrides, load_config_with_hash, Config};
use depthwalk::crawler::{CrawlControl, Coordinator};
use depthwalk::output::{generate_markdown_summary, print_report};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Depthwalk: a bounded, concurrent web crawler
///
/// Depthwalk crawls outward from a seed URL up to a depth bound, visiting every
/// page at most once. Send SIGUSR1 to raise the depth bound while it runs and
/// SIGTERM (or Ctrl-C) to stop it.
#[derive(Parser, Debug)]
#[command(name = "depthwalk")]
#[command(version)]
#[command(about = "A bounded, concurrent web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Override the seed URL from the configuration
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Override the initial depth bound from the configuration
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Write a markdown summary of the crawl to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "summary")]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let config = apply_overrides(config, cli.url, cli.max_depth)
        .context("Invalid command-line override")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, cli.summary).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("depthwalk=info,warn"),
            1 => EnvFilter::new("depthwalk=debug,info"),
            2 => EnvFilter::new("depthwalk=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Depthwalk Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Depth increment: {}", config.crawler.depth_increment);
    println!("  Max results: {}", config.crawler.max_results);
    println!("  Max errors: {}", config.crawler.max_errors);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );

    println!("\nTimeouts:");
    println!("  Request: {}s", config.timeouts.request_timeout);
    println!("  Global: {}s", config.timeouts.global_timeout);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling at {} with depth bound {}",
        config.crawler.seed_url, config.crawler.max_depth
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, summary: Option<PathBuf>) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} (max depth {}, max results {}, max errors {})",
        config.crawler.seed_url,
        config.crawler.max_depth,
        config.crawler.max_results,
        config.crawler.max_errors
    );

    let coordinator = Coordinator::new(config).context("Failed to set up crawler")?;
    let signals = tokio::spawn(handle_signals(coordinator.control()));

    let result = coordinator.run().await;
    signals.abort();
    let report = result.context("Crawl failed")?;

    print_report(&report);

    if let Some(path) = summary {
        generate_markdown_summary(&report, &path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        println!("\n✓ Summary written to: {}", path.display());
    }

    Ok(())
}

/// Maps process signals onto crawl controls until the crawl ends
///
/// SIGUSR1 raises the depth bound by the configured increment; SIGTERM and
/// Ctrl-C terminate the crawl.
#[cfg(unix)]
async fn handle_signals(control: CrawlControl) {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut usr1, mut term) = match (
        signal(SignalKind::user_defined1()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(usr1), Ok(term)) => (usr1, term),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to install signal handlers: {}", e);
            return;
        }
    };

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = usr1.recv() => {
                control.increase_depth();
            }
            _ = term.recv() => {
                tracing::info!("Received SIGTERM");
                control.terminate();
                return;
            }
            _ = &mut ctrl_c => {
                tracing::info!("Received Ctrl-C");
                control.terminate();
                return;
            }
        }
    }
}

#[cfg(not(unix))]
async fn handle_signals(control: CrawlControl) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Received Ctrl-C");
        control.terminate();
    }
}
