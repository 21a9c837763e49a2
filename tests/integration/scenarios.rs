//! Traversal scenarios against an in-memory site
//!
//! Pages live in a map instead of behind HTTP so each test controls exactly which
//! links exist, how often a page is fetched and when a fetch completes.

use async_trait::async_trait;
use depthwalk::config::{Config, CrawlerConfig, TimeoutConfig, UserAgentConfig};
use depthwalk::crawler::{
    Coordinator, CrawlResult, Crawler, CrawlerOptions, Fetcher, Page, ResultReceiver,
};
use depthwalk::state::StopReason;
use depthwalk::FetchError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

const S: &str = "https://site.test/";
const A: &str = "https://site.test/a";
const B: &str = "https://site.test/b";
const C: &str = "https://site.test/c";

struct MemoryPage {
    title: String,
    links: Vec<String>,
}

impl Page for MemoryPage {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn links(&self) -> Vec<String> {
        self.links.clone()
    }
}

/// In-memory site that counts fetches per URL
#[derive(Default)]
struct MemorySite {
    pages: HashMap<String, Vec<String>>,
    fetches: Mutex<HashMap<String, usize>>,
    total_fetches: AtomicUsize,
    /// Fetches of this URL wait until `gate` is notified
    gated: Option<(String, Arc<Notify>)>,
    /// Delay applied to every failed fetch
    error_delay: Duration,
}

impl MemorySite {
    /// Adds a page linking to `links`
    fn page(mut self, url: &str, links: &[&str]) -> Self {
        self.pages
            .insert(url.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }

    /// Makes fetches of `url` wait until `gate` is notified
    fn gate(mut self, url: &str, gate: Arc<Notify>) -> Self {
        self.gated = Some((url.to_string(), gate));
        self
    }

    fn error_delay(mut self, delay: Duration) -> Self {
        self.error_delay = delay;
        self
    }

    fn fetch_count(&self, url: &str) -> usize {
        self.fetches.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    fn total_fetches(&self) -> usize {
        self.total_fetches.load(Ordering::SeqCst)
    }
}

/// Fetcher view of a shared [`MemorySite`]
struct SiteFetcher(Arc<MemorySite>);

#[async_trait]
impl Fetcher for SiteFetcher {
    async fn fetch(&self, url: &str) -> Result<Box<dyn Page>, FetchError> {
        let site = &self.0;
        *site
            .fetches
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;
        site.total_fetches.fetch_add(1, Ordering::SeqCst);

        if let Some((gated_url, gate)) = &site.gated {
            if gated_url == url {
                gate.notified().await;
            }
        }

        match site.pages.get(url) {
            Some(links) => Ok(Box::new(MemoryPage {
                title: format!("Title of {}", url),
                links: links.clone(),
            })),
            None => {
                tokio::time::sleep(site.error_delay).await;
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            }
        }
    }
}

fn options(max_depth: u32) -> CrawlerOptions {
    CrawlerOptions {
        max_depth,
        request_timeout: Duration::from_secs(5),
        max_concurrent_fetches: 8,
    }
}

/// Drains the result channel until every scan task has finished
async fn collect(mut results: ResultReceiver) -> Vec<CrawlResult> {
    let mut out = Vec::new();
    loop {
        match tokio::time::timeout(Duration::from_secs(5), results.recv()).await {
            Ok(Some(result)) => out.push(result),
            Ok(None) => return out,
            Err(_) => panic!("crawl did not finish; collected {} results", out.len()),
        }
    }
}

async fn crawl(site: &Arc<MemorySite>, max_depth: u32) -> Vec<CrawlResult> {
    let mut crawler = Crawler::new(SiteFetcher(site.clone()), options(max_depth)).unwrap();
    let results = crawler.results().unwrap();
    crawler.start(S, 1).unwrap();
    collect(results).await
}

fn successes(results: &[CrawlResult]) -> HashMap<String, (String, u32)> {
    results
        .iter()
        .filter_map(|r| match r {
            CrawlResult::Success { url, title, depth } => {
                Some((url.clone(), (title.clone(), *depth)))
            }
            CrawlResult::Failure { .. } => None,
        })
        .collect()
}

#[tokio::test]
async fn test_fan_out_and_dedup() {
    let site = Arc::new(
        MemorySite::default()
            .page(S, &[A, B, C])
            .page(A, &[])
            .page(B, &[])
            .page(C, &[]),
    );

    let results = crawl(&site, 3).await;

    assert_eq!(results.len(), 4);
    let pages = successes(&results);
    assert_eq!(pages.len(), 4);
    for url in [S, A, B, C] {
        let (title, _) = &pages[url];
        assert_eq!(title, &format!("Title of {}", url));
        assert_eq!(site.fetch_count(url), 1);
    }
}

#[tokio::test]
async fn test_cycle_is_fetched_once() {
    let site = Arc::new(MemorySite::default().page(S, &[A]).page(A, &[S]));

    let results = crawl(&site, 10).await;

    assert_eq!(results.len(), 2);
    let pages = successes(&results);
    assert!(pages.contains_key(S));
    assert!(pages.contains_key(A));
    assert_eq!(site.total_fetches(), 2);
}

#[tokio::test]
async fn test_depth_truncation() {
    let site = Arc::new(MemorySite::default().page(S, &[A]).page(A, &[B]).page(B, &[]));

    let results = crawl(&site, 1).await;

    assert_eq!(results.len(), 1);
    assert!(successes(&results).contains_key(S));
    assert_eq!(site.fetch_count(A), 0);
    assert_eq!(site.fetch_count(B), 0);
}

#[tokio::test]
async fn test_child_depth_is_parent_plus_one() {
    let site = Arc::new(
        MemorySite::default()
            .page(S, &[A])
            .page(A, &[B])
            .page(B, &[C])
            .page(C, &[]),
    );

    let results = crawl(&site, 4).await;
    let pages = successes(&results);

    assert_eq!(pages[S].1, 1);
    assert_eq!(pages[A].1, 2);
    assert_eq!(pages[B].1, 3);
    assert_eq!(pages[C].1, 4);
}

#[tokio::test]
async fn test_shared_link_fetched_once() {
    // Twenty pages all link to the same target; concurrent scans race to claim it
    let hubs: Vec<String> = (0..20).map(|i| format!("https://site.test/hub/{}", i)).collect();
    let target = "https://site.test/target";

    let hub_refs: Vec<&str> = hubs.iter().map(String::as_str).collect();
    let mut site = MemorySite::default().page(S, &hub_refs).page(target, &[]);
    for hub in &hub_refs {
        site = site.page(hub, &[target]);
    }
    let site = Arc::new(site);

    let results = crawl(&site, 3).await;

    assert_eq!(results.len(), 22);
    assert_eq!(site.fetch_count(target), 1);
    let target_results = results
        .iter()
        .filter(|r| r.url() == Some(target))
        .count();
    assert_eq!(target_results, 1);
}

#[tokio::test]
async fn test_depth_increase_reaches_new_pages() {
    let gate = Arc::new(Notify::new());
    let site = Arc::new(
        MemorySite::default()
            .page(S, &[A])
            .page(A, &[B])
            .page(B, &[])
            .gate(A, gate.clone()),
    );

    let mut crawler = Crawler::new(SiteFetcher(site.clone()), options(2)).unwrap();
    let mut results = crawler.results().unwrap();
    crawler.start(S, 1).unwrap();

    // S arrives first; A is now blocked inside its fetch
    let first = results.recv().await.unwrap();
    assert_eq!(first.url(), Some(S));

    assert_eq!(crawler.increase_depth_bound(1), 3);
    gate.notify_one();

    let rest = collect(results).await;
    let pages = successes(&rest);
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[B].1, 3);
    assert_eq!(site.fetch_count(B), 1);
}

#[tokio::test]
async fn test_without_depth_increase_branch_stops() {
    let gate = Arc::new(Notify::new());
    let site = Arc::new(
        MemorySite::default()
            .page(S, &[A])
            .page(A, &[B])
            .page(B, &[])
            .gate(A, gate.clone()),
    );
    gate.notify_one();

    let results = crawl(&site, 2).await;

    assert_eq!(results.len(), 2);
    assert_eq!(site.fetch_count(B), 0);
}

fn quota_config(max_errors: u64) -> Config {
    Config {
        crawler: CrawlerConfig {
            seed_url: S.to_string(),
            max_depth: 2,
            max_results: 100,
            max_errors,
            max_concurrent_fetches: 1,
            depth_increment: 2,
        },
        timeouts: TimeoutConfig {
            request_timeout: 5,
            global_timeout: 30,
        },
        user_agent: UserAgentConfig::default(),
    }
}

#[tokio::test]
async fn test_error_quota_cancels_crawl() {
    // The seed is the only page that exists; every link from it fails
    let broken: Vec<String> = (0..20).map(|i| format!("https://site.test/broken/{}", i)).collect();
    let broken_refs: Vec<&str> = broken.iter().map(String::as_str).collect();
    let site = Arc::new(
        MemorySite::default()
            .page(S, &broken_refs)
            .error_delay(Duration::from_millis(20)),
    );

    let coordinator = Coordinator::with_fetcher(quota_config(3), SiteFetcher(site.clone())).unwrap();
    let report = tokio::time::timeout(Duration::from_secs(5), coordinator.run())
        .await
        .expect("crawl should stop at the error quota")
        .unwrap();

    assert_eq!(report.stop_reason, Some(StopReason::MaxErrors));
    assert_eq!(report.error_count(), 3);
    assert_eq!(report.success_count(), 1);

    // No fetch starts once the crawl is cancelled
    tokio::time::sleep(Duration::from_millis(100)).await;
    let settled = site.total_fetches();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(site.total_fetches(), settled);
    assert!(settled < 1 + broken.len());
}

#[tokio::test]
async fn test_error_quota_when_every_fetch_fails() {
    let site = Arc::new(MemorySite::default());

    let coordinator = Coordinator::with_fetcher(quota_config(1), SiteFetcher(site.clone())).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.stop_reason, Some(StopReason::MaxErrors));
    assert_eq!(report.error_count(), 1);
    assert_eq!(site.total_fetches(), 1);
}
