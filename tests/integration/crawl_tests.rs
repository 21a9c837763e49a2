//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end over real HTTP.

use depthwalk::config::{Config, CrawlerConfig, TimeoutConfig, UserAgentConfig};
use depthwalk::crawler::{Coordinator, Fetcher, HttpFetcher, Page};
use depthwalk::state::StopReason;
use depthwalk::FetchError;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling from `seed_url`
fn create_test_config(seed_url: &str, max_depth: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            seed_url: seed_url.to_string(),
            max_depth,
            max_results: 100,
            max_errors: 100,
            max_concurrent_fetches: 4,
            depth_increment: 2,
        },
        timeouts: TimeoutConfig {
            request_timeout: 5,
            global_timeout: 30,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: Some("https://example.com/contact".to_string()),
        },
    }
}

/// HTML response; `set_body_raw` sets the content type along with the body
fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Mock index page with links
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="{}/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="mailto:admin@example.com">Mail</a>
            </body></html>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    // page1 links back home and to page2; both are already claimed
    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(
            r#"<html><head><title>Page 1</title></head><body>
            <a href="/">Home</a><a href="/page2">Page 2</a>
            </body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(
            r#"<html><head><title>Page 2</title></head><body>Content 2</body></html>"#.to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/", base_url), 2);
    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.stop_reason, Some(StopReason::Exhausted));
    assert_eq!(report.success_count(), 3);
    assert_eq!(report.error_count(), 0);

    let mut titles: Vec<_> = report.pages.iter().map(|p| p.title.as_str()).collect();
    titles.sort_unstable();
    assert_eq!(titles, vec!["Home", "Page 1", "Page 2"]);

    let home = report
        .pages
        .iter()
        .find(|p| p.title == "Home")
        .expect("home page result");
    assert_eq!(home.depth, 1);
    assert!(report
        .pages
        .iter()
        .filter(|p| p.title != "Home")
        .all(|p| p.depth == 2));
}

#[tokio::test]
async fn test_http_errors_become_failures() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><title>Home</title></head><body>
            <a href="/missing">Missing</a>
            <a href="/data.json">Data</a>
            </body></html>"#
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"ok": true}"#.as_bytes().to_vec(), "application/json"),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, 2);
    let report = Coordinator::new(config)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.stop_reason, Some(StopReason::Exhausted));
    assert_eq!(report.success_count(), 1);
    assert_eq!(report.error_count(), 2);

    let missing = report
        .failures
        .iter()
        .find(|f| f.url.as_deref() == Some(format!("{}/missing", base_url).as_str()))
        .expect("404 failure");
    assert!(missing.error.contains("404"));
    assert_eq!(missing.depth, 2);

    assert!(report
        .failures
        .iter()
        .any(|f| f.error.contains("application/json")));
}

#[tokio::test]
async fn test_depth_bound_limits_fetches() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><title>Home</title></head><body><a href="/next">Next</a></body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Depth 2 is beyond the bound and must never be requested
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(html("<html></html>".to_string()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, 1);
    let report = Coordinator::new(config)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.success_count(), 1);
    assert_eq!(report.urls_claimed, Some(1));
    assert_eq!(report.final_depth_bound, Some(1));
}

#[tokio::test]
async fn test_error_quota_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/broken/{}">Broken</a>"#, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            "<html><head><title>Home</title></head><body>{}</body></html>",
            links
        )))
        .mount(&mock_server)
        .await;

    // Everything else falls through to wiremock's default 404

    let mut config = create_test_config(&base_url, 2);
    config.crawler.max_errors = 2;
    let report = Coordinator::new(config)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.stop_reason, Some(StopReason::MaxErrors));
    assert_eq!(report.error_count(), 2);
    assert_eq!(report.success_count(), 1);
}

#[tokio::test]
async fn test_http_fetcher_extracts_title_and_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(html(
            r##"<html><head><title>  An Article  </title></head><body>
            <a href="other?utm_source=feed&b=2&a=1#top">Other</a>
            <a href="#comments">Comments</a>
            <a href="javascript:void(0)">Nothing</a>
            <a href="/other?a=1&b=2">Other again</a>
            </body></html>"##
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&UserAgentConfig::default(), Duration::from_secs(5))
        .expect("Failed to build fetcher");
    let page = fetcher
        .fetch(&format!("{}/article", base_url))
        .await
        .expect("Fetch failed");

    assert_eq!(page.title(), "An Article");
    assert_eq!(page.links(), vec![format!("{}/other?a=1&b=2", base_url)]);
}

#[tokio::test]
async fn test_http_fetcher_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<html></html>".to_string()).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&UserAgentConfig::default(), Duration::from_millis(200))
        .expect("Failed to build fetcher");
    let result = fetcher.fetch(&format!("{}/slow", mock_server.uri())).await;

    assert!(matches!(result, Err(FetchError::Timeout { .. })));
}
