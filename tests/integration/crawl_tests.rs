//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive the real
//! HTTP fetcher through full crawls end-to-end.

use article_harvester::config::{Config, ExtractStrategy, RateLimitConfig};
use article_harvester::crawler::{crawl_pages, run_paged, Extractor, HostLimiter, HttpFetcher};
use article_harvester::output::RunCounters;
use article_harvester::storage::{JsonFileStore, RecordStore};
use article_harvester::{crawl, Coordinator, HarvestError, PageFetcher};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no request delay
fn create_test_config(max_depth: u32) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.max_concurrent_branches = 4;
    config.rate_limit.request_delay_ms = 0;
    config.fetch.request_timeout_secs = 5;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn article(title: &str, href: &str, date: &str) -> String {
    format!(
        r#"<div class="article"><h2>{}</h2><a href="{}">Read more</a><span class="date">{}</span></div>"#,
        title, href, date
    )
}

async fn mount_page(server: &MockServer, route: &str, body: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_crawl_follows_pagination_and_articles() {
    let mock_server = MockServer::start().await;

    let front = format!(
        r#"{}{}<a rel="next" href="/page/2">Older stories</a>"#,
        article("First", "/a/1", "2024-01-01"),
        article("Second", "/a/2", "2024-01-02")
    );
    mount_page(&mock_server, "/", &front, 1).await;
    mount_page(
        &mock_server,
        "/page/2",
        &article("Third", "/a/3", "2024-01-03"),
        1,
    )
    .await;
    for route in ["/a/1", "/a/2", "/a/3"] {
        mount_page(&mock_server, route, "<p>Story text</p>", 1).await;
    }

    let coordinator = Coordinator::from_config(create_test_config(1)).unwrap();
    let outcome = coordinator.run(&mock_server.uri()).await.unwrap();

    let mut titles: Vec<&str> = outcome.records.iter().map(|r| r.title.as_str()).collect();
    titles.sort();
    assert_eq!(titles, vec!["First", "Second", "Third"]);

    let first = outcome
        .records
        .iter()
        .find(|r| r.title == "First")
        .unwrap();
    assert_eq!(first.url, format!("{}/a/1", mock_server.uri()));
    assert_eq!(first.date, "2024-01-01");

    assert_eq!(outcome.stats.pages_fetched, 5);
    assert_eq!(outcome.stats.pages_failed, 0);
}

#[tokio::test]
async fn test_seed_status_error_fails_crawl() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let coordinator = Coordinator::from_config(create_test_config(2)).unwrap();
    let result = coordinator.run(&mock_server.uri()).await;

    assert!(matches!(
        result,
        Err(HarvestError::HttpStatus { code: 404, .. })
    ));
}

#[tokio::test]
async fn test_fetcher_sends_configured_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header(
            "user-agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
        ))
        .respond_with(html(&article("Hello", "/hello", "")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let records = crawl(&mock_server.uri(), 0).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Hello");
    assert_eq!(records[0].date, "");
}

#[tokio::test]
async fn test_fetcher_maps_non_success_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&create_test_config(0).fetch).unwrap();
    let url = url::Url::parse(&format!("{}/down", mock_server.uri())).unwrap();
    let err = fetcher.fetch(&url).await.unwrap_err();

    assert!(err.is_fetch_failure());
    assert!(matches!(err, HarvestError::HttpStatus { code: 503, .. }));
}

#[tokio::test]
async fn test_shared_link_fetched_once() {
    let mock_server = MockServer::start().await;

    let front = format!(
        "{}{}",
        article("Left", "/left", ""),
        article("Right", "/right", "")
    );
    mount_page(&mock_server, "/", &front, 1).await;
    mount_page(&mock_server, "/left", &article("Shared", "/shared", ""), 1).await;
    mount_page(&mock_server, "/right", &article("Shared", "/shared#top", ""), 1).await;
    mount_page(&mock_server, "/shared", &article("Home", "/", ""), 1).await;

    let coordinator = Coordinator::from_config(create_test_config(5)).unwrap();
    let outcome = coordinator.run(&mock_server.uri()).await.unwrap();

    // Seed, left, right and shared each contribute their records
    assert_eq!(outcome.records.len(), 5);
    assert_eq!(outcome.stats.pages_fetched, 4);
    assert!(outcome.stats.duplicates_skipped >= 2);
}

#[tokio::test]
async fn test_failed_branch_keeps_other_results() {
    let mock_server = MockServer::start().await;

    let front = format!(
        "{}{}",
        article("Broken", "/broken", ""),
        article("Fine", "/fine", "")
    );
    mount_page(&mock_server, "/", &front, 1).await;
    mount_page(&mock_server, "/fine", &article("Deeper", "/deeper", ""), 1).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let coordinator = Coordinator::from_config(create_test_config(1)).unwrap();
    let outcome = coordinator.run(&mock_server.uri()).await.unwrap();

    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.stats.pages_failed, 1);
}

#[tokio::test]
async fn test_anchor_strategy_records_every_link() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r##"<a href="/one">One</a><a href="#">Top</a><a href="javascript:void(0)">JS</a><a href="/two"> Two </a>"##,
        1,
    )
    .await;

    let mut config = create_test_config(0);
    config.extract.strategy = ExtractStrategy::Anchors;

    let coordinator = Coordinator::from_config(config).unwrap();
    let outcome = coordinator.run(&mock_server.uri()).await.unwrap();

    let mut titles: Vec<&str> = outcome.records.iter().map(|r| r.title.as_str()).collect();
    titles.sort();
    assert_eq!(titles, vec!["One", "Two"]);
}

#[tokio::test]
async fn test_fixed_page_count_mode() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("page", "1"))
        .respond_with(html(&article("Page one", "/n/1", "")))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("page", "3"))
        .respond_with(html(&article("Page three", "/n/3", "")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(0);
    let fetcher = HttpFetcher::new(&config.fetch).unwrap();
    let extractor = Extractor::new(&config.extract).unwrap();
    let limiter = HostLimiter::new(
        &RateLimitConfig {
            per_host_concurrency: 1,
            request_delay_ms: 0,
        },
        CancellationToken::new(),
    );
    let counters = RunCounters::new();
    let seed = url::Url::parse(&format!("{}/news", mock_server.uri())).unwrap();

    let records = crawl_pages(&fetcher, &extractor, &limiter, &seed, 3, &counters)
        .await
        .unwrap();

    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Page one", "Page three"]);
}

#[tokio::test]
async fn test_fixed_page_count_mode_honors_deadline() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("page", "1"))
        .respond_with(html(&article("Page one", "/n/1", "")))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("page", "2"))
        .respond_with(html(&article("Page two", "/n/2", "")).set_delay(Duration::from_secs(30)))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(0);
    config.fetch.request_timeout_secs = 60;
    config.crawler.crawl_timeout_secs = 1;

    let started = Instant::now();
    let outcome = run_paged(
        &config,
        &format!("{}/news", mock_server.uri()),
        3,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(outcome.stats.cancelled);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].title, "Page one");
}

#[tokio::test]
async fn test_crawl_results_survive_store_roundtrip() {
    let mock_server = MockServer::start().await;

    let front = format!(
        "{}{}",
        article("Alpha", "/alpha", "Mon"),
        article("Beta", "https://elsewhere.test/beta", "Tue")
    );
    mount_page(&mock_server, "/", &front, 1).await;
    mount_page(&mock_server, "/alpha", "<p>No articles here</p>", 1).await;

    let coordinator = Coordinator::from_config(create_test_config(1)).unwrap();
    let outcome = coordinator.run(&mock_server.uri()).await.unwrap();
    assert_eq!(outcome.records.len(), 2);

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("news.json");
    let store = JsonFileStore::new();

    store.save(&output, &outcome.records).unwrap();
    let loaded = store.load(&output).unwrap();

    let mut expected = outcome.records.clone();
    expected.sort_by(|a, b| a.title.cmp(&b.title));
    let mut loaded_sorted = loaded;
    loaded_sorted.sort_by(|a, b| a.title.cmp(&b.title));
    assert_eq!(loaded_sorted, expected);
}

#[tokio::test]
async fn test_empty_result_still_written() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", "<p>Nothing to see</p>", 1).await;

    let records = crawl(&mock_server.uri(), 2).await.unwrap();
    assert!(records.is_empty());

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("news.json");
    JsonFileStore::new().save(&output, &records).unwrap();

    let content = std::fs::read_to_string(&output).unwrap();
    assert_eq!(content.trim(), "[]");
}
