//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock e-commerce sites and exercise
//! traversal, extraction and the job queue end-to-end.

use aisle_walker::config::{parse_config, Config, FetcherMode};
use aisle_walker::crawler::Crawler;
use aisle_walker::jobs::{JobQueue, JobStatus};
use aisle_walker::progress::{ChannelObserver, CrawlEvent, Notifier};
use aisle_walker::storage::{SqliteStorage, Storage};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Static fetching, one attempt, no waiting between retries
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.fetcher_mode = FetcherMode::Static;
    config.crawler.max_concurrent_validations = 8;
    config.crawler.max_domain_validations = 4;
    config.retry.max_attempts = 1;
    config.retry.initial_delay_ms = 10;
    config
}

fn quiet_crawler(config: Config) -> Crawler {
    Crawler::with_notifier(config, Notifier::new()).expect("crawler should build")
}

/// Serves every `/itm/N` path as a product page
async fn mount_product_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/itm/\d+$"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<h1>Item</h1><p>Product description</p>"),
        )
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_follows_pagination() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_product_pages(&server).await;

    mount_listing(
        &server,
        "/shop",
        r#"<html><head><link rel="next" href="/shop/2"></head><body>
            <a href="/itm/1">One</a>
            <a href="/itm/2">Two</a>
            <a href="/img/itm-hero.jpg">Banner</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_listing(
        &server,
        "/shop/2",
        r#"<html><body>
            <a href="/itm/2">Two again</a>
            <a href="/itm/3">Three</a>
        </body></html>"#
            .to_string(),
    )
    .await;

    let domain = format!("{}/shop", base);
    let crawler = quiet_crawler(create_test_config());
    let results = crawler.crawl_all_domains(&[domain.clone()]).await;

    assert_eq!(
        results.get(&domain),
        Some(&vec![
            format!("{}/itm/1", base),
            format!("{}/itm/2", base),
            format!("{}/itm/3", base),
        ])
    );
}

#[tokio::test]
async fn test_pagination_cycle_terminates() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_product_pages(&server).await;

    mount_listing(
        &server,
        "/a",
        r#"<a href="/itm/1">One</a><a class="pagination-next" href="/b">Next</a>"#.to_string(),
    )
    .await;
    mount_listing(
        &server,
        "/b",
        r#"<a href="/itm/2">Two</a><a class="pagination-next" href="/a">Next</a>"#.to_string(),
    )
    .await;

    let domain = format!("{}/a", base);
    let crawler = quiet_crawler(create_test_config());
    let urls = crawler.crawl_domain(&domain).await.unwrap();

    assert_eq!(urls, vec![format!("{}/itm/1", base), format!("{}/itm/2", base)]);
}

#[tokio::test]
async fn test_failing_domain_does_not_affect_others() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_product_pages(&server).await;
    mount_listing(&server, "/", r#"<a href="/itm/7">Seven</a>"#.to_string()).await;

    let domains = vec!["http://[not-a-host".to_string(), base.clone()];
    let crawler = quiet_crawler(create_test_config());
    let results = crawler.crawl_all_domains(&domains).await;

    assert_eq!(results.len(), 1);
    assert!(!results.contains_key("http://[not-a-host"));
    assert_eq!(results.get(&base), Some(&vec![format!("{}/itm/7", base)]));
}

#[tokio::test]
async fn test_unavailable_browser_fails_only_that_domain() {
    let mut config = create_test_config();
    config.crawler.fetcher_mode = FetcherMode::Dynamic;
    config.browser.executable = Some("/nonexistent/chrome".to_string());

    let crawler = quiet_crawler(config);
    let results = crawler
        .crawl_all_domains(&["shop.invalid".to_string()])
        .await;

    assert!(results.is_empty());
}

#[tokio::test]
async fn test_domain_with_no_products_reports_empty_list() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_listing(&server, "/", "<html><body>Closed for inventory</body></html>".to_string())
        .await;

    let crawler = quiet_crawler(create_test_config());
    let results = crawler.crawl_all_domains(&[base.clone()]).await;

    assert_eq!(results.get(&base), Some(&Vec::new()));
}

#[tokio::test]
async fn test_fallback_discovers_unknown_product_shape() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_listing(
        &server,
        "/",
        r#"<a href="/catalogue/blue-kettle">Kettle</a><a href="/contact">Contact</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/catalogue/blue-kettle"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Kettle details"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Write to us"))
        .expect(1)
        .mount(&server)
        .await;

    let (observer, mut events) = ChannelObserver::new();
    let mut crawler = quiet_crawler(create_test_config());
    crawler.attach(Arc::new(observer));

    let results = crawler.crawl_all_domains(&[base.clone()]).await;
    assert_eq!(
        results.get(&base),
        Some(&vec![format!("{}/catalogue/blue-kettle", base)])
    );

    let mut saw_new_pattern = false;
    while let Ok(event) = events.try_recv() {
        if let CrawlEvent::NewUrlPattern { urls, .. } = event {
            assert_eq!(urls, 1);
            saw_new_pattern = true;
        }
    }
    assert!(saw_new_pattern);
}

#[tokio::test]
async fn test_lifecycle_events_in_order() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_product_pages(&server).await;
    mount_listing(&server, "/", r#"<a href="/itm/1">One</a>"#.to_string()).await;

    let (observer, mut events) = ChannelObserver::new();
    let mut notifier = Notifier::new();
    notifier.attach(Arc::new(observer));
    let crawler = Crawler::with_notifier(create_test_config(), notifier).unwrap();

    crawler.crawl_all_domains(&[base.clone()]).await;

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }

    assert!(matches!(received.first(), Some(CrawlEvent::CrawlStarted { domains: 1 })));
    assert!(matches!(received.get(1), Some(CrawlEvent::DomainStarted { .. })));
    assert!(received
        .iter()
        .any(|e| matches!(e, CrawlEvent::ProductFound { url, .. } if url == &format!("{}/itm/1", base))));
    assert!(matches!(
        received.iter().rev().nth(1),
        Some(CrawlEvent::DomainFinished { products: 1, pages: 1, .. })
    ));
    assert!(matches!(
        received.last(),
        Some(CrawlEvent::CrawlFinished { succeeded: 1, total: 1 })
    ));
}

#[tokio::test]
async fn test_job_queue_end_to_end_with_file_store() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_product_pages(&server).await;
    mount_listing(&server, "/", r#"<a href="/itm/11">Eleven</a>"#.to_string()).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("jobs.db");

    let storage = SqliteStorage::new(&db_path).unwrap();
    let queue = JobQueue::new(quiet_crawler(create_test_config()), storage);

    let id = queue.submit(&[base.clone()]).unwrap();
    let job = queue.wait(&id, Duration::from_millis(10)).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);

    // A second connection sees the finished job
    let reopened = SqliteStorage::new(&db_path).unwrap();
    let stored = reopened.get_job(&id.to_string()).unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(
        stored.results.unwrap().get(&base),
        Some(&vec![format!("{}/itm/11", base)])
    );
}

#[tokio::test]
async fn test_config_file_drives_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_listing(
        &server,
        "/",
        r#"<a href="/listing/widget-1">W1</a><a href="/about">About</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/listing/widget-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Widget specifications"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_string("specifications"))
        .expect(0)
        .mount(&server)
        .await;

    let toml = format!(
        r#"
domains = ["{base}"]

[crawler]
fetcher-mode = "static"

[retry]
max-attempts = 1
initial-delay-ms = 10

[patterns]
product = ['/listing/[\w-]+']
keywords = ["specifications"]
"#
    );
    let config = parse_config(&toml).unwrap();
    let domains = config.domains.clone();

    let results = quiet_crawler(config).crawl_all_domains(&domains).await;
    assert_eq!(
        results.get(&base),
        Some(&vec![format!("{}/listing/widget-1", base)])
    );
}
