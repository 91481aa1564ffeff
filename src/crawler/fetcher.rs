//! Page content retrieval
//!
//! This module handles everything needed to turn a listing URL into HTML:
//! - Building the shared HTTP client from configuration
//! - Plain HTTP fetching with retry on transient failures
//! - Choosing between the static and the browser-backed fetcher per domain
//!
//! Both fetchers report soft failures (non-200, exhausted retries) as empty
//! content. Only a browser session that never came up is surfaced as an error.

use crate::config::{Config, FetcherMode, HttpConfig};
use crate::crawler::browser::DynamicFetcher;
use crate::crawler::retry::{retry, RetryPolicy};
use crate::FetchError;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Which fetcher variant serves a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetcherKind {
    /// Plain HTTP GET
    Static,
    /// Headless browser with script execution
    Dynamic,
}

impl fmt::Display for FetcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetcherKind::Static => write!(f, "static"),
            FetcherKind::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// The same client serves listing fetches, fetcher probes and product
/// validation, so connections are pooled across all of them.
///
/// # Example
///
/// ```no_run
/// use aisle_walker::config::HttpConfig;
/// use aisle_walker::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches listing pages with a single HTTP GET
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl StaticFetcher {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!("{} returned HTTP {}", url, status.as_u16());
            return Ok(String::new());
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }

    /// Returns the body of `url`, or empty content on any failure
    pub async fn fetch_content(&self, url: &str) -> Result<String, FetchError> {
        match retry(&self.retry, || self.try_fetch(url)).await {
            Ok(body) => Ok(body),
            Err(e) => {
                tracing::warn!("Fetch failed for {}: {}", url, e);
                Ok(String::new())
            }
        }
    }
}

/// The fetcher serving one domain for the lifetime of its traversal
#[derive(Debug)]
pub enum Fetcher {
    Static(StaticFetcher),
    Dynamic(DynamicFetcher),
}

impl Fetcher {
    pub fn kind(&self) -> FetcherKind {
        match self {
            Fetcher::Static(_) => FetcherKind::Static,
            Fetcher::Dynamic(_) => FetcherKind::Dynamic,
        }
    }

    /// Retrieves the HTML of `url`
    ///
    /// # Returns
    ///
    /// * `Ok(content)` - Page HTML, empty when the page could not be retrieved
    /// * `Err(FetchError::Uninitialized)` - The browser session never started
    pub async fn fetch_content(&self, url: &str) -> Result<String, FetchError> {
        match self {
            Fetcher::Static(fetcher) => fetcher.fetch_content(url).await,
            Fetcher::Dynamic(fetcher) => fetcher.fetch_content(url).await,
        }
    }

    /// Releases any external resources held by the fetcher
    ///
    /// Safe to call more than once.
    pub async fn close(&mut self) {
        if let Fetcher::Dynamic(fetcher) = self {
            fetcher.close().await;
        }
    }
}

/// Returns true if the seed URL itself suggests client-side rendering
///
/// Search and filter pages carry their state in the query or fragment and are
/// usually assembled by scripts.
pub fn looks_script_rendered(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.query().is_some() || parsed.fragment().is_some(),
        Err(_) => url.contains('?') || url.contains('#'),
    }
}

/// Fetches `url` once and reports whether its markup contains any SPA marker
///
/// Probe failures of any kind count as "no markers".
pub async fn probe_for_spa_markers(client: &Client, url: &str, markers: &[String]) -> bool {
    let response = match client.get(url).send().await {
        Ok(response) if response.status() == StatusCode::OK => response,
        Ok(response) => {
            tracing::debug!("Probe of {} returned HTTP {}", url, response.status().as_u16());
            return false;
        }
        Err(e) => {
            tracing::debug!("Probe of {} failed: {}", url, e);
            return false;
        }
    };

    match response.text().await {
        Ok(body) => markers.iter().any(|marker| body.contains(marker.as_str())),
        Err(_) => false,
    }
}

/// Decides which fetcher kind serves the domain seeded at `seed_url`
pub async fn detect_fetcher_kind(
    seed_url: &str,
    mode: FetcherMode,
    client: &Client,
    spa_markers: &[String],
) -> FetcherKind {
    match mode {
        FetcherMode::Static => FetcherKind::Static,
        FetcherMode::Dynamic => FetcherKind::Dynamic,
        FetcherMode::Auto => {
            if looks_script_rendered(seed_url)
                || probe_for_spa_markers(client, seed_url, spa_markers).await
            {
                FetcherKind::Dynamic
            } else {
                FetcherKind::Static
            }
        }
    }
}

/// Chooses and constructs the fetcher for one domain
///
/// A dynamic fetcher whose browser fails to launch is still returned; it
/// reports `FetchError::Uninitialized` on first use.
pub async fn select_fetcher(seed_url: &str, config: &Config, client: &Client) -> Fetcher {
    let retry = RetryPolicy::from(&config.retry);
    let kind = detect_fetcher_kind(
        seed_url,
        config.crawler.fetcher_mode,
        client,
        &config.patterns.spa_markers,
    )
    .await;

    match kind {
        FetcherKind::Static => Fetcher::Static(StaticFetcher::new(client.clone(), retry)),
        FetcherKind::Dynamic => Fetcher::Dynamic(
            DynamicFetcher::launch(&config.browser, &config.http.user_agent, retry).await,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            initial_delay: Duration::from_millis(10),
            backoff_factor: 2.0,
        }
    }

    fn markers() -> Vec<String> {
        crate::config::DEFAULT_SPA_MARKERS
            .iter()
            .map(|m| m.to_string())
            .collect()
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn test_looks_script_rendered() {
        assert!(looks_script_rendered("https://shop.test/search?q=shoes"));
        assert!(looks_script_rendered("https://shop.test/#/catalog"));
        assert!(!looks_script_rendered("https://shop.test/catalog/shoes"));
        assert!(!looks_script_rendered("https://shop.test"));
    }

    #[test]
    fn test_fetcher_kind_display() {
        assert_eq!(FetcherKind::Static.to_string(), "static");
        assert_eq!(FetcherKind::Dynamic.to_string(), "dynamic");
    }

    #[tokio::test]
    async fn test_static_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let fetcher = StaticFetcher::new(Client::new(), test_policy());
        let body = fetcher
            .fetch_content(&format!("{}/list", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_static_fetch_non_200_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = StaticFetcher::new(Client::new(), test_policy());
        let body = fetcher
            .fetch_content(&format!("{}/gone", server.uri()))
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_static_fetch_connection_refused_is_empty() {
        // Bind then drop a server so the port is closed
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };

        let fetcher = StaticFetcher::new(Client::new(), test_policy());
        let body = fetcher.fetch_content(&format!("{}/x", uri)).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_probe_detects_spa_marker() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spa"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<script>window.__INITIAL_STATE__ = {}</script>",
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/plain"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>Catalog</p>"))
            .mount(&server)
            .await;

        let client = Client::new();
        let spa = format!("{}/spa", server.uri());
        let plain = format!("{}/plain", server.uri());

        assert!(probe_for_spa_markers(&client, &spa, &markers()).await);
        assert!(!probe_for_spa_markers(&client, &plain, &markers()).await);
        assert_eq!(
            detect_fetcher_kind(&spa, FetcherMode::Auto, &client, &markers()).await,
            FetcherKind::Dynamic
        );
        assert_eq!(
            detect_fetcher_kind(&plain, FetcherMode::Auto, &client, &markers()).await,
            FetcherKind::Static
        );
    }

    #[tokio::test]
    async fn test_forced_modes_skip_probe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = Client::new();
        let seed = format!("{}/search?q=1", server.uri());
        assert_eq!(
            detect_fetcher_kind(&seed, FetcherMode::Static, &client, &markers()).await,
            FetcherKind::Static
        );
        assert_eq!(
            detect_fetcher_kind(&seed, FetcherMode::Dynamic, &client, &markers()).await,
            FetcherKind::Dynamic
        );
    }

    #[tokio::test]
    async fn test_query_seed_is_dynamic_without_probe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let seed = format!("{}/search?q=shoes", server.uri());
        let kind = detect_fetcher_kind(&seed, FetcherMode::Auto, &Client::new(), &markers()).await;
        assert_eq!(kind, FetcherKind::Dynamic);
    }
}
