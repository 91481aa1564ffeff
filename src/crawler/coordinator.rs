//! Crawler coordinator - main crawl orchestration logic
//!
//! Domains are crawled concurrently within a single task. Each domain owns
//! its fetcher, its [`CrawlSession`] and its validation gate; nothing but the
//! HTTP client and the global validation cap is shared between domains.
//!
//! Traversal of one domain is a loop over listing pages. The visited set is
//! the termination guarantee: a page is fetched at most once, so pagination
//! cycles stop on their own.

use crate::config::Config;
use crate::crawler::extractor::{Extractor, ProductPatterns};
use crate::crawler::fetcher::{build_http_client, select_fetcher, Fetcher};
use crate::crawler::pagination::detect_next_page;
use crate::crawler::retry::RetryPolicy;
use crate::crawler::scheduler::{DomainGate, Scheduler};
use crate::crawler::validator::Validator;
use crate::progress::{CrawlEvent, Notifier, Observer};
use crate::state::{CrawlSession, DomainCrawlState};
use crate::url::ensure_scheme;
use crate::{AisleError, Result};
use futures::future::join_all;
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

/// Product URLs per successfully crawled domain
pub type CrawlResults = BTreeMap<String, Vec<String>>;

/// Main crawler structure
pub struct Crawler {
    config: Arc<Config>,
    client: Client,
    scheduler: Scheduler,
    extractor: Extractor,
    notifier: Notifier,
}

impl Crawler {
    /// Creates a crawler that reports progress through `tracing`
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Client built and pattern table compiled
    /// * `Err(AisleError)` - Invalid pattern or HTTP client failure
    pub fn new(config: Config) -> Result<Self> {
        Self::with_notifier(config, Notifier::with_default_observer())
    }

    /// Creates a crawler that reports progress to `notifier`
    pub fn with_notifier(config: Config, notifier: Notifier) -> Result<Self> {
        let client = build_http_client(&config.http)?;
        let patterns = ProductPatterns::from_config(&config)?;
        let validator = Validator::new(
            client.clone(),
            &config.patterns.keywords,
            RetryPolicy::from(&config.retry),
        );

        Ok(Self {
            scheduler: Scheduler::from_config(&config.crawler),
            extractor: Extractor::new(patterns, validator),
            config: Arc::new(config),
            client,
            notifier,
        })
    }

    /// Registers an additional progress observer
    pub fn attach(&mut self, observer: Arc<dyn Observer>) {
        self.notifier.attach(observer);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates the validation gate for a new domain traversal
    pub fn domain_gate(&self) -> DomainGate {
        self.scheduler.domain_gate()
    }

    /// Crawls every domain concurrently and collects their product URLs
    ///
    /// A failing domain is logged and left out of the results; it never
    /// affects the others.
    pub async fn crawl_all_domains(&self, domains: &[String]) -> CrawlResults {
        self.notifier.notify(CrawlEvent::CrawlStarted {
            domains: domains.len(),
        });

        let crawls = domains.iter().map(|domain| async move {
            let outcome = self.crawl_domain(domain).await;
            (domain, outcome)
        });

        let mut results = CrawlResults::new();
        for (domain, outcome) in join_all(crawls).await {
            match outcome {
                Ok(urls) => {
                    results.insert(domain.clone(), urls);
                }
                Err(e) => self.notifier.notify(CrawlEvent::DomainFailed {
                    domain: domain.clone(),
                    error: e.to_string(),
                }),
            }
        }

        self.notifier.notify(CrawlEvent::CrawlFinished {
            succeeded: results.len(),
            total: domains.len(),
        });
        results
    }

    /// Traverses one domain's listing pages, starting at the domain itself
    ///
    /// # Returns
    ///
    /// * `Ok(urls)` - Sorted, deduplicated product URLs (possibly empty)
    /// * `Err(AisleError)` - Unusable seed URL or no browser session
    pub async fn crawl_domain(&self, domain: &str) -> Result<Vec<String>> {
        let mut session = CrawlSession::new(domain);
        let seed = ensure_scheme(domain);

        let parsed = match Url::parse(&seed) {
            Ok(parsed) => parsed,
            Err(e) => {
                session.transition(DomainCrawlState::Failed)?;
                return Err(e.into());
            }
        };
        if parsed.host_str().is_none() {
            session.transition(DomainCrawlState::Failed)?;
            return Err(AisleError::MissingHost(seed));
        }
        // Same spelling as every normalized pagination URL (`http://host/`)
        let seed = parsed.to_string();

        let mut fetcher = select_fetcher(&seed, &self.config, &self.client).await;
        let gate = self.domain_gate();

        self.notifier.notify(CrawlEvent::DomainStarted {
            domain: domain.to_string(),
            fetcher: fetcher.kind(),
        });
        session.transition(DomainCrawlState::Traversing)?;

        let outcome = self
            .traverse(domain, &seed, &mut session, &fetcher, &gate)
            .await;
        fetcher.close().await;

        match outcome {
            Ok(()) => {
                session.transition(DomainCrawlState::Completed)?;
                self.notifier.notify(CrawlEvent::DomainFinished {
                    domain: domain.to_string(),
                    products: session.products().len(),
                    pages: session.pages_visited(),
                });
                Ok(session.into_products())
            }
            Err(e) => {
                session.transition(DomainCrawlState::Failed)?;
                Err(e)
            }
        }
    }

    async fn traverse(
        &self,
        domain: &str,
        seed: &str,
        session: &mut CrawlSession,
        fetcher: &Fetcher,
        gate: &DomainGate,
    ) -> Result<()> {
        let page_limit = self.config.crawler.max_pages_per_domain as usize;
        let mut next = Some(seed.to_string());

        while let Some(url) = next.take() {
            if page_limit > 0 && session.pages_visited() >= page_limit {
                tracing::info!(
                    "{}: page limit of {} reached, stopping pagination",
                    domain,
                    page_limit
                );
                break;
            }
            next = self.crawl_page(domain, &url, session, fetcher, gate).await?;
        }

        Ok(())
    }

    /// Processes one listing page
    ///
    /// # Returns
    ///
    /// * `Ok(Some(url))` - The next page to visit
    /// * `Ok(None)` - Pagination ends here (visited, empty, or last page)
    /// * `Err(AisleError)` - The fetcher cannot serve this domain at all
    pub async fn crawl_page(
        &self,
        domain: &str,
        url: &str,
        session: &mut CrawlSession,
        fetcher: &Fetcher,
        gate: &DomainGate,
    ) -> Result<Option<String>> {
        if !session.mark_visited(url) {
            tracing::debug!("{}: {} already visited", domain, url);
            return Ok(None);
        }

        let content = fetcher.fetch_content(url).await?;
        if content.trim().is_empty() {
            self.notifier.notify(CrawlEvent::NoContent {
                domain: domain.to_string(),
                url: url.to_string(),
            });
            return Ok(None);
        }

        let extraction = self
            .extractor
            .extract_product_urls(domain, &content, &self.scheduler, gate)
            .await;

        if extraction.fallback_used && !extraction.urls.is_empty() {
            self.notifier.notify(CrawlEvent::NewUrlPattern {
                domain: domain.to_string(),
                urls: extraction.urls.len(),
            });
        }

        for product in extraction.urls {
            if session.add_product(product.clone()) {
                self.notifier.notify(CrawlEvent::ProductFound {
                    domain: domain.to_string(),
                    url: product,
                });
            }
        }

        let next = detect_next_page(&content, url);
        if let Some(next_page) = &next {
            tracing::debug!("{}: next page via {}", domain, next_page.strategy);
            self.notifier.notify(CrawlEvent::NextPage {
                domain: domain.to_string(),
                url: next_page.url.clone(),
            });
        }

        Ok(next.map(|next_page| next_page.url))
    }
}
