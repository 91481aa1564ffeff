//! Crawler module for listing traversal and product discovery
//!
//! This module contains the core crawling logic, including:
//! - Static (HTTP) and dynamic (headless browser) page fetching
//! - HTML parsing and product URL extraction
//! - Live validation of candidate URLs under concurrency caps
//! - Next-page detection and per-domain traversal
//! - Retry with exponential backoff for transient failures

mod browser;
mod coordinator;
mod extractor;
mod fetcher;
mod pagination;
mod parser;
mod retry;
mod scheduler;
mod validator;

pub use browser::DynamicFetcher;
pub use coordinator::{CrawlResults, Crawler};
pub use extractor::{Extraction, Extractor, ProductPatterns};
pub use fetcher::{
    build_http_client, detect_fetcher_kind, looks_script_rendered, probe_for_spa_markers,
    select_fetcher, Fetcher, FetcherKind, StaticFetcher,
};
pub use pagination::{detect_next_page, find_next_page, NextPage, PaginationStrategy};
pub use parser::collect_hrefs;
pub use retry::{retry, RetryError, RetryPolicy, Transient};
pub use scheduler::{DomainGate, Scheduler, ValidationPermit};
pub use validator::Validator;

use crate::config::Config;

/// Crawls every domain in `config` with the default log observer
///
/// This is the main entry point for a one-shot crawl.
///
/// # Returns
///
/// * `Ok(CrawlResults)` - Product URLs per domain that completed
/// * `Err(AisleError)` - The crawler could not be constructed
pub async fn crawl(config: Config) -> crate::Result<CrawlResults> {
    let domains = config.domains.clone();
    let crawler = Crawler::new(config)?;
    Ok(crawler.crawl_all_domains(&domains).await)
}
