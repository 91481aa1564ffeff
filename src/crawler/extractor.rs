//! Product URL extraction from listing pages
//!
//! # Phases
//!
//! 1. Hrefs matching a known product shape are normalized and become
//!    candidates (images excluded).
//! 2. Candidates are confirmed with a live request.
//! 3. Only if nothing was confirmed: every remaining href on the page is
//!    validated, which discovers product shapes missing from the table.

use crate::config::Config;
use crate::crawler::parser::collect_hrefs;
use crate::crawler::scheduler::{DomainGate, Scheduler};
use crate::crawler::validator::Validator;
use crate::url::{is_image_url, normalize};
use crate::ConfigError;
use regex::Regex;
use std::collections::BTreeSet;

/// The compiled product-shape table
#[derive(Debug, Clone)]
pub struct ProductPatterns {
    regexes: Vec<Regex>,
}

impl ProductPatterns {
    /// Compiles every pattern, failing on the first invalid one
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let regexes = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref())
                    .map_err(|e| ConfigError::InvalidPattern(format!("{}: {}", p.as_ref(), e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { regexes })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::compile(&config.patterns.product)
    }

    /// Returns true if `href` contains any product shape
    pub fn is_match(&self, href: &str) -> bool {
        self.regexes.iter().any(|regex| regex.is_match(href))
    }

    pub fn len(&self) -> usize {
        self.regexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regexes.is_empty()
    }
}

/// Confirmed product URLs of one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub urls: BTreeSet<String>,

    /// True when the URLs came from fallback discovery
    pub fallback_used: bool,
}

#[derive(Debug, Clone)]
pub struct Extractor {
    patterns: ProductPatterns,
    validator: Validator,
}

impl Extractor {
    pub fn new(patterns: ProductPatterns, validator: Validator) -> Self {
        Self {
            patterns,
            validator,
        }
    }

    /// Normalized, non-image URLs of hrefs matching a product shape
    pub fn candidate_urls(&self, domain: &str, hrefs: &[String]) -> BTreeSet<String> {
        hrefs
            .iter()
            .filter(|href| self.patterns.is_match(href))
            .map(|href| normalize(domain, href))
            .filter(|url| !is_image_url(url))
            .collect()
    }

    /// Normalized, non-image URLs of every href not already in `tried`
    pub fn fallback_urls(
        &self,
        domain: &str,
        hrefs: &[String],
        tried: &BTreeSet<String>,
    ) -> BTreeSet<String> {
        hrefs
            .iter()
            .map(|href| normalize(domain, href))
            .filter(|url| !tried.contains(url) && !is_image_url(url))
            .collect()
    }

    /// Runs all extraction phases over one page of listing HTML
    pub async fn extract_product_urls(
        &self,
        domain: &str,
        content: &str,
        scheduler: &Scheduler,
        gate: &DomainGate,
    ) -> Extraction {
        let hrefs = collect_hrefs(content);
        let candidates = self.candidate_urls(domain, &hrefs);
        tracing::debug!(
            "{}: {} anchors, {} product candidates",
            domain,
            hrefs.len(),
            candidates.len()
        );

        let confirmed = self
            .validator
            .validate_all(candidates.iter().cloned(), scheduler, gate)
            .await;
        if !confirmed.is_empty() {
            return Extraction {
                urls: confirmed,
                fallback_used: false,
            };
        }

        let fallback = self.fallback_urls(domain, &hrefs, &candidates);
        tracing::debug!(
            "{}: no known product shapes confirmed, validating {} other links",
            domain,
            fallback.len()
        );

        let discovered = self
            .validator
            .validate_all(fallback, scheduler, gate)
            .await;

        Extraction {
            urls: discovered,
            fallback_used: true,
        }
    }
}
