//! Live confirmation of candidate product URLs
//!
//! A candidate is a product page when a GET returns HTTP 200 and the body
//! mentions at least one product keyword (case-insensitive).

use crate::crawler::retry::{retry, RetryPolicy};
use crate::crawler::scheduler::{DomainGate, Scheduler};
use crate::FetchError;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct Validator {
    client: Client,
    keywords: Vec<String>,
    retry: RetryPolicy,
}

impl Validator {
    /// Keywords are lowercased once here; blank entries are dropped
    pub fn new(client: Client, keywords: &[String], retry: RetryPolicy) -> Self {
        let keywords = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Self {
            client,
            keywords,
            retry,
        }
    }

    /// Returns true if `body` mentions any product keyword
    pub fn matches_keywords(&self, body: &str) -> bool {
        let body = body.to_lowercase();
        self.keywords.iter().any(|keyword| body.contains(keyword))
    }

    async fn try_validate(&self, url: &str) -> Result<bool, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        if response.status() != StatusCode::OK {
            return Ok(false);
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        Ok(self.matches_keywords(&body))
    }

    /// Confirms a single URL; every error counts as "not a product"
    pub async fn validate(&self, url: &str) -> bool {
        match retry(&self.retry, || self.try_validate(url)).await {
            Ok(true) => true,
            Ok(false) => {
                tracing::debug!("URL {} was not valid or not a product page", url);
                false
            }
            Err(e) => {
                tracing::warn!("Could not validate URL {}: {}", url, e);
                false
            }
        }
    }

    /// Validates `urls` concurrently under the scheduler's caps
    ///
    /// Returns the confirmed subset.
    pub async fn validate_all<I>(&self, urls: I, scheduler: &Scheduler, gate: &DomainGate) -> BTreeSet<String>
    where
        I: IntoIterator<Item = String>,
    {
        let checks = urls.into_iter().map(|url| async move {
            let _permit = scheduler.acquire(gate).await?;
            self.validate(&url).await.then_some(url)
        });

        join_all(checks).await.into_iter().flatten().collect()
    }
}
