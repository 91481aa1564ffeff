use crate::state::DomainCrawlState;
use crate::AisleError;
use std::collections::{BTreeSet, HashSet};

/// Traversal state for one domain
///
/// Owns the visited set (grows monotonically, authoritative cycle guard) and
/// the accumulated product URLs. Lives exactly as long as one `crawl_domain`
/// call and is never shared with another domain.
#[derive(Debug)]
pub struct CrawlSession {
    domain: String,
    state: DomainCrawlState,
    visited: HashSet<String>,
    products: BTreeSet<String>,
}

impl CrawlSession {
    /// Creates an empty session in the `NotStarted` state
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            state: DomainCrawlState::NotStarted,
            visited: HashSet::new(),
            products: BTreeSet::new(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn state(&self) -> DomainCrawlState {
        self.state
    }

    /// Moves the session to `next`, rejecting illegal transitions
    pub fn transition(&mut self, next: DomainCrawlState) -> Result<(), AisleError> {
        if !self.state.can_transition_to(next) {
            return Err(AisleError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("{}: {} -> {}", self.domain, self.state, next);
        self.state = next;
        Ok(())
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Records `url` as visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    pub fn pages_visited(&self) -> usize {
        self.visited.len()
    }

    /// Adds a confirmed product URL; returns true if it was new
    pub fn add_product(&mut self, url: String) -> bool {
        self.products.insert(url)
    }

    pub fn products(&self) -> &BTreeSet<String> {
        &self.products
    }

    /// Consumes the session, yielding the product URLs in sorted order
    pub fn into_products(self) -> Vec<String> {
        self.products.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = CrawlSession::new("example.com");
        assert_eq!(session.domain(), "example.com");
        assert_eq!(session.state(), DomainCrawlState::NotStarted);
        assert_eq!(session.pages_visited(), 0);
        assert!(session.products().is_empty());
    }

    #[test]
    fn test_mark_visited_once() {
        let mut session = CrawlSession::new("example.com");
        assert!(session.mark_visited("https://example.com/s?page=1"));
        assert!(!session.mark_visited("https://example.com/s?page=1"));
        assert!(session.is_visited("https://example.com/s?page=1"));
        assert_eq!(session.pages_visited(), 1);
    }

    #[test]
    fn test_products_deduplicated_and_sorted() {
        let mut session = CrawlSession::new("example.com");
        assert!(session.add_product("https://example.com/p/b".to_string()));
        assert!(session.add_product("https://example.com/p/a".to_string()));
        assert!(!session.add_product("https://example.com/p/b".to_string()));

        assert_eq!(
            session.into_products(),
            vec![
                "https://example.com/p/a".to_string(),
                "https://example.com/p/b".to_string()
            ]
        );
    }

    #[test]
    fn test_transition_rules_enforced() {
        let mut session = CrawlSession::new("example.com");
        assert!(session.transition(DomainCrawlState::Completed).is_err());

        session.transition(DomainCrawlState::Traversing).unwrap();
        session.transition(DomainCrawlState::Completed).unwrap();
        assert!(matches!(
            session.transition(DomainCrawlState::Failed),
            Err(AisleError::InvalidTransition { .. })
        ));
    }
}
