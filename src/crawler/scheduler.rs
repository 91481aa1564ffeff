//! Concurrency gates for product validation requests
//!
//! Two counting semaphores bound validation traffic:
//! - A global gate shared by every domain in the crawl
//! - One gate per domain, created when that domain's traversal starts
//!
//! A request always takes its domain permit before the global one, so a
//! domain waiting on its own cap never sits on a global permit.

use crate::config::CrawlerConfig;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Per-domain validation gate
#[derive(Debug, Clone)]
pub struct DomainGate {
    semaphore: Arc<Semaphore>,
}

impl DomainGate {
    /// Permits not currently held
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// Both permits for one in-flight validation; released on drop
#[derive(Debug)]
pub struct ValidationPermit {
    _domain: OwnedSemaphorePermit,
    _global: OwnedSemaphorePermit,
}

/// Scheduler hands out validation permits under the two caps
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Global semaphore shared across all domains
    global_semaphore: Arc<Semaphore>,

    /// Capacity of each newly created domain gate
    domain_capacity: usize,
}

impl Scheduler {
    /// Creates a scheduler with explicit capacities (each at least 1)
    pub fn new(global_capacity: usize, domain_capacity: usize) -> Self {
        Self {
            global_semaphore: Arc::new(Semaphore::new(global_capacity.max(1))),
            domain_capacity: domain_capacity.max(1),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            config.max_concurrent_validations as usize,
            config.max_domain_validations as usize,
        )
    }

    /// Creates a fresh gate for one domain traversal
    pub fn domain_gate(&self) -> DomainGate {
        DomainGate {
            semaphore: Arc::new(Semaphore::new(self.domain_capacity)),
        }
    }

    /// Waits for a domain permit, then a global permit
    ///
    /// Returns `None` only if a semaphore has been closed.
    pub async fn acquire(&self, gate: &DomainGate) -> Option<ValidationPermit> {
        let domain = gate.semaphore.clone().acquire_owned().await.ok()?;
        let global = self.global_semaphore.clone().acquire_owned().await.ok()?;

        Some(ValidationPermit {
            _domain: domain,
            _global: global,
        })
    }

    /// Global permits not currently held
    pub fn available_global(&self) -> usize {
        self.global_semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_scheduler() {
        let scheduler = Scheduler::from_config(&CrawlerConfig::default());
        assert_eq!(scheduler.available_global(), 500);
        assert_eq!(scheduler.domain_gate().available(), 50);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let scheduler = Scheduler::new(0, 0);
        assert_eq!(scheduler.available_global(), 1);
        assert_eq!(scheduler.domain_gate().available(), 1);
    }

    #[tokio::test]
    async fn test_permit_holds_both_gates() {
        let scheduler = Scheduler::new(4, 2);
        let gate = scheduler.domain_gate();

        let permit = scheduler.acquire(&gate).await.unwrap();
        assert_eq!(gate.available(), 1);
        assert_eq!(scheduler.available_global(), 3);

        drop(permit);
        assert_eq!(gate.available(), 2);
        assert_eq!(scheduler.available_global(), 4);
    }

    #[tokio::test]
    async fn test_domain_cap_blocks_without_taking_global() {
        let scheduler = Scheduler::new(10, 1);
        let gate = scheduler.domain_gate();

        let _held = scheduler.acquire(&gate).await.unwrap();
        let blocked =
            tokio::time::timeout(Duration::from_millis(50), scheduler.acquire(&gate)).await;

        assert!(blocked.is_err());
        assert_eq!(scheduler.available_global(), 9);
    }

    #[tokio::test]
    async fn test_domains_share_global_cap() {
        let scheduler = Scheduler::new(1, 5);
        let first = scheduler.domain_gate();
        let second = scheduler.domain_gate();

        let _held = scheduler.acquire(&first).await.unwrap();
        let blocked =
            tokio::time::timeout(Duration::from_millis(50), scheduler.acquire(&second)).await;
        assert!(blocked.is_err());
    }
}
