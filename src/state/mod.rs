//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `DomainCrawlState`: lifecycle of one domain traversal (not started, traversing, completed, failed)
//! - `CrawlSession`: per-domain visited set and accumulated product URLs

mod domain_state;
mod session;

// Re-export main types
pub use domain_state::DomainCrawlState;
pub use session::CrawlSession;
