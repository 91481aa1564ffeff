//! Aisle-Walker: product URL discovery for e-commerce domains
//!
//! This crate crawls e-commerce listing pages, follows pagination, and collects
//! the URLs of product-detail pages without a site-specific parser per domain.
//! Candidates are matched against a table of product URL shapes and then
//! confirmed with a live request before they are reported.

pub mod config;
pub mod crawler;
pub mod jobs;
pub mod output;
pub mod progress;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Aisle-Walker operations
#[derive(Debug, Error)]
pub enum AisleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::DomainCrawlState,
        to: state::DomainCrawlState,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Seed URL has no host: {0}")]
    MissingHost(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Outcome of job {id} could not be stored: {reason}")]
    JobOutcomeLost { id: String, reason: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL pattern: {0}")]
    InvalidPattern(String),
}

/// Errors raised while retrieving page content
#[derive(Debug, Error)]
pub enum FetchError {
    /// Timeout or connection failure; eligible for retry
    #[error("Transient network error for {url}: {message}")]
    Transient { url: String, message: String },

    /// The browser session could not be created for this fetcher
    #[error("Fetcher uninitialized: browser session unavailable")]
    Uninitialized,

    /// Navigation or DOM serialization failed inside the browser
    #[error("Browser error for {url}: {message}")]
    Browser { url: String, message: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },
}

impl FetchError {
    /// Classifies a reqwest error for the given URL
    pub fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() {
            FetchError::Transient {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            FetchError::Http {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

impl crawler::Transient for FetchError {
    fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient { .. })
    }
}

/// Result type alias for Aisle-Walker operations
pub type Result<T> = std::result::Result<T, AisleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, CrawlResults};
pub use jobs::{JobQueue, JobStatus};
pub use state::{CrawlSession, DomainCrawlState};
pub use url::normalize;
