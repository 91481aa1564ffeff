//! Configuration module for Aisle-Walker
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; omitted values fall back to the built-in
//! pattern tables and limits.
//!
//! # Example
//!
//! ```no_run
//! use aisle_walker::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("aisle-walker.toml")).unwrap();
//! println!("Global validation cap: {}", config.crawler.max_concurrent_validations);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, CrawlerConfig, FetcherMode, HttpConfig, OutputConfig, PatternConfig,
    RetryConfig, DEFAULT_PRODUCT_KEYWORDS, DEFAULT_PRODUCT_PATTERNS, DEFAULT_SPA_MARKERS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate_domains;
