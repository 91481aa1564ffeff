use serde::Deserialize;

/// Default product-URL shapes matched against raw anchor hrefs
pub const DEFAULT_PRODUCT_PATTERNS: &[&str] = &[
    r"/itm/[\d]+",
    r"/p/[\w-]+",
    r"/item/[\w-]+",
    r"/products/[\w-]+",
    r"/dp/[\w-]+",
    r#"itm\?[^"]*"#,
    r"/[\w-]+/p/[\w-]+",
    r"/[\w-]+/itm/[\d]+",
    r"/[\w-]+/item/[\w-]+",
];

/// Markup fragments that indicate a script-rendered page
pub const DEFAULT_SPA_MARKERS: &[&str] = &[
    "react",
    "angular",
    "vue",
    "jquery",
    "ajax",
    "window.__INITIAL_STATE__",
    "window.__APP_INITIAL_STATE__",
];

/// Body keywords that confirm a product page during live validation
pub const DEFAULT_PRODUCT_KEYWORDS: &[&str] = &["product", "item", "details", "description"];

/// Main configuration structure for Aisle-Walker
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Domains (bare hostnames or full URLs) to crawl
    pub domains: Vec<String>,
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub retry: RetryConfig,
    pub browser: BrowserConfig,
    pub patterns: PatternConfig,
    pub output: OutputConfig,
}

/// How the fetcher for a domain is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherMode {
    /// Decide per domain from the seed URL shape and a probe request
    #[default]
    Auto,
    /// Always plain HTTP
    Static,
    /// Always a headless browser
    Dynamic,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Validation requests in flight across all domains
    #[serde(rename = "max-concurrent-validations")]
    pub max_concurrent_validations: u32,

    /// Validation requests in flight for a single domain
    #[serde(rename = "max-domain-validations")]
    pub max_domain_validations: u32,

    #[serde(rename = "fetcher-mode")]
    pub fetcher_mode: FetcherMode,

    /// Upper bound on listing pages fetched per domain (0 = unlimited)
    #[serde(rename = "max-pages-per-domain")]
    pub max_pages_per_domain: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_validations: 500,
            max_domain_validations: 50,
            fetcher_mode: FetcherMode::Auto,
            max_pages_per_domain: 0,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Total time allowed for one request, body included
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("AisleWalker/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    #[serde(rename = "initial-delay-ms")]
    pub initial_delay_ms: u64,

    #[serde(rename = "backoff-factor")]
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            backoff_factor: 2.0,
        }
    }
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Chrome/Chromium binary; autodetected when absent
    pub executable: Option<String>,

    #[serde(rename = "navigation-timeout-secs")]
    pub navigation_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            navigation_timeout_secs: 30,
        }
    }
}

/// Static pattern tables read by the extractor and fetcher selection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Regexes matched against raw hrefs
    pub product: Vec<String>,

    #[serde(rename = "spa-markers")]
    pub spa_markers: Vec<String>,

    /// Case-insensitive body keywords required for a confirmed product page
    pub keywords: Vec<String>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            product: DEFAULT_PRODUCT_PATTERNS.iter().map(|p| p.to_string()).collect(),
            spa_markers: DEFAULT_SPA_MARKERS.iter().map(|m| m.to_string()).collect(),
            keywords: DEFAULT_PRODUCT_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite job store
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Where the results JSON is written; stdout when absent
    #[serde(rename = "results-path")]
    pub results_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./aisle-walker.db".to_string(),
            results_path: None,
        }
    }
}
