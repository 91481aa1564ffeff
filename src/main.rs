//! Aisle-Walker main entry point
//!
//! This is the command-line interface for the Aisle-Walker product URL crawler.

use aisle_walker::config::{load_config_with_hash, validate_domains, Config};
use aisle_walker::jobs::{JobQueue, JobStatus};
use aisle_walker::output::{print_job, print_summary, write_results, CrawlSummary};
use aisle_walker::storage::SqliteStorage;
use aisle_walker::Crawler;
use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Aisle-Walker: product URL discovery for e-commerce sites
///
/// Aisle-Walker walks the listing pages of each configured domain, follows
/// pagination, and reports the product-detail URLs it could confirm.
#[derive(Parser, Debug)]
#[command(name = "aisle-walker")]
#[command(version)]
#[command(about = "Product URL discovery for e-commerce domains", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl these domains instead of the ones in the config (repeatable)
    #[arg(long = "domain", value_name = "DOMAIN")]
    domains: Vec<String>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "status")]
    dry_run: bool,

    /// Show a stored job and exit
    #[arg(long, value_name = "JOB_ID", conflicts_with = "dry_run")]
    status: Option<Uuid>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if !cli.domains.is_empty() {
        validate_domains(&cli.domains).context("Invalid --domain value")?;
        config.domains = cli.domains.clone();
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else if let Some(job_id) = cli.status {
        handle_status(&config, &job_id)?;
    } else {
        handle_crawl(config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("aisle_walker=info,warn"),
            1 => EnvFilter::new("aisle_walker=debug,info"),
            2 => EnvFilter::new("aisle_walker=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Aisle-Walker Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Max concurrent validations: {}",
        config.crawler.max_concurrent_validations
    );
    println!(
        "  Max validations per domain: {}",
        config.crawler.max_domain_validations
    );
    println!("  Fetcher mode: {:?}", config.crawler.fetcher_mode);
    match config.crawler.max_pages_per_domain {
        0 => println!("  Max pages per domain: unlimited"),
        n => println!("  Max pages per domain: {}", n),
    }

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!(
        "  Timeouts: connect {}s, request {}s",
        config.http.connect_timeout_secs, config.http.request_timeout_secs
    );

    println!("\nRetry:");
    println!(
        "  {} attempts, {}ms initial delay, x{} backoff",
        config.retry.max_attempts, config.retry.initial_delay_ms, config.retry.backoff_factor
    );

    println!("\nPatterns:");
    println!("  Product shapes: {}", config.patterns.product.len());
    println!("  SPA markers: {}", config.patterns.spa_markers.len());
    println!("  Keywords: {}", config.patterns.keywords.join(", "));

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!(
        "  Results: {}",
        config.output.results_path.as_deref().unwrap_or("stdout")
    );

    println!("\nDomains ({}):", config.domains.len());
    for domain in &config.domains {
        println!("  - {}", domain);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --status mode: prints a stored job
fn handle_status(config: &Config, job_id: &Uuid) -> anyhow::Result<()> {
    use aisle_walker::storage::Storage;

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .context("Failed to open job database")?;

    match storage.get_job(&job_id.to_string())? {
        Some(job) => print_job(&job),
        None => bail!("No job with id {}", job_id),
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String) -> anyhow::Result<()> {
    if config.domains.is_empty() {
        bail!("No domains to crawl; add `domains` to the config or pass --domain");
    }

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .context("Failed to open job database")?;
    let results_path = config.output.results_path.clone().map(PathBuf::from);
    let domains = config.domains.clone();

    let crawler = Crawler::new(config).context("Failed to initialize crawler")?;
    let queue = JobQueue::new(crawler, storage).with_config_hash(config_hash);

    let job_id = queue.submit(&domains)?;
    tracing::info!("Job {} submitted", job_id);

    let job = queue.wait(&job_id, Duration::from_millis(500)).await?;
    match (job.status, job.results) {
        (JobStatus::Completed, Some(results)) => {
            let summary = CrawlSummary::new(&job.domains, &results);
            // stdout carries the JSON when no results file is configured
            if results_path.is_some() {
                print_summary(&summary);
            } else {
                tracing::info!(
                    "{} of {} domains crawled, {} product URLs",
                    summary.succeeded,
                    job.domains.len(),
                    summary.total_products
                );
            }
            write_results(results_path.as_deref(), &results)?;
            Ok(())
        }
        (status, _) => bail!(
            "Job {} ended as {}: {}",
            job_id,
            status,
            job.error.unwrap_or_default()
        ),
    }
}
