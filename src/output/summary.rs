//! Human-readable summaries of crawl results and stored jobs

use crate::crawler::CrawlResults;
use crate::storage::JobRecord;

/// Per-crawl statistics derived from the results map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Submitted domains that produced a result entry
    pub succeeded: usize,

    /// Submitted domains with no result entry
    pub failed_domains: Vec<String>,

    /// Product URLs across all domains
    pub total_products: usize,

    /// Product URL count per domain, largest first
    pub per_domain: Vec<(String, usize)>,
}

impl CrawlSummary {
    /// Builds a summary of `results` for the domains that were submitted
    pub fn new(submitted: &[String], results: &CrawlResults) -> Self {
        let failed_domains = submitted
            .iter()
            .filter(|domain| !results.contains_key(*domain))
            .cloned()
            .collect();

        let mut per_domain: Vec<(String, usize)> = results
            .iter()
            .map(|(domain, urls)| (domain.clone(), urls.len()))
            .collect();
        per_domain.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self {
            succeeded: results.len(),
            failed_domains,
            total_products: per_domain.iter().map(|(_, count)| count).sum(),
            per_domain,
        }
    }
}

/// Prints a crawl summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  Domains crawled: {}", summary.succeeded);
    println!("  Domains failed: {}", summary.failed_domains.len());
    println!("  Product URLs found: {}", summary.total_products);
    println!();

    if !summary.per_domain.is_empty() {
        println!("Products by Domain:");
        for (domain, count) in &summary.per_domain {
            println!("  {}: {}", domain, count);
        }
        println!();
    }

    if !summary.failed_domains.is_empty() {
        println!("Failed Domains ({}):", summary.failed_domains.len());
        for domain in &summary.failed_domains {
            println!("  - {}", domain);
        }
        println!();
    }
}

/// Prints a stored job record to stdout
pub fn print_job(job: &JobRecord) {
    println!("Job {}", job.id);
    println!("  Status: {}", job.status);
    println!("  Submitted: {}", job.submitted_at);
    if let Some(finished) = &job.finished_at {
        println!("  Finished: {}", finished);
    }
    if let Some(hash) = &job.config_hash {
        println!("  Config hash: {}", hash);
    }
    println!("  Domains: {}", job.domains.join(", "));
    if let Some(error) = &job.error {
        println!("  Error: {}", error);
    }
    if let Some(results) = &job.results {
        println!();
        print_summary(&CrawlSummary::new(&job.domains, results));
    }
}
