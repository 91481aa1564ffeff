//! Output module for crawl results and reports
//!
//! This module handles:
//! - Writing the domain -> product URLs map as JSON
//! - Printing crawl and job summaries

mod summary;

pub use summary::{print_job, print_summary, CrawlSummary};

use crate::crawler::CrawlResults;
use crate::Result;
use std::fs;
use std::path::Path;

/// Serializes results as pretty-printed JSON
pub fn render_results(results: &CrawlResults) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Writes results as JSON to `path`, or to stdout when `path` is `None`
///
/// Parent directories are created as needed.
pub fn write_results(path: Option<&Path>, results: &CrawlResults) -> Result<()> {
    let json = render_results(results)?;

    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json + "\n")?;
            tracing::info!("Results written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> CrawlResults {
        let mut results = CrawlResults::new();
        results.insert(
            "https://shop.test".to_string(),
            vec![
                "https://shop.test/itm/1".to_string(),
                "https://shop.test/itm/2".to_string(),
            ],
        );
        results
    }

    #[test]
    fn test_render_is_json_object_of_lists() {
        let json = render_results(&sample()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["https://shop.test"][1], "https://shop.test/itm/2");
    }

    #[test]
    fn test_write_results_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("results.json");

        write_results(Some(&path), &sample()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let parsed: CrawlResults = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, sample());
    }
}
