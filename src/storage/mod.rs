//! Storage module for persisting crawl jobs
//!
//! This module handles all database operations for the job queue, including:
//! - SQLite database initialization and schema management
//! - Job submission records and status transitions
//! - Result payload persistence

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::crawler::CrawlResults;
use std::fmt;
use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Represents a submitted crawl job in the database
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub id: String,
    pub domains: Vec<String>,
    pub status: JobStatus,
    pub submitted_at: String,
    pub finished_at: Option<String>,
    /// SHA-256 of the configuration file the job ran under, when known
    pub config_hash: Option<String>,
    /// Present once the job has completed
    pub results: Option<CrawlResults>,
    /// Present once the job has failed
    pub error: Option<String>,
}

/// Status of a crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
