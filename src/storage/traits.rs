//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::CrawlResults;
use crate::storage::{JobRecord, JobStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Job {id} is already {status}")]
    JobFinished { id: String, status: JobStatus },

    #[error("Corrupt job record {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for job store implementations
///
/// A job moves from `Pending` to exactly one of `Completed` or `Failed`.
/// Finishing an already finished job is rejected.
pub trait Storage {
    /// Records a newly submitted job
    fn insert_job(&mut self, job: &JobRecord) -> StorageResult<()>;

    /// Gets a job by ID
    fn get_job(&self, id: &str) -> StorageResult<Option<JobRecord>>;

    /// Marks a pending job completed and stores its results
    fn complete_job(&mut self, id: &str, results: &CrawlResults) -> StorageResult<()>;

    /// Marks a pending job failed with an error description
    fn fail_job(&mut self, id: &str, error: &str) -> StorageResult<()>;

    /// Lists jobs, newest first, optionally filtered by status
    fn list_jobs(&self, status: Option<JobStatus>) -> StorageResult<Vec<JobRecord>>;
}
