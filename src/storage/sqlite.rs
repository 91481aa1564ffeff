//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::CrawlResults;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{JobRecord, JobStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const JOB_COLUMNS: &str =
    "id, domains, status, submitted_at, finished_at, config_hash, results, error";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

/// Raw column values of one `jobs` row, decoded after the row borrow ends
struct JobRow {
    id: String,
    domains: String,
    status: String,
    submitted_at: String,
    finished_at: Option<String>,
    config_hash: Option<String>,
    results: Option<String>,
    error: Option<String>,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            domains: row.get(1)?,
            status: row.get(2)?,
            submitted_at: row.get(3)?,
            finished_at: row.get(4)?,
            config_hash: row.get(5)?,
            results: row.get(6)?,
            error: row.get(7)?,
        })
    }

    fn decode(self) -> StorageResult<JobRecord> {
        let status = JobStatus::from_db_string(&self.status).ok_or_else(|| StorageError::Corrupt {
            id: self.id.clone(),
            reason: format!("unknown status '{}'", self.status),
        })?;
        let domains: Vec<String> = serde_json::from_str(&self.domains)?;
        let results: Option<CrawlResults> = self
            .results
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(JobRecord {
            id: self.id,
            domains,
            status,
            submitted_at: self.submitted_at,
            finished_at: self.finished_at,
            config_hash: self.config_hash,
            results,
            error: self.error,
        })
    }
}

impl SqliteStorage {
    /// Opens or creates the job database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn finish_job(
        &mut self,
        id: &str,
        status: JobStatus,
        results: Option<String>,
        error: Option<&str>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE jobs SET status = ?1, finished_at = ?2, results = ?3, error = ?4
             WHERE id = ?5 AND status = ?6",
            params![
                status.to_db_string(),
                now,
                results,
                error,
                id,
                JobStatus::Pending.to_db_string()
            ],
        )?;

        if updated == 1 {
            return Ok(());
        }

        match self.get_job(id)? {
            Some(job) => Err(StorageError::JobFinished {
                id: id.to_string(),
                status: job.status,
            }),
            None => Err(StorageError::JobNotFound(id.to_string())),
        }
    }
}

impl Storage for SqliteStorage {
    fn insert_job(&mut self, job: &JobRecord) -> StorageResult<()> {
        let domains = serde_json::to_string(&job.domains)?;
        let results = job.results.as_ref().map(serde_json::to_string).transpose()?;

        self.conn.execute(
            "INSERT INTO jobs (id, domains, status, submitted_at, finished_at, config_hash, results, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                job.id,
                domains,
                job.status.to_db_string(),
                job.submitted_at,
                job.finished_at,
                job.config_hash,
                results,
                job.error
            ],
        )?;
        Ok(())
    }

    fn get_job(&self, id: &str) -> StorageResult<Option<JobRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS),
                params![id],
                JobRow::from_row,
            )
            .optional()?;

        row.map(JobRow::decode).transpose()
    }

    fn complete_job(&mut self, id: &str, results: &CrawlResults) -> StorageResult<()> {
        let payload = serde_json::to_string(results)?;
        self.finish_job(id, JobStatus::Completed, Some(payload), None)
    }

    fn fail_job(&mut self, id: &str, error: &str) -> StorageResult<()> {
        self.finish_job(id, JobStatus::Failed, None, Some(error))
    }

    fn list_jobs(&self, status: Option<JobStatus>) -> StorageResult<Vec<JobRecord>> {
        let rows = match status {
            Some(status) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM jobs WHERE status = ?1 ORDER BY submitted_at DESC",
                    JOB_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![status.to_db_string()], JobRow::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM jobs ORDER BY submitted_at DESC",
                    JOB_COLUMNS
                ))?;
                let rows = stmt
                    .query_map([], JobRow::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };

        rows.into_iter().map(JobRow::decode).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pending(id: &str, submitted_at: &str) -> JobRecord {
        JobRecord {
            id: id.to_string(),
            domains: vec!["https://shop.test".to_string()],
            status: JobStatus::Pending,
            submitted_at: submitted_at.to_string(),
            finished_at: None,
            config_hash: Some("abc123".to_string()),
            results: None,
            error: None,
        }
    }

    #[test]
    fn test_insert_and_get_job() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let job = pending("job-1", "2026-01-01T00:00:00+00:00");
        storage.insert_job(&job).unwrap();

        let loaded = storage.get_job("job-1").unwrap().unwrap();
        assert_eq!(loaded, job);
    }

    #[test]
    fn test_missing_job_is_none() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.get_job("nope").unwrap().is_none());
    }

    #[test]
    fn test_complete_job_stores_results() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .insert_job(&pending("job-1", "2026-01-01T00:00:00+00:00"))
            .unwrap();

        let mut results = CrawlResults::new();
        results.insert(
            "https://shop.test".to_string(),
            vec!["https://shop.test/itm/1".to_string()],
        );
        storage.complete_job("job-1", &results).unwrap();

        let loaded = storage.get_job("job-1").unwrap().unwrap();
        assert_eq!(loaded.status, JobStatus::Completed);
        assert_eq!(loaded.results, Some(results));
        assert!(loaded.finished_at.is_some());
        assert!(loaded.error.is_none());
    }

    #[test]
    fn test_fail_job_records_error() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .insert_job(&pending("job-1", "2026-01-01T00:00:00+00:00"))
            .unwrap();
        storage.fail_job("job-1", "crawl task panicked").unwrap();

        let loaded = storage.get_job("job-1").unwrap().unwrap();
        assert_eq!(loaded.status, JobStatus::Failed);
        assert_eq!(loaded.error.as_deref(), Some("crawl task panicked"));
        assert!(loaded.results.is_none());
    }

    #[test]
    fn test_finished_job_cannot_finish_again() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .insert_job(&pending("job-1", "2026-01-01T00:00:00+00:00"))
            .unwrap();
        storage.fail_job("job-1", "boom").unwrap();

        let result = storage.complete_job("job-1", &CrawlResults::new());
        assert!(matches!(
            result,
            Err(StorageError::JobFinished {
                status: JobStatus::Failed,
                ..
            })
        ));
    }

    #[test]
    fn test_finish_unknown_job() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(
            storage.fail_job("ghost", "boom"),
            Err(StorageError::JobNotFound(_))
        ));
    }

    #[test]
    fn test_list_jobs_newest_first_and_filtered() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .insert_job(&pending("old", "2026-01-01T00:00:00+00:00"))
            .unwrap();
        storage
            .insert_job(&pending("new", "2026-02-01T00:00:00+00:00"))
            .unwrap();
        storage.complete_job("old", &CrawlResults::new()).unwrap();

        let all: Vec<String> = storage
            .list_jobs(None)
            .unwrap()
            .into_iter()
            .map(|j| j.id)
            .collect();
        assert_eq!(all, vec!["new".to_string(), "old".to_string()]);

        let pending_jobs = storage.list_jobs(Some(JobStatus::Pending)).unwrap();
        assert_eq!(pending_jobs.len(), 1);
        assert_eq!(pending_jobs[0].id, "new");
    }

    #[test]
    fn test_file_database_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jobs.db");

        {
            let mut storage = SqliteStorage::new(&path).unwrap();
            storage
                .insert_job(&pending("job-1", "2026-01-01T00:00:00+00:00"))
                .unwrap();
        }

        let storage = SqliteStorage::new(&path).unwrap();
        assert!(storage.get_job("job-1").unwrap().is_some());
    }
}
