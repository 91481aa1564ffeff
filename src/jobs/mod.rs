//! In-process crawl job queue
//!
//! `submit` records a pending job and returns its id at once; the crawl runs
//! on a spawned task and writes its outcome back to the job store. Callers
//! poll with `status` or block with `wait`.

use crate::crawler::{CrawlResults, Crawler};
use crate::storage::{JobRecord, SqliteStorage, Storage, StorageError};
use crate::url::ensure_scheme;
use crate::{AisleError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

pub use crate::storage::JobStatus;

/// Submits crawls and tracks them in the job store
#[derive(Clone)]
pub struct JobQueue {
    crawler: Arc<Crawler>,
    storage: Arc<Mutex<SqliteStorage>>,
    config_hash: Option<String>,
    /// Jobs whose outcome never reached the store, keyed by id
    lost: Arc<Mutex<HashMap<Uuid, String>>>,
}

impl JobQueue {
    pub fn new(crawler: Crawler, storage: SqliteStorage) -> Self {
        Self {
            crawler: Arc::new(crawler),
            storage: Arc::new(Mutex::new(storage)),
            config_hash: None,
            lost: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Tags every job submitted from now on with the configuration hash
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    fn storage(&self) -> std::result::Result<MutexGuard<'_, SqliteStorage>, StorageError> {
        self.storage.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Records a pending job for `domains` and starts crawling them
    ///
    /// Bare hostnames are given an `https://` scheme. Must be called from
    /// within a tokio runtime.
    pub fn submit(&self, domains: &[String]) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let domains: Vec<String> = domains.iter().map(|d| ensure_scheme(d)).collect();

        let record = JobRecord {
            id: id.to_string(),
            domains: domains.clone(),
            status: JobStatus::Pending,
            submitted_at: Utc::now().to_rfc3339(),
            finished_at: None,
            config_hash: self.config_hash.clone(),
            results: None,
            error: None,
        };
        self.storage()?.insert_job(&record)?;
        tracing::info!("Submitted job {} for {} domains", id, domains.len());

        let queue = self.clone();
        tokio::spawn(async move { queue.run_job(id, domains).await });

        Ok(id)
    }

    async fn run_job(&self, id: Uuid, domains: Vec<String>) {
        let crawler = Arc::clone(&self.crawler);
        let crawl = tokio::spawn(async move { crawler.crawl_all_domains(&domains).await });

        let recorded = match crawl.await {
            Ok(results) => self.record_completion(&id, &results).or_else(|e| {
                tracing::error!("Failed to store results of job {}: {}", id, e);
                self.record_failure(&id, &format!("failed to store results: {}", e))
            }),
            Err(e) => {
                tracing::error!("Job {} crashed: {}", id, e);
                self.record_failure(&id, &e.to_string())
            }
        };

        if let Err(e) = recorded {
            tracing::error!("Failed to record outcome of job {}: {}", id, e);
            match self.lost.lock() {
                Ok(mut lost) => {
                    lost.insert(id, e.to_string());
                }
                Err(_) => tracing::error!("Lost-job registry is poisoned"),
            }
        }
    }

    fn lost_reason(&self, id: &Uuid) -> Result<Option<String>> {
        let lost = self.lost.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(lost.get(id).cloned())
    }

    fn record_completion(&self, id: &Uuid, results: &CrawlResults) -> Result<()> {
        self.storage()?.complete_job(&id.to_string(), results)?;
        tracing::info!("Job {} completed with {} domains", id, results.len());
        Ok(())
    }

    fn record_failure(&self, id: &Uuid, error: &str) -> Result<()> {
        self.storage()?.fail_job(&id.to_string(), error)?;
        Ok(())
    }

    /// Returns the stored job, or `None` for an unknown id
    pub fn status(&self, id: &Uuid) -> Result<Option<JobRecord>> {
        Ok(self.storage()?.get_job(&id.to_string())?)
    }

    /// Polls until the job is no longer pending
    ///
    /// Fails with [`AisleError::JobOutcomeLost`] when the job ended but its
    /// outcome could not be written to the store.
    pub async fn wait(&self, id: &Uuid, poll_interval: Duration) -> Result<JobRecord> {
        loop {
            match self.status(id)? {
                Some(job) if job.status.is_finished() => return Ok(job),
                Some(_) => {
                    if let Some(reason) = self.lost_reason(id)? {
                        return Err(AisleError::JobOutcomeLost {
                            id: id.to_string(),
                            reason,
                        });
                    }
                    tokio::time::sleep(poll_interval).await
                }
                None => return Err(AisleError::JobNotFound(id.to_string())),
            }
        }
    }

    /// Lists all stored jobs, newest first
    pub fn jobs(&self) -> Result<Vec<JobRecord>> {
        Ok(self.storage()?.list_jobs(None)?)
    }
}
