//! Job Repository
//!
//! Job metadata lives in its own namespace as JSON documents under `job:{id}`.

use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use seismo_core::domain::job::{Job, JobStatus, TransitionError};
use seismo_core::dto::job::JobStats;

use crate::backend::Store;
use crate::error::{Result, StoreError};

const JOB_PREFIX: &str = "job:";

fn job_key(id: &str) -> String {
    format!("{}{}", JOB_PREFIX, id)
}

#[derive(Clone)]
pub struct JobRepository {
    store: Arc<dyn Store>,
}

impl JobRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Persists a new job; fails if the identifier is already taken
    pub async fn create(&self, job: &Job) -> Result<()> {
        let raw = serde_json::to_vec(job)?;
        if !self.store.set_if_absent(&job_key(&job.id), &raw).await? {
            return Err(StoreError::AlreadyExists(format!("job {}", job.id)));
        }
        debug!("Created job {}", job.id);
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Job>> {
        match self.store.get(&job_key(id)).await? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// Overwrites the stored job
    pub async fn save(&self, job: &Job) -> Result<()> {
        let raw = serde_json::to_vec(job)?;
        self.store.set(&job_key(&job.id), &raw).await
    }

    /// Read-modify-write of one job.
    ///
    /// Not atomic across processes: a concurrent writer of the same job wins
    /// or loses by timing.
    pub async fn update<F>(&self, id: &str, apply: F) -> Result<Job>
    where
        F: FnOnce(&mut Job) -> std::result::Result<(), TransitionError> + Send,
    {
        let mut job = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("job {}", id)))?;

        apply(&mut job)?;
        self.save(&job).await?;
        Ok(job)
    }

    /// Identifiers of every stored job, sorted
    pub async fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self
            .store
            .keys(JOB_PREFIX)
            .await?
            .into_iter()
            .filter_map(|key| key.strip_prefix(JOB_PREFIX).map(str::to_string))
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Every stored job, most recently submitted first
    pub async fn list_all(&self) -> Result<Vec<Job>> {
        let mut jobs = Vec::new();
        for id in self.list_ids().await? {
            if let Some(job) = self.find_by_id(&id).await? {
                jobs.push(job);
            }
        }
        jobs.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(jobs)
    }

    /// Counts by status; `stale_threshold` decides which submitted jobs are stale
    pub async fn stats(&self, stale_threshold: chrono::Duration) -> Result<JobStats> {
        let now = Utc::now();
        let mut stats = JobStats::default();

        for job in self.list_all().await? {
            match job.status {
                JobStatus::Submitted => stats.submitted += 1,
                JobStatus::InProgress => stats.in_progress += 1,
                JobStatus::Complete => stats.complete += 1,
                JobStatus::Failed => stats.failed += 1,
            }
            if job.is_stale_submitted(now, stale_threshold) {
                stats.stale_submitted += 1;
            }
        }

        Ok(stats)
    }
}
