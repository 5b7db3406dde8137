//! Job Dispatcher
//!
//! Validates submissions, persists the job and enqueues its identifier.
//! Also serves the read side of the job lifecycle for the HTTP layer.

use std::time::Duration;
use thiserror::Error;

use seismo_core::domain::job::{DEFAULT_JOB_TYPE, Job};
use seismo_core::domain::result::JobResult;
use seismo_core::dto::job::{JobStats, SubmitJob};
use seismo_store::{JobQueue, JobRepository, ResultRepository, StoreError, Stores};

#[derive(Debug, Error)]
pub enum JobError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct JobDispatcher {
    jobs: JobRepository,
    queue: JobQueue,
    results: ResultRepository,
    stale_threshold: Duration,
}

/// Treats blank strings as absent
fn required(value: Option<String>, field: &str) -> Result<String, JobError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| JobError::Validation(format!("'{}' is required", field)))
}

impl JobDispatcher {
    pub fn new(stores: &Stores, stale_threshold: Duration) -> Self {
        Self {
            jobs: JobRepository::new(stores.jobs.clone()),
            queue: JobQueue::new(stores.queue.clone()),
            results: ResultRepository::new(stores.results.clone()),
            stale_threshold,
        }
    }

    /// Creates a job in `submitted` and enqueues it.
    ///
    /// Validation happens before any write. The record write and the enqueue
    /// target different namespaces; a crash between them leaves a job that
    /// stays `submitted` and shows up in the stale count of [`Self::stats`].
    pub async fn submit(&self, req: SubmitJob) -> Result<Job, JobError> {
        let start = required(req.start, "start")?;
        let end = required(req.end, "end")?;
        let job_type = req
            .job_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_JOB_TYPE.to_string());

        let job = Job::new(start, end, job_type);
        self.jobs.create(&job).await?;
        self.queue.enqueue(&job.id).await?;

        tracing::info!("Job {} submitted ({}, {} to {})", job.id, job.job_type, job.start, job.end);

        Ok(job)
    }

    pub async fn get_job(&self, id: &str) -> Result<Job, JobError> {
        self.jobs
            .find_by_id(id)
            .await?
            .ok_or_else(|| JobError::NotFound(format!("Job {}", id)))
    }

    pub async fn get_result(&self, id: &str) -> Result<JobResult, JobError> {
        self.results
            .find(id)
            .await?
            .ok_or_else(|| JobError::NotFound(format!("Result for job {}", id)))
    }

    pub async fn list_ids(&self) -> Result<Vec<String>, JobError> {
        Ok(self.jobs.list_ids().await?)
    }

    pub async fn stats(&self) -> Result<JobStats, JobError> {
        let threshold = chrono::Duration::from_std(self.stale_threshold)
            .unwrap_or_else(|_| chrono::Duration::MAX);
        Ok(self.jobs.stats(threshold).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seismo_core::domain::job::JobStatus;

    fn dispatcher() -> (JobDispatcher, Stores) {
        let stores = Stores::in_memory();
        (JobDispatcher::new(&stores, Duration::from_secs(300)), stores)
    }

    #[tokio::test]
    async fn test_submit_creates_and_enqueues() {
        let (dispatcher, stores) = dispatcher();

        let job = dispatcher
            .submit(SubmitJob::new("2025-03-01", "2025-03-02"))
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Submitted);
        assert_eq!(job.job_type, DEFAULT_JOB_TYPE);

        let stored = dispatcher.get_job(&job.id).await.unwrap();
        assert_eq!(stored, job);

        let queue = JobQueue::new(stores.queue.clone());
        let queued = queue.dequeue(Duration::from_millis(10)).await.unwrap();
        assert_eq!(queued, Some(job.id));
    }

    #[tokio::test]
    async fn test_submit_keeps_unknown_type() {
        let (dispatcher, _) = dispatcher();
        let job = dispatcher
            .submit(SubmitJob::new("2025-03-01", "2025-03-02").with_type("volcano_chart"))
            .await
            .unwrap();
        assert_eq!(job.job_type, "volcano_chart");
    }

    #[tokio::test]
    async fn test_missing_bounds_write_nothing() {
        let (dispatcher, stores) = dispatcher();

        let req = SubmitJob {
            start: Some("2025-03-01".to_string()),
            end: Some("   ".to_string()),
            job_type: None,
        };
        let err = dispatcher.submit(req).await.unwrap_err();
        assert!(matches!(err, JobError::Validation(_)));

        let err = dispatcher.submit(SubmitJob::default()).await.unwrap_err();
        assert!(matches!(err, JobError::Validation(_)));

        assert!(dispatcher.list_ids().await.unwrap().is_empty());
        assert!(stores.queue.keys("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_identical_submissions_are_distinct_jobs() {
        let (dispatcher, _) = dispatcher();
        let a = dispatcher.submit(SubmitJob::new("2025-03-01", "2025-03-02")).await.unwrap();
        let b = dispatcher.submit(SubmitJob::new("2025-03-01", "2025-03-02")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(dispatcher.list_ids().await.unwrap().len(), 2);
        assert_eq!(dispatcher.stats().await.unwrap().submitted, 2);
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let (dispatcher, _) = dispatcher();
        assert!(matches!(
            dispatcher.get_job("no-such-job").await,
            Err(JobError::NotFound(_))
        ));
        assert!(matches!(
            dispatcher.get_result("no-such-job").await,
            Err(JobError::NotFound(_))
        ));
    }
}
