//! Worker loop
//!
//! Pops job identifiers off the queue and runs each job to a terminal state.
//! One job at a time; throughput scales by running more worker processes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use seismo_core::domain::job::{Job, JobType, UnknownJobType};
use seismo_store::{JobQueue, JobRepository, ResultRepository, StoreError, Stores};

use crate::config::Config;
use crate::handlers::{HandlerError, HandlerRegistry, into_result};

/// Reasons a job attempt fails
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    UnknownType(#[from] UnknownJobType),

    #[error("no handler registered for '{0}'")]
    NoHandler(JobType),

    #[error("job has no {0} bound")]
    MissingBound(&'static str),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error("handler aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),

    #[error("result write failed: {0}")]
    Store(#[from] StoreError),
}

/// What happened to one dequeued identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Complete,
    Failed,
    /// The job could not be started: no record, or the store refused the write
    Skipped,
}

pub struct Worker {
    worker_id: String,
    jobs: JobRepository,
    queue: JobQueue,
    results: ResultRepository,
    registry: Arc<HandlerRegistry>,
    dequeue_timeout: Duration,
    error_backoff: Duration,
    lease: Option<chrono::Duration>,
}

impl Worker {
    pub fn new(config: &Config, stores: &Stores, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            worker_id: config.worker_id.clone(),
            jobs: JobRepository::new(stores.jobs.clone()),
            queue: JobQueue::new(stores.queue.clone()),
            results: ResultRepository::new(stores.results.clone()),
            registry,
            dequeue_timeout: config.dequeue_timeout,
            error_backoff: config.error_backoff,
            lease: config.lease_duration(),
        }
    }

    /// Runs until `shutdown` resolves.
    ///
    /// Shutdown interrupts a wait on the queue but never a job in progress.
    /// With Redis, an id popped by the server whose reply is still in flight
    /// when shutdown fires is lost; that job stays `submitted` and shows up in
    /// the stale count of the job stats.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            "Worker {} started (job types: {:?})",
            self.worker_id,
            self.registry.job_types()
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Worker {} shutting down", self.worker_id);
                    break;
                }
                popped = self.queue.dequeue(self.dequeue_timeout) => match popped {
                    Ok(Some(job_id)) => {
                        self.process(&job_id).await;
                    }
                    Ok(None) => debug!("Queue empty"),
                    Err(e) => {
                        error!("Failed to dequeue: {}", e);
                        tokio::time::sleep(self.error_backoff).await;
                    }
                },
            }
        }
    }

    /// Waits for one queue entry and processes it
    pub async fn run_once(&self) -> Result<Option<Outcome>, StoreError> {
        match self.queue.dequeue(self.dequeue_timeout).await? {
            Some(job_id) => Ok(Some(self.process(&job_id).await)),
            None => Ok(None),
        }
    }

    /// Drives one job through `in progress` to `complete` or `failed`
    pub async fn process(&self, job_id: &str) -> Outcome {
        let lease = self.lease;
        let job = match self
            .jobs
            .update(job_id, move |job| {
                job.mark_in_progress(lease);
                Ok(())
            })
            .await
        {
            Ok(job) => job,
            Err(e) if e.is_not_found() => {
                error!("Dequeued job {} has no record", job_id);
                return Outcome::Skipped;
            }
            Err(e) => {
                error!("Failed to start job {}: {}", job_id, e);
                return Outcome::Skipped;
            }
        };

        info!("Worker {} processing job {} ({})", self.worker_id, job.id, job.job_type);

        match self.execute(&job).await {
            Ok(()) => match self.jobs.update(job_id, Job::mark_complete).await {
                Ok(_) => {
                    info!("Job {} complete", job_id);
                    Outcome::Complete
                }
                Err(e) => {
                    error!("Job {} produced a result but could not be marked complete: {}", job_id, e);
                    Outcome::Failed
                }
            },
            Err(e) => {
                match &e {
                    ExecutionError::Handler(HandlerError::Validation(_)) => {
                        warn!("Job {} failed: {}", job_id, e)
                    }
                    _ => error!("Job {} failed: {}", job_id, e),
                }
                if let Err(e) = self.jobs.update(job_id, Job::mark_failed).await {
                    error!("Failed to mark job {} failed: {}", job_id, e);
                }
                Outcome::Failed
            }
        }
    }

    /// Resolves the handler, runs it and stores the checked result
    async fn execute(&self, job: &Job) -> Result<(), ExecutionError> {
        let job_type: JobType = job.job_type.parse()?;
        let handler = self
            .registry
            .get(job_type)
            .ok_or(ExecutionError::NoHandler(job_type))?;

        if job.start.trim().is_empty() {
            return Err(ExecutionError::MissingBound("start"));
        }
        if job.end.trim().is_empty() {
            return Err(ExecutionError::MissingBound("end"));
        }

        // Own task, so a panicking handler fails only this job
        let (start, end) = (job.start.clone(), job.end.clone());
        let output = tokio::spawn(async move { handler.run(&start, &end).await }).await??;
        let result = into_result(job_type, output)?;

        self.results.create(&job.id, &result).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{ChartHandler, HandlerOutput};
    use async_trait::async_trait;
    use seismo_api::service::job_service::{JobDispatcher, JobError};
    use seismo_core::domain::job::JobStatus;
    use seismo_core::domain::quake::Earthquake;
    use seismo_core::domain::result::{PNG_SIGNATURE, ResultKind};
    use seismo_core::dto::job::SubmitJob;
    use seismo_store::RecordStore;
    use serde_json::json;
    use std::sync::Mutex;

    struct Harness {
        stores: Stores,
        dispatcher: JobDispatcher,
        worker: Worker,
    }

    fn config() -> Config {
        let mut config = Config::new("test-worker".to_string(), seismo_store::StoreConfig::memory());
        config.dequeue_timeout = Duration::from_millis(20);
        config.error_backoff = Duration::from_millis(10);
        config
    }

    async fn seed(records: &RecordStore) {
        let features = [
            json!({
                "id": "hv1",
                "properties": {
                    "mag": 2.4, "time": 1_740_830_400_000_i64, "magType": "md",
                    "place": "5 km SW of Volcano, Hawaii"
                },
                "geometry": { "coordinates": [-155.3, 19.4, 2.0] }
            }),
            json!({
                "id": "hv2",
                "properties": {
                    "mag": 1.1, "time": 1_740_916_800_000_i64, "magType": "md",
                    "place": "2 km E of Volcano, Hawaii"
                },
                "geometry": { "coordinates": [-155.2, 19.4, 1.0] }
            }),
            json!({
                "id": "ak1",
                "properties": {
                    "mag": 3.6, "time": 1_740_916_900_000_i64, "magType": "ml",
                    "place": "Southern Alaska"
                },
                "geometry": { "coordinates": [-150.0, 60.0, 40.0] }
            }),
        ];
        for feature in &features {
            let quake = Earthquake::from_feature(feature).unwrap();
            records.insert(&quake, feature).await.unwrap();
        }
    }

    async fn harness_with(registry: impl FnOnce(RecordStore) -> HandlerRegistry) -> Harness {
        let stores = Stores::in_memory();
        let records = RecordStore::new(stores.records.clone());
        seed(&records).await;

        let registry = Arc::new(registry(records));
        Harness {
            dispatcher: JobDispatcher::new(&stores, Duration::from_secs(300)),
            worker: Worker::new(&config(), &stores, registry),
            stores,
        }
    }

    async fn harness() -> Harness {
        harness_with(HandlerRegistry::standard).await
    }

    fn submit(job_type: &str) -> SubmitJob {
        SubmitJob::new("2025-03-01", "2025-03-02").with_type(job_type)
    }

    #[tokio::test]
    async fn test_magnitude_distribution_job_completes_with_image() {
        let h = harness().await;

        let job = h.dispatcher.submit(submit("magnitude_distribution")).await.unwrap();
        assert_eq!(job.status, JobStatus::Submitted);

        assert_eq!(h.worker.run_once().await.unwrap(), Some(Outcome::Complete));

        let job = h.dispatcher.get_job(&job.id).await.unwrap();
        assert_eq!(job.status, JobStatus::Complete);
        assert!(job.started_at.is_some());
        assert!(job.finished_at.is_some());

        let result = h.dispatcher.get_result(&job.id).await.unwrap();
        assert_eq!(result.kind(), ResultKind::Image);
        assert!(result.as_image().unwrap().starts_with(&PNG_SIGNATURE));
    }

    #[tokio::test]
    async fn test_city_count_job_completes_with_json() {
        let h = harness().await;

        let job = h.dispatcher.submit(submit("earthquake_count_by_city")).await.unwrap();
        assert_eq!(h.worker.run_once().await.unwrap(), Some(Outcome::Complete));

        let result = h.dispatcher.get_result(&job.id).await.unwrap();
        assert_eq!(
            result.as_json().unwrap(),
            json!({"Volcano, Hawaii": 2, "Southern Alaska": 1})
        );
        assert!(result.as_image().is_err());
    }

    #[tokio::test]
    async fn test_unknown_type_fails_without_result() {
        let h = harness().await;

        let job = h.dispatcher.submit(submit("nonexistent_type")).await.unwrap();
        assert_eq!(h.worker.run_once().await.unwrap(), Some(Outcome::Failed));

        assert_eq!(h.dispatcher.get_job(&job.id).await.unwrap().status, JobStatus::Failed);
        assert!(matches!(
            h.dispatcher.get_result(&job.id).await,
            Err(JobError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_start_is_rejected_before_any_write() {
        let h = harness().await;

        let req = SubmitJob {
            start: None,
            end: Some("2025-03-02".to_string()),
            job_type: None,
        };
        assert!(matches!(h.dispatcher.submit(req).await, Err(JobError::Validation(_))));
        assert!(h.dispatcher.list_ids().await.unwrap().is_empty());
        assert_eq!(h.worker.run_once().await.unwrap(), None);

        assert!(matches!(
            h.dispatcher.get_job("3f1c1f9e-0000-4000-8000-000000000000").await,
            Err(JobError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_identical_submissions_are_processed_independently() {
        let h = harness().await;

        let a = h.dispatcher.submit(submit("earthquake_count_by_city")).await.unwrap();
        let b = h.dispatcher.submit(submit("earthquake_count_by_city")).await.unwrap();
        assert_ne!(a.id, b.id);

        assert_eq!(h.worker.run_once().await.unwrap(), Some(Outcome::Complete));
        assert_eq!(h.worker.run_once().await.unwrap(), Some(Outcome::Complete));

        for id in [&a.id, &b.id] {
            assert_eq!(h.dispatcher.get_job(id).await.unwrap().status, JobStatus::Complete);
            assert!(h.dispatcher.get_result(id).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_empty_range_yields_empty_outputs() {
        let h = harness().await;
        let empty = |job_type: &str| SubmitJob::new("2024-01-01", "2024-01-31").with_type(job_type);

        let counts = h.dispatcher.submit(empty("earthquake_count_by_city")).await.unwrap();
        let chart = h.dispatcher.submit(empty("magnitude_distribution")).await.unwrap();
        h.worker.run_once().await.unwrap();
        h.worker.run_once().await.unwrap();

        let counts = h.dispatcher.get_result(&counts.id).await.unwrap();
        assert_eq!(counts.as_json().unwrap(), json!({}));

        let chart = h.dispatcher.get_result(&chart.id).await.unwrap();
        assert!(chart.as_image().unwrap().len() > PNG_SIGNATURE.len());
    }

    #[tokio::test]
    async fn test_invalid_dates_fail_the_job() {
        let h = harness().await;
        let job = h
            .dispatcher
            .submit(SubmitJob::new("not-a-date", "2025-03-02"))
            .await
            .unwrap();

        assert_eq!(h.worker.run_once().await.unwrap(), Some(Outcome::Failed));
        assert_eq!(h.dispatcher.get_job(&job.id).await.unwrap().status, JobStatus::Failed);
    }

    /// Records status and lease of every stored job while it runs
    struct ObservingHandler {
        jobs: JobRepository,
        seen: Mutex<Vec<(JobStatus, bool)>>,
    }

    impl ObservingHandler {
        fn new(stores: &Stores) -> Arc<Self> {
            Arc::new(Self {
                jobs: JobRepository::new(stores.jobs.clone()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChartHandler for ObservingHandler {
        async fn run(&self, _start: &str, _end: &str) -> Result<HandlerOutput, HandlerError> {
            let jobs = self.jobs.list_all().await?;
            self.seen.lock().unwrap().extend(
                jobs.into_iter()
                    .map(|job| (job.status, job.lease_expires_at.is_some())),
            );
            Ok(HandlerOutput::Json(json!({"ok": 1})))
        }
    }

    #[tokio::test]
    async fn test_job_is_in_progress_while_handler_runs() {
        let stores = Stores::in_memory();
        let handler = ObservingHandler::new(&stores);
        let registry = HandlerRegistry::new().with(JobType::EarthquakeCountByCity, handler.clone());

        let dispatcher = JobDispatcher::new(&stores, Duration::from_secs(300));
        let worker = Worker::new(&config(), &stores, Arc::new(registry));

        let job = dispatcher.submit(submit("earthquake_count_by_city")).await.unwrap();
        assert_eq!(dispatcher.get_job(&job.id).await.unwrap().status, JobStatus::Submitted);

        worker.run_once().await.unwrap();

        assert_eq!(*handler.seen.lock().unwrap(), vec![(JobStatus::InProgress, false)]);
        assert_eq!(dispatcher.get_job(&job.id).await.unwrap().status, JobStatus::Complete);
    }

    struct ShapeBreakingHandler;

    #[async_trait]
    impl ChartHandler for ShapeBreakingHandler {
        async fn run(&self, _start: &str, _end: &str) -> Result<HandlerOutput, HandlerError> {
            Ok(HandlerOutput::Json(json!(["not", "a", "mapping"])))
        }
    }

    #[tokio::test]
    async fn test_contract_violation_fails_without_result() {
        let h = harness_with(|_| {
            HandlerRegistry::new().with(JobType::EarthquakeCountByCity, Arc::new(ShapeBreakingHandler))
        })
        .await;

        let job = h.dispatcher.submit(submit("earthquake_count_by_city")).await.unwrap();
        assert_eq!(h.worker.run_once().await.unwrap(), Some(Outcome::Failed));
        assert!(h.dispatcher.get_result(&job.id).await.is_err());
    }

    struct PanickingHandler;

    #[async_trait]
    impl ChartHandler for PanickingHandler {
        async fn run(&self, _start: &str, _end: &str) -> Result<HandlerOutput, HandlerError> {
            panic!("chart blew up");
        }
    }

    #[tokio::test]
    async fn test_panicking_handler_fails_only_its_job() {
        let h = harness_with(|records| {
            HandlerRegistry::standard(records)
                .with(JobType::MagnitudeDistribution, Arc::new(PanickingHandler))
        })
        .await;

        let broken = h.dispatcher.submit(submit("magnitude_distribution")).await.unwrap();
        let next = h.dispatcher.submit(submit("earthquake_count_by_city")).await.unwrap();

        assert_eq!(h.worker.run_once().await.unwrap(), Some(Outcome::Failed));
        assert_eq!(h.worker.run_once().await.unwrap(), Some(Outcome::Complete));

        assert_eq!(h.dispatcher.get_job(&broken.id).await.unwrap().status, JobStatus::Failed);
        assert!(h.dispatcher.get_result(&broken.id).await.is_err());
        assert_eq!(h.dispatcher.get_job(&next.id).await.unwrap().status, JobStatus::Complete);
    }

    #[tokio::test]
    async fn test_extreme_stored_magnitudes_do_not_stop_the_loop() {
        let h = harness().await;
        // Written straight to the store, bypassing feed ingestion
        let records = RecordStore::new(h.stores.records.clone());
        for (id, mag) in [("huge", 1e12), ("low", -1e300), ("high", 1e300)] {
            let feature = json!({
                "id": id,
                "properties": { "mag": mag, "time": 1_740_830_400_000_i64 },
                "geometry": { "coordinates": [0.0, 0.0, 1.0] }
            });
            let quake = Earthquake {
                id: id.to_string(),
                mag,
                depth: 1.0,
                time: 1_740_830_400_000,
                longitude: 0.0,
                latitude: 0.0,
                mag_type: None,
                place: None,
            };
            records.insert(&quake, &feature).await.unwrap();
        }

        let chart = h.dispatcher.submit(submit("magnitude_distribution")).await.unwrap();
        let next = h.dispatcher.submit(submit("earthquake_count_by_city")).await.unwrap();

        assert_eq!(h.worker.run_once().await.unwrap(), Some(Outcome::Complete));
        assert_eq!(h.worker.run_once().await.unwrap(), Some(Outcome::Complete));

        let png = h.dispatcher.get_result(&chart.id).await.unwrap();
        assert!(png.as_image().unwrap().starts_with(&PNG_SIGNATURE));
        assert_eq!(
            h.dispatcher.get_result(&next.id).await.unwrap().as_json().unwrap(),
            json!({"Volcano, Hawaii": 2, "Southern Alaska": 1})
        );
    }

    #[tokio::test]
    async fn test_unregistered_type_fails() {
        let h = harness_with(|_| HandlerRegistry::new()).await;
        let job = h.dispatcher.submit(submit("magnitude_distribution")).await.unwrap();

        assert_eq!(h.worker.run_once().await.unwrap(), Some(Outcome::Failed));
        assert_eq!(h.dispatcher.get_job(&job.id).await.unwrap().status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_rerun_keeps_first_result() {
        let h = harness().await;
        let job = h.dispatcher.submit(submit("earthquake_count_by_city")).await.unwrap();
        h.worker.run_once().await.unwrap();
        let first = h.dispatcher.get_result(&job.id).await.unwrap();

        // Re-enqueue by hand: a fresh attempt that cannot overwrite the result
        JobQueue::new(h.stores.queue.clone()).enqueue(&job.id).await.unwrap();
        assert_eq!(h.worker.run_once().await.unwrap(), Some(Outcome::Failed));

        assert_eq!(h.dispatcher.get_result(&job.id).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_orphan_queue_entry_is_skipped() {
        let h = harness().await;
        JobQueue::new(h.stores.queue.clone()).enqueue("ghost").await.unwrap();

        assert_eq!(h.worker.run_once().await.unwrap(), Some(Outcome::Skipped));
        assert!(h.dispatcher.list_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lease_is_recorded_and_cleared() {
        let stores = Stores::in_memory();
        let mut config = config();
        config.lease = Some(Duration::from_secs(60));

        let handler = ObservingHandler::new(&stores);
        let registry = HandlerRegistry::new().with(JobType::EarthquakeCountByCity, handler.clone());
        let dispatcher = JobDispatcher::new(&stores, Duration::from_secs(300));
        let worker = Worker::new(&config, &stores, Arc::new(registry));

        let job = dispatcher.submit(submit("earthquake_count_by_city")).await.unwrap();
        assert_eq!(worker.run_once().await.unwrap(), Some(Outcome::Complete));

        assert_eq!(*handler.seen.lock().unwrap(), vec![(JobStatus::InProgress, true)]);
        let done = dispatcher.get_job(&job.id).await.unwrap();
        assert!(done.lease_expires_at.is_none());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let h = harness().await;
        let job = h.dispatcher.submit(submit("earthquake_count_by_city")).await.unwrap();

        let worker = Arc::new(h.worker);
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = {
            let worker = Arc::clone(&worker);
            tokio::spawn(async move {
                worker
                    .run(async {
                        let _ = rx.await;
                    })
                    .await
            })
        };

        // Wait for the queued job to be picked up
        for _ in 0..100 {
            if h.dispatcher.get_job(&job.id).await.unwrap().status == JobStatus::Complete {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(h.dispatcher.get_job(&job.id).await.unwrap().status, JobStatus::Complete);

        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker should stop")
            .unwrap();
    }
}
