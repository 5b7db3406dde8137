//! Result Repository
//!
//! One typed result per job under `result:{id}`, in a namespace separate from
//! job metadata. Results are written once and never overwritten.

use std::sync::Arc;
use tracing::debug;

use seismo_core::domain::result::JobResult;

use crate::backend::Store;
use crate::error::{Result, StoreError};

fn result_key(job_id: &str) -> String {
    format!("result:{}", job_id)
}

#[derive(Clone)]
pub struct ResultRepository {
    store: Arc<dyn Store>,
}

impl ResultRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Stores the result of a job; fails if one already exists
    pub async fn create(&self, job_id: &str, result: &JobResult) -> Result<()> {
        let written = self
            .store
            .set_if_absent(&result_key(job_id), &result.encode())
            .await?;

        if !written {
            return Err(StoreError::AlreadyExists(format!("result for job {}", job_id)));
        }

        debug!(
            "Stored {} result for job {} ({} bytes)",
            result.kind(),
            job_id,
            result.payload().len()
        );
        Ok(())
    }

    pub async fn find(&self, job_id: &str) -> Result<Option<JobResult>> {
        match self.store.get(&result_key(job_id)).await? {
            Some(raw) => Ok(Some(JobResult::decode(&raw)?)),
            None => Ok(None),
        }
    }
}
