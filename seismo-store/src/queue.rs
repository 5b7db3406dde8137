//! Job Queue
//!
//! FIFO list of job identifiers in the queue namespace. Producers append to
//! the tail; consumers block on the head. A popped entry is gone: delivery is
//! at most once.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::Store;
use crate::error::Result;

pub const QUEUE_KEY: &str = "seismo:queue";

#[derive(Clone)]
pub struct JobQueue {
    store: Arc<dyn Store>,
}

impl JobQueue {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn enqueue(&self, job_id: &str) -> Result<()> {
        self.store.push_back(QUEUE_KEY, job_id).await
    }

    /// Waits up to `timeout` for the next identifier; zero waits indefinitely
    pub async fn dequeue(&self, timeout: Duration) -> Result<Option<String>> {
        self.store.pop_front_blocking(QUEUE_KEY, timeout).await
    }
}
