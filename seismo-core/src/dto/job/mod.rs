//! Job DTOs

use serde::{Deserialize, Serialize};

/// Request to submit a new chart job
///
/// Bounds are optional at the wire level so that a missing field becomes a
/// validation error from the dispatcher rather than a body parsing failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitJob {
    #[serde(default, alias = "start_date")]
    pub start: Option<String>,
    #[serde(default, alias = "end_date")]
    pub end: Option<String>,
    #[serde(default, rename = "type", alias = "job_type")]
    pub job_type: Option<String>,
}

impl SubmitJob {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
            job_type: None,
        }
    }

    pub fn with_type(mut self, job_type: impl Into<String>) -> Self {
        self.job_type = Some(job_type.into());
        self
    }
}

/// Job counts by status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStats {
    pub submitted: usize,
    pub in_progress: usize,
    pub complete: usize,
    pub failed: usize,
    /// Jobs still `submitted` after the staleness threshold
    pub stale_submitted: usize,
}
