//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::result::ResultKind;

/// Job type used when a submission does not name one
pub const DEFAULT_JOB_TYPE: &str = "magnitude_distribution";

/// Asynchronous chart job
///
/// Structure shared between the API (creates and reads) and the worker (updates).
/// `job_type` keeps the raw submitted string: an unknown type is accepted at
/// submission and fails when the worker tries to resolve it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub start: String,
    pub end: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    /// Deadline of the current execution attempt, when the worker runs with a lease
    #[serde(default)]
    pub lease_expires_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Creates a freshly submitted job with a new identifier
    pub fn new(start: impl Into<String>, end: impl Into<String>, job_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            status: JobStatus::Submitted,
            start: start.into(),
            end: end.into(),
            job_type: job_type.into(),
            submitted_at: Utc::now(),
            started_at: None,
            finished_at: None,
            lease_expires_at: None,
        }
    }

    /// Starts a new execution attempt.
    ///
    /// Accepted from any state: re-running a job is a fresh attempt and resets
    /// the attempt timestamps.
    pub fn mark_in_progress(&mut self, lease: Option<chrono::Duration>) {
        let now = Utc::now();
        self.status = JobStatus::InProgress;
        self.started_at = Some(now);
        self.finished_at = None;
        self.lease_expires_at = lease.map(|lease| now + lease);
    }

    /// Marks the current attempt as complete
    pub fn mark_complete(&mut self) -> Result<(), TransitionError> {
        self.finish(JobStatus::Complete)
    }

    /// Marks the current attempt as failed
    pub fn mark_failed(&mut self) -> Result<(), TransitionError> {
        self.finish(JobStatus::Failed)
    }

    fn finish(&mut self, to: JobStatus) -> Result<(), TransitionError> {
        if self.status != JobStatus::InProgress {
            return Err(TransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.finished_at = Some(Utc::now());
        self.lease_expires_at = None;
        Ok(())
    }

    /// True when the job is still waiting in `submitted` longer than `threshold`.
    ///
    /// Such jobs usually lost their queue entry between the record write and
    /// the enqueue.
    pub fn is_stale_submitted(&self, now: DateTime<Utc>, threshold: chrono::Duration) -> bool {
        self.status == JobStatus::Submitted && now - self.submitted_at > threshold
    }
}

/// Job execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    #[serde(rename = "submitted")]
    Submitted,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "complete")]
    Complete,
    #[serde(rename = "failed")]
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Submitted => "submitted",
            JobStatus::InProgress => "in progress",
            JobStatus::Complete => "complete",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid job transition from '{from}' to '{to}'")]
pub struct TransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// Chart job types understood by the worker
///
/// Each type declares the result kind its handler must produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    MagnitudeDistribution,
    EarthquakeCountByCity,
}

impl JobType {
    pub const ALL: [JobType; 2] = [JobType::MagnitudeDistribution, JobType::EarthquakeCountByCity];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::MagnitudeDistribution => "magnitude_distribution",
            JobType::EarthquakeCountByCity => "earthquake_count_by_city",
        }
    }

    /// Result kind the handler for this type must return
    pub fn result_kind(&self) -> ResultKind {
        match self {
            JobType::MagnitudeDistribution => ResultKind::Image,
            JobType::EarthquakeCountByCity => ResultKind::Json,
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = UnknownJobType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobType::ALL
            .into_iter()
            .find(|job_type| job_type.as_str() == s)
            .ok_or_else(|| UnknownJobType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job type '{0}'")]
pub struct UnknownJobType(pub String);
