//! Chart handlers
//!
//! A handler turns a date range into a chart. The registry is an explicit
//! table built once at startup and handed to the worker; tests build their
//! own with doubles.

mod city;
mod magnitude;

pub use city::CityCountHandler;
pub use magnitude::MagnitudeDistributionHandler;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use seismo_core::domain::job::JobType;
use seismo_core::domain::range::DateRangeError;
use seismo_core::domain::result::{JobResult, ResultKind, is_png};
use seismo_store::{RecordStore, StoreError};

use crate::render::RenderError;

/// Raw handler output, before the shape check
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutput {
    Json(JsonValue),
    Image(Vec<u8>),
}

#[derive(Debug, Error)]
pub enum HandlerError {
    /// Bad job parameters
    #[error("validation error: {0}")]
    Validation(String),

    /// Output does not have the shape the job type promises
    #[error("handler contract violation: {0}")]
    ContractViolation(String),

    /// Stored records cannot be charted
    #[error("cannot chart records: {0}")]
    Unplottable(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DateRangeError> for HandlerError {
    fn from(err: DateRangeError) -> Self {
        HandlerError::Validation(err.to_string())
    }
}

#[async_trait]
pub trait ChartHandler: Send + Sync {
    async fn run(&self, start: &str, end: &str) -> Result<HandlerOutput, HandlerError>;
}

/// Checks an output against the result kind of its job type and tags it.
///
/// JSON must be an object; images must be non-empty PNG data.
pub fn into_result(job_type: JobType, output: HandlerOutput) -> Result<JobResult, HandlerError> {
    let expected = job_type.result_kind();

    match (expected, output) {
        (ResultKind::Json, HandlerOutput::Json(value)) => {
            if !value.is_object() {
                return Err(HandlerError::ContractViolation(format!(
                    "{} returned a JSON value that is not an object",
                    job_type
                )));
            }
            JobResult::from_json(&value)
                .map_err(|e| HandlerError::ContractViolation(e.to_string()))
        }
        (ResultKind::Image, HandlerOutput::Image(bytes)) => {
            if !is_png(&bytes) {
                return Err(HandlerError::ContractViolation(format!(
                    "{} returned {} bytes of non-PNG data",
                    job_type,
                    bytes.len()
                )));
            }
            Ok(JobResult::Image(bytes))
        }
        (expected, _) => Err(HandlerError::ContractViolation(format!(
            "{} must produce a {} result",
            job_type, expected
        ))),
    }
}

/// Job type to handler table
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<JobType, Arc<dyn ChartHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the production handler for every job type
    pub fn standard(records: RecordStore) -> Self {
        Self::new()
            .with(
                JobType::MagnitudeDistribution,
                Arc::new(MagnitudeDistributionHandler::new(records.clone())),
            )
            .with(
                JobType::EarthquakeCountByCity,
                Arc::new(CityCountHandler::new(records)),
            )
    }

    pub fn with(mut self, job_type: JobType, handler: Arc<dyn ChartHandler>) -> Self {
        self.handlers.insert(job_type, handler);
        self
    }

    pub fn get(&self, job_type: JobType) -> Option<Arc<dyn ChartHandler>> {
        self.handlers.get(&job_type).cloned()
    }

    pub fn job_types(&self) -> Vec<JobType> {
        JobType::ALL
            .into_iter()
            .filter(|job_type| self.handlers.contains_key(job_type))
            .collect()
    }
}
