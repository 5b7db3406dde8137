//! Job API Handlers
//!
//! HTTP endpoints for job submission and status polling.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use seismo_core::domain::job::Job;
use seismo_core::dto::job::{JobStats, SubmitJob};

use crate::api::AppState;
use crate::api::error::ApiResult;

/// POST /jobs
/// Submit a new chart job; processing happens asynchronously
pub async fn submit_job(
    State(state): State<AppState>,
    Json(req): Json<SubmitJob>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    let job = state.dispatcher.submit(req).await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

/// GET /jobs
/// List all job IDs
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.dispatcher.list_ids().await?))
}

/// GET /jobs/stats
/// Job counts by status, including stale submissions
pub async fn job_stats(State(state): State<AppState>) -> ApiResult<Json<JobStats>> {
    Ok(Json(state.dispatcher.stats().await?))
}

/// GET /jobs/{id}
pub async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Job>> {
    tracing::debug!("Getting job: {}", id);
    Ok(Json(state.dispatcher.get_job(&id).await?))
}
