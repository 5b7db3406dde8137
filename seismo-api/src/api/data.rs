//! Data API Handlers
//!
//! Loading and clearing the earthquake dataset.

use axum::{Json, extract::State};
use seismo_core::dto::MessageResponse;

use crate::api::AppState;
use crate::api::error::ApiResult;

/// POST /data
/// Fetch the upstream feed and index it
pub async fn load_data(State(state): State<AppState>) -> ApiResult<Json<MessageResponse>> {
    let loaded = state.ingest.load().await?;

    Ok(Json(MessageResponse::new(format!(
        "Data loaded successfully: {} items stored.",
        loaded
    ))))
}

/// DELETE /data
/// Delete every record and index key
pub async fn delete_data(State(state): State<AppState>) -> ApiResult<Json<MessageResponse>> {
    let deleted = state.ingest.clear().await?;

    Ok(Json(MessageResponse::new(format!(
        "{} keys deleted successfully.",
        deleted
    ))))
}
