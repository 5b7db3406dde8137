//! Result API Handler
//!
//! Serves a job result with the content type of its discriminant.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::api::AppState;
use crate::api::error::ApiResult;

/// GET /results/{id}
pub async fn get_result(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let result = state.dispatcher.get_result(&id).await?;
    let content_type = result.kind().content_type();

    Ok(([(header::CONTENT_TYPE, content_type)], result.into_payload()).into_response())
}
