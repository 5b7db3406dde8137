//! Quake API Handlers
//!
//! Read-only endpoints over the indexed records.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::Value as JsonValue;

use seismo_core::domain::quake::QuakeStats;
use seismo_core::dto::quake::{DateRangeQuery, NearbyQuery, ScoreRangeQuery};

use crate::api::AppState;
use crate::api::error::ApiResult;

/// GET /quakes
pub async fn list_quakes(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.queries.all_ids().await?))
}

/// GET /quakes/{id}
pub async fn get_quake(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JsonValue>> {
    tracing::debug!("Getting earthquake: {}", id);
    Ok(Json(state.queries.get(&id).await?))
}

/// GET /quakes/range?start=&end=
pub async fn quakes_in_range(
    State(state): State<AppState>,
    Query(params): Query<DateRangeQuery>,
) -> ApiResult<Json<Vec<JsonValue>>> {
    Ok(Json(state.queries.in_range(&params.start, &params.end).await?))
}

/// GET /quakes/magnitude?min=&max=
pub async fn quakes_by_magnitude(
    State(state): State<AppState>,
    Query(params): Query<ScoreRangeQuery>,
) -> ApiResult<Json<Vec<JsonValue>>> {
    let (min, max) = params.bounds();
    Ok(Json(state.queries.by_magnitude(min, max).await?))
}

/// GET /quakes/depth?min=&max=
pub async fn quakes_by_depth(
    State(state): State<AppState>,
    Query(params): Query<ScoreRangeQuery>,
) -> ApiResult<Json<Vec<JsonValue>>> {
    let (min, max) = params.bounds();
    Ok(Json(state.queries.by_depth(min, max).await?))
}

/// GET /quakes/nearby?lon=&lat=&radius_km=
pub async fn quakes_nearby(
    State(state): State<AppState>,
    Query(params): Query<NearbyQuery>,
) -> ApiResult<Json<Vec<JsonValue>>> {
    Ok(Json(
        state
            .queries
            .nearby(params.lon, params.lat, params.radius_km)
            .await?,
    ))
}

/// GET /quakes/stats?start=&end=
pub async fn quake_stats(
    State(state): State<AppState>,
    Query(params): Query<DateRangeQuery>,
) -> ApiResult<Json<QuakeStats>> {
    Ok(Json(state.queries.stats(&params.start, &params.end).await?))
}
