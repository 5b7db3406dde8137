//! API Module
//!
//! HTTP API layer of the earthquake service.
//! Each submodule handles endpoints for a specific domain.

pub mod data;
pub mod error;
pub mod health;
pub mod help;
pub mod job;
pub mod quake;
pub mod result;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use seismo_store::{RecordStore, Stores};

use crate::feed::FeedSource;
use crate::service::{
    data_service::IngestService, job_service::JobDispatcher, quake_service::QueryService,
};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: JobDispatcher,
    pub ingest: IngestService,
    pub queries: QueryService,
}

impl AppState {
    pub fn new(stores: &Stores, feed: Arc<dyn FeedSource>, stale_threshold: Duration) -> Self {
        let records = RecordStore::new(stores.records.clone());
        Self {
            dispatcher: JobDispatcher::new(stores, stale_threshold),
            ingest: IngestService::new(records.clone(), feed),
            queries: QueryService::new(records),
        }
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Service
        .route("/health", get(health::health_check))
        .route("/help", get(help::help))
        // Data endpoints
        .route("/data", post(data::load_data).delete(data::delete_data))
        // Quake endpoints
        .route("/quakes", get(quake::list_quakes))
        .route("/quakes/range", get(quake::quakes_in_range))
        .route("/quakes/magnitude", get(quake::quakes_by_magnitude))
        .route("/quakes/depth", get(quake::quakes_by_depth))
        .route("/quakes/nearby", get(quake::quakes_nearby))
        .route("/quakes/stats", get(quake::quake_stats))
        .route("/quakes/{id}", get(quake::get_quake))
        // Job endpoints
        .route("/jobs", post(job::submit_job).get(job::list_jobs))
        .route("/jobs/stats", get(job::job_stats))
        .route("/jobs/{id}", get(job::get_job))
        .route("/results/{id}", get(result::get_result))
        // Add state and middleware
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::StaticFeed;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use seismo_core::domain::job::{Job, JobStatus};
    use seismo_core::domain::result::{JobResult, PNG_SIGNATURE};
    use seismo_store::ResultRepository;
    use serde_json::{Value as JsonValue, json};
    use tower::ServiceExt;

    fn features() -> Vec<JsonValue> {
        vec![
            json!({
                "id": "ak1",
                "properties": {
                    "mag": 1.7, "time": 1_740_830_400_000_i64, "magType": "ml",
                    "place": "10 km N of Anchorage, Alaska"
                },
                "geometry": { "coordinates": [-149.9, 61.3, 20.0] }
            }),
            json!({
                "id": "hv1",
                "properties": {
                    "mag": 3.1, "time": 1_740_916_800_000_i64, "magType": "md",
                    "place": "5 km SW of Volcano, Hawaii"
                },
                "geometry": { "coordinates": [-155.3, 19.4, 2.0] }
            }),
        ]
    }

    fn app() -> (Router, Stores) {
        let stores = Stores::in_memory();
        let state = AppState::new(
            &stores,
            Arc::new(StaticFeed::new(features())),
            Duration::from_secs(300),
        );
        (create_router(state), stores)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<JsonValue>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn json_body(bytes: &[u8]) -> JsonValue {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_and_help() {
        let (app, _) = app();

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");

        let (status, body) = send(&app, "GET", "/help", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("Submit a new job"));
    }

    #[tokio::test]
    async fn test_load_query_and_delete_data() {
        let (app, _) = app();

        let (status, _) = send(&app, "GET", "/quakes", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, "POST", "/data", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json_body(&body)["message"],
            "Data loaded successfully: 2 items stored."
        );

        let (_, body) = send(&app, "GET", "/quakes", None).await;
        assert_eq!(json_body(&body), json!(["ak1", "hv1"]));

        let (status, body) = send(&app, "GET", "/quakes/hv1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["properties"]["magType"], "md");

        let (status, _) = send(&app, "GET", "/quakes/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(&app, "GET", "/quakes/range?start=2025-03-02&end=2025-03-02", None).await;
        assert_eq!(json_body(&body).as_array().unwrap().len(), 1);

        let (_, body) = send(&app, "GET", "/quakes/magnitude?min=3", None).await;
        assert_eq!(json_body(&body)[0]["id"], "hv1");

        let (_, body) = send(&app, "GET", "/quakes/depth?max=10", None).await;
        assert_eq!(json_body(&body)[0]["id"], "hv1");

        let (_, body) = send(&app, "GET", "/quakes/nearby?lon=-149.9&lat=61.2&radius_km=100", None).await;
        assert_eq!(json_body(&body)[0]["id"], "ak1");

        let (_, body) = send(&app, "GET", "/quakes/stats?start=2025-03-01&end=2025-03-31", None).await;
        let stats = json_body(&body);
        assert_eq!(stats["max_magnitude"], 3.1);
        assert_eq!(stats["magtype_counts"]["ml"], 1);

        let (status, body) = send(&app, "DELETE", "/data", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["message"], "8 keys deleted successfully.");
    }

    #[tokio::test]
    async fn test_invalid_query_is_bad_request() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/quakes/range?start=2025-03-05&end=2025-03-01", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json_body(&body)["error"].is_string());
    }

    #[tokio::test]
    async fn test_submit_and_poll_job() {
        let (app, _) = app();

        let (status, body) = send(
            &app,
            "POST",
            "/jobs",
            Some(json!({"start_date": "2025-03-01", "end_date": "2025-03-02"})),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let job: Job = serde_json::from_slice(&body).unwrap();
        assert_eq!(job.status, JobStatus::Submitted);
        assert_eq!(job.job_type, "magnitude_distribution");

        let (status, body) = send(&app, "GET", &format!("/jobs/{}", job.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["status"], "submitted");

        let (_, body) = send(&app, "GET", "/jobs", None).await;
        assert_eq!(json_body(&body), json!([job.id]));

        let (_, body) = send(&app, "GET", "/jobs/stats", None).await;
        assert_eq!(json_body(&body)["submitted"], 1);
        assert_eq!(json_body(&body)["stale_submitted"], 0);

        // Not processed yet
        let (status, _) = send(&app, "GET", &format!("/results/{}", job.id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_submit_without_bounds_is_rejected() {
        let (app, stores) = app();

        let (status, body) = send(&app, "POST", "/jobs", Some(json!({"start": "2025-03-01"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json_body(&body)["error"].as_str().unwrap().contains("end"));

        assert!(stores.jobs.keys("").await.unwrap().is_empty());
        assert!(stores.queue.keys("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let (app, _) = app();
        let (status, _) = send(&app, "GET", "/jobs/00000000-0000-0000-0000-000000000000", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_results_carry_their_content_type() {
        let (app, stores) = app();
        let results = ResultRepository::new(stores.results.clone());

        let png = PNG_SIGNATURE.to_vec();
        results.create("img", &JobResult::Image(png.clone())).await.unwrap();
        results
            .create("doc", &JobResult::from_json(&json!({"Volcano, Hawaii": 1})).unwrap())
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(Request::get("/results/img").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes.to_vec(), png);

        let response = app
            .clone()
            .oneshot(Request::get("/results/doc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(json_body(&bytes), json!({"Volcano, Hawaii": 1}));
    }
}
