//! Earthquake query endpoints

use serde_json::Value as JsonValue;

use crate::SeismoClient;
use crate::error::Result;
use seismo_core::domain::quake::QuakeStats;
use seismo_core::dto::quake::{DateRangeQuery, NearbyQuery, ScoreRangeQuery};

impl SeismoClient {
    /// All stored earthquake IDs, sorted
    pub async fn list_quakes(&self) -> Result<Vec<String>> {
        let response = self.client.get(self.url("/quakes")).send().await?;
        self.handle_response(response).await
    }

    /// Raw feature stored for one earthquake
    pub async fn get_quake(&self, id: &str) -> Result<JsonValue> {
        let response = self
            .client
            .get(self.url(&format!("/quakes/{}", id)))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Raw features with an origin time inside the date range
    pub async fn quakes_in_range(&self, start: &str, end: &str) -> Result<Vec<JsonValue>> {
        let query = DateRangeQuery {
            start: start.to_string(),
            end: end.to_string(),
        };
        let response = self
            .client
            .get(self.url("/quakes/range"))
            .query(&query)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Raw features with a magnitude inside `[min, max]`; `None` leaves that end open
    pub async fn quakes_by_magnitude(&self, query: &ScoreRangeQuery) -> Result<Vec<JsonValue>> {
        let response = self
            .client
            .get(self.url("/quakes/magnitude"))
            .query(query)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Raw features with a depth inside `[min, max]`
    pub async fn quakes_by_depth(&self, query: &ScoreRangeQuery) -> Result<Vec<JsonValue>> {
        let response = self
            .client
            .get(self.url("/quakes/depth"))
            .query(query)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Raw features within `radius_km` of a point, nearest first
    pub async fn quakes_nearby(&self, query: &NearbyQuery) -> Result<Vec<JsonValue>> {
        let response = self
            .client
            .get(self.url("/quakes/nearby"))
            .query(query)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Summary statistics over a date range
    pub async fn quake_stats(&self, start: &str, end: &str) -> Result<QuakeStats> {
        let query = DateRangeQuery {
            start: start.to_string(),
            end: end.to_string(),
        };
        let response = self
            .client
            .get(self.url("/quakes/stats"))
            .query(&query)
            .send()
            .await?;
        self.handle_response(response).await
    }
}
