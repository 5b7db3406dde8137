//! Query Service
//!
//! Read-only range queries and statistics over the indexed records.

use serde_json::Value as JsonValue;
use thiserror::Error;

use seismo_core::domain::quake::{MAX_LATITUDE, MAX_LONGITUDE, QuakeStats};
use seismo_core::domain::range::{DateRange, DateRangeError};
use seismo_store::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    InvalidRange(#[from] DateRangeError),

    #[error("{0}")]
    InvalidQuery(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct QueryService {
    records: RecordStore,
}

impl QueryService {
    pub fn new(records: RecordStore) -> Self {
        Self { records }
    }

    /// Identifiers of every loaded record
    pub async fn all_ids(&self) -> Result<Vec<String>, QueryError> {
        let ids = self.records.ids().await?;
        if ids.is_empty() {
            return Err(QueryError::NotFound("No earthquake data loaded".to_string()));
        }
        Ok(ids)
    }

    /// Stored GeoJSON feature of one record
    pub async fn get(&self, id: &str) -> Result<JsonValue, QueryError> {
        self.records
            .get_raw(id)
            .await?
            .ok_or_else(|| QueryError::NotFound(format!("Earthquake {} not found", id)))
    }

    pub async fn in_range(&self, start: &str, end: &str) -> Result<Vec<JsonValue>, QueryError> {
        let range = DateRange::parse(start, end)?;
        let ids = self.records.ids_by_time(range).await?;
        Ok(self.records.fetch_raw(&ids).await?)
    }

    pub async fn by_magnitude(&self, min: f64, max: f64) -> Result<Vec<JsonValue>, QueryError> {
        check_bounds(min, max)?;
        let ids = self.records.ids_by_magnitude(min, max).await?;
        Ok(self.records.fetch_raw(&ids).await?)
    }

    pub async fn by_depth(&self, min: f64, max: f64) -> Result<Vec<JsonValue>, QueryError> {
        check_bounds(min, max)?;
        let ids = self.records.ids_by_depth(min, max).await?;
        Ok(self.records.fetch_raw(&ids).await?)
    }

    /// Records within `radius_km` of a point, nearest first
    pub async fn nearby(
        &self,
        longitude: f64,
        latitude: f64,
        radius_km: f64,
    ) -> Result<Vec<JsonValue>, QueryError> {
        // Same bounds as the geo index; Redis rejects positions beyond them
        if !(-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&longitude)
            || !(-MAX_LATITUDE..=MAX_LATITUDE).contains(&latitude)
        {
            return Err(QueryError::InvalidQuery(format!(
                "invalid coordinates ({}, {})",
                longitude, latitude
            )));
        }
        if !(radius_km.is_finite() && radius_km > 0.0) {
            return Err(QueryError::InvalidQuery("radius_km must be positive".to_string()));
        }

        let ids = self.records.ids_nearby(longitude, latitude, radius_km).await?;
        Ok(self.records.fetch_raw(&ids).await?)
    }

    /// Magnitude, depth and magType summary for a date range
    pub async fn stats(&self, start: &str, end: &str) -> Result<QuakeStats, QueryError> {
        let range = DateRange::parse(start, end)?;
        let quakes = self.records.quakes_in_range(range).await?;
        Ok(QuakeStats::from_quakes(&quakes))
    }
}

fn check_bounds(min: f64, max: f64) -> Result<(), QueryError> {
    if min.is_nan() || max.is_nan() || min > max {
        return Err(QueryError::InvalidQuery(format!(
            "invalid range: min {} is greater than max {}",
            min, max
        )));
    }
    Ok(())
}
