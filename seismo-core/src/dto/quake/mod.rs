//! Quake query DTOs

use serde::{Deserialize, Serialize};

/// `?start=&end=` date range query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRangeQuery {
    pub start: String,
    pub end: String,
}

/// `?min=&max=` score range query; open ends default to infinity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreRangeQuery {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ScoreRangeQuery {
    pub fn bounds(&self) -> (f64, f64) {
        (
            self.min.unwrap_or(f64::NEG_INFINITY),
            self.max.unwrap_or(f64::INFINITY),
        )
    }
}

/// `?lon=&lat=&radius_km=` geo query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub lon: f64,
    pub lat: f64,
    pub radius_km: f64,
}
