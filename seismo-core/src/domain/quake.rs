//! Earthquake domain types
//!
//! Records come from USGS GeoJSON features. Only the fields needed for the
//! indexes and the charts are extracted; the raw feature is stored as-is.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Longitude bounds accepted by the geo index
pub const MAX_LONGITUDE: f64 = 180.0;

/// Latitude bounds accepted by the geo index (Web Mercator limit)
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Magnitude bounds of a plausible record; anything outside is a feed error
pub const MIN_MAGNITUDE: f64 = -5.0;
pub const MAX_MAGNITUDE: f64 = 12.0;

/// Locality used when a record carries no place
pub const UNKNOWN_LOCALITY: &str = "Unknown";

/// Parsed earthquake record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Earthquake {
    pub id: String,
    pub mag: f64,
    pub depth: f64,
    /// Event time in epoch milliseconds
    pub time: i64,
    pub longitude: f64,
    pub latitude: f64,
    pub mag_type: Option<String>,
    pub place: Option<String>,
}

impl Earthquake {
    /// Extracts a record from a GeoJSON feature.
    ///
    /// Returns `None` for features that cannot be indexed: missing id,
    /// magnitude or time, a magnitude outside `MIN_MAGNITUDE..=MAX_MAGNITUDE`,
    /// fewer than three numeric coordinates, or a position outside the geo
    /// index bounds.
    pub fn from_feature(feature: &JsonValue) -> Option<Self> {
        let id = feature.get("id")?.as_str().filter(|id| !id.is_empty())?;

        let coordinates = feature.get("geometry")?.get("coordinates")?.as_array()?;
        if coordinates.len() < 3 {
            return None;
        }
        let longitude = coordinates[0].as_f64()?;
        let latitude = coordinates[1].as_f64()?;
        let depth = coordinates[2].as_f64()?;

        if !(-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&longitude)
            || !(-MAX_LATITUDE..=MAX_LATITUDE).contains(&latitude)
        {
            return None;
        }

        let properties = feature.get("properties")?;
        let mag = properties.get("mag")?.as_f64()?;
        if !(MIN_MAGNITUDE..=MAX_MAGNITUDE).contains(&mag) {
            return None;
        }
        let time = properties.get("time")?.as_i64()?;
        let mag_type = properties
            .get("magType")
            .and_then(JsonValue::as_str)
            .map(str::to_string);
        let place = properties
            .get("place")
            .and_then(JsonValue::as_str)
            .map(str::to_string);

        Some(Self {
            id: id.to_string(),
            mag,
            depth,
            time,
            longitude,
            latitude,
            mag_type,
            place,
        })
    }

    /// Locality part of the place description.
    ///
    /// "10 km SSW of Volcano, Hawaii" becomes "Volcano, Hawaii"; a place
    /// without a bearing prefix is used whole.
    pub fn locality(&self) -> &str {
        let place = match self.place.as_deref().map(str::trim) {
            Some(place) if !place.is_empty() => place,
            _ => return UNKNOWN_LOCALITY,
        };

        match place.rfind(" of ") {
            Some(idx) => {
                let locality = place[idx + 4..].trim();
                if locality.is_empty() {
                    UNKNOWN_LOCALITY
                } else {
                    locality
                }
            }
            None => place,
        }
    }
}

/// Summary statistics over a set of records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuakeStats {
    pub count: usize,
    pub max_magnitude: Option<f64>,
    pub min_magnitude: Option<f64>,
    pub max_depth: Option<f64>,
    pub min_depth: Option<f64>,
    pub magtype_counts: BTreeMap<String, usize>,
}

impl QuakeStats {
    pub fn from_quakes<'a>(quakes: impl IntoIterator<Item = &'a Earthquake>) -> Self {
        let mut stats = QuakeStats::default();

        for quake in quakes {
            stats.count += 1;
            stats.max_magnitude = Some(stats.max_magnitude.map_or(quake.mag, |m| m.max(quake.mag)));
            stats.min_magnitude = Some(stats.min_magnitude.map_or(quake.mag, |m| m.min(quake.mag)));
            stats.max_depth = Some(stats.max_depth.map_or(quake.depth, |d| d.max(quake.depth)));
            stats.min_depth = Some(stats.min_depth.map_or(quake.depth, |d| d.min(quake.depth)));

            if let Some(mag_type) = quake.mag_type.as_deref().map(str::trim) {
                if !mag_type.is_empty() {
                    *stats.magtype_counts.entry(mag_type.to_string()).or_default() += 1;
                }
            }
        }

        stats
    }
}
