//! Record Store
//!
//! Typed access to earthquake records and their indexes in the records
//! namespace. Each record is kept as its raw GeoJSON feature; the indexes
//! hold only identifiers.

use serde_json::Value as JsonValue;
use std::sync::Arc;

use seismo_core::domain::quake::Earthquake;
use seismo_core::domain::range::DateRange;

use crate::backend::Store;
use crate::error::Result;

pub const RECORD_PREFIX: &str = "earthquake:";
pub const INDEX_PREFIX: &str = "earthquakes:";
pub const IDS_KEY: &str = "earthquakes:ids";
pub const BY_MAG_KEY: &str = "earthquakes:by_mag";
pub const BY_DEPTH_KEY: &str = "earthquakes:by_depth";
pub const BY_TIME_KEY: &str = "earthquakes:by_time";
pub const GEO_KEY: &str = "earthquakes:geo";
pub const RAW_DATA_KEY: &str = "earthquakes:raw_data";

fn record_key(id: &str) -> String {
    format!("{}{}", RECORD_PREFIX, id)
}

#[derive(Clone)]
pub struct RecordStore {
    store: Arc<dyn Store>,
}

impl RecordStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Stores a feature and adds it to every index
    pub async fn insert(&self, quake: &Earthquake, feature: &JsonValue) -> Result<()> {
        let raw = serde_json::to_vec(feature)?;
        self.store.set(&record_key(&quake.id), &raw).await?;

        self.store.set_add(IDS_KEY, &quake.id).await?;
        self.store.sorted_add(BY_MAG_KEY, &quake.id, quake.mag).await?;
        self.store.sorted_add(BY_DEPTH_KEY, &quake.id, quake.depth).await?;
        self.store
            .sorted_add(BY_TIME_KEY, &quake.id, quake.time as f64)
            .await?;
        self.store
            .geo_add(GEO_KEY, quake.longitude, quake.latitude, &quake.id)
            .await?;

        Ok(())
    }

    /// Stores the whole feature array under a single key
    pub async fn set_raw_data(&self, features: &[JsonValue]) -> Result<()> {
        let raw = serde_json::to_vec(features)?;
        self.store.set(RAW_DATA_KEY, &raw).await
    }

    /// Raw stored feature of one record
    pub async fn get_raw(&self, id: &str) -> Result<Option<JsonValue>> {
        match self.store.get(&record_key(id)).await? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// Parsed record; `None` when absent or no longer indexable
    pub async fn get(&self, id: &str) -> Result<Option<Earthquake>> {
        Ok(self
            .get_raw(id)
            .await?
            .as_ref()
            .and_then(Earthquake::from_feature))
    }

    /// All indexed identifiers, sorted
    pub async fn ids(&self) -> Result<Vec<String>> {
        let mut ids = self.store.set_members(IDS_KEY).await?;
        ids.sort();
        Ok(ids)
    }

    pub async fn ids_by_time(&self, range: DateRange) -> Result<Vec<String>> {
        self.store
            .sorted_range_by_score(BY_TIME_KEY, range.start_ms as f64, range.end_ms as f64)
            .await
    }

    pub async fn ids_by_magnitude(&self, min: f64, max: f64) -> Result<Vec<String>> {
        self.store.sorted_range_by_score(BY_MAG_KEY, min, max).await
    }

    pub async fn ids_by_depth(&self, min: f64, max: f64) -> Result<Vec<String>> {
        self.store.sorted_range_by_score(BY_DEPTH_KEY, min, max).await
    }

    /// Identifiers within `radius_km` of a point, nearest first
    pub async fn ids_nearby(&self, longitude: f64, latitude: f64, radius_km: f64) -> Result<Vec<String>> {
        self.store
            .geo_radius(GEO_KEY, longitude, latitude, radius_km)
            .await
    }

    /// Parsed records for a list of identifiers, skipping missing ones
    pub async fn fetch(&self, ids: &[String]) -> Result<Vec<Earthquake>> {
        let mut quakes = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(quake) = self.get(id).await? {
                quakes.push(quake);
            }
        }
        Ok(quakes)
    }

    /// Raw features for a list of identifiers, skipping missing ones
    pub async fn fetch_raw(&self, ids: &[String]) -> Result<Vec<JsonValue>> {
        let mut features = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(feature) = self.get_raw(id).await? {
                features.push(feature);
            }
        }
        Ok(features)
    }

    /// Parsed records whose event time falls in the range
    pub async fn quakes_in_range(&self, range: DateRange) -> Result<Vec<Earthquake>> {
        let ids = self.ids_by_time(range).await?;
        self.fetch(&ids).await
    }

    /// Deletes every record and index key; returns how many keys existed
    pub async fn clear(&self) -> Result<usize> {
        let mut keys = self.store.keys(RECORD_PREFIX).await?;
        for key in self.store.keys(INDEX_PREFIX).await? {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        self.store.delete(&keys).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use serde_json::json;

    fn feature(id: &str, mag: f64, time: i64, place: &str, coords: [f64; 3]) -> JsonValue {
        json!({
            "id": id,
            "properties": { "mag": mag, "time": time, "magType": "ml", "place": place },
            "geometry": { "coordinates": coords }
        })
    }

    async fn seeded() -> RecordStore {
        let records = RecordStore::new(Arc::new(MemoryStore::new()));
        let features = vec![
            // 2025-03-01T12:00:00Z
            feature("a", 1.5, 1_740_830_400_000, "5 km N of Anchorage, Alaska", [-149.9, 61.2, 10.0]),
            // 2025-03-02T12:00:00Z
            feature("b", 3.0, 1_740_916_800_000, "10 km SW of Hilo, Hawaii", [-155.1, 19.7, 2.0]),
            // 2025-03-10T12:00:00Z
            feature("c", 4.5, 1_741_608_000_000, "Fiji region", [178.0, -17.0, 550.0]),
        ];
        for f in &features {
            let quake = Earthquake::from_feature(f).unwrap();
            records.insert(&quake, f).await.unwrap();
        }
        records.set_raw_data(&features).await.unwrap();
        records
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let records = seeded().await;

        assert_eq!(records.ids().await.unwrap(), vec!["a", "b", "c"]);

        let raw = records.get_raw("b").await.unwrap().unwrap();
        assert_eq!(raw["properties"]["place"], "10 km SW of Hilo, Hawaii");

        let quake = records.get("c").await.unwrap().unwrap();
        assert_eq!(quake.depth, 550.0);

        assert!(records.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_range_queries() {
        let records = seeded().await;

        let range = DateRange::parse("2025-03-01", "2025-03-02").unwrap();
        assert_eq!(records.ids_by_time(range).await.unwrap(), vec!["a", "b"]);

        assert_eq!(records.ids_by_magnitude(2.0, 5.0).await.unwrap(), vec!["b", "c"]);
        assert_eq!(records.ids_by_depth(0.0, 20.0).await.unwrap(), vec!["b", "a"]);

        let nearby = records.ids_nearby(-155.0, 19.7, 50.0).await.unwrap();
        assert_eq!(nearby, vec!["b"]);
    }

    #[tokio::test]
    async fn test_quakes_in_empty_range() {
        let records = seeded().await;
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert!(records.quakes_in_range(range).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_skips_missing_ids() {
        let records = seeded().await;
        let ids = vec!["a".to_string(), "ghost".to_string()];
        assert_eq!(records.fetch(&ids).await.unwrap().len(), 1);
        assert_eq!(records.fetch_raw(&ids).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let records = seeded().await;

        // 3 records + ids, by_mag, by_depth, by_time, geo, raw_data
        assert_eq!(records.clear().await.unwrap(), 9);
        assert!(records.ids().await.unwrap().is_empty());
        assert_eq!(records.clear().await.unwrap(), 0);
    }
}
