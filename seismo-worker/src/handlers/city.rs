//! Earthquake count by locality

use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

use seismo_core::domain::quake::Earthquake;
use seismo_core::domain::range::DateRange;
use seismo_store::RecordStore;

use super::{ChartHandler, HandlerError, HandlerOutput};

pub struct CityCountHandler {
    records: RecordStore,
}

impl CityCountHandler {
    pub fn new(records: RecordStore) -> Self {
        Self { records }
    }
}

/// `{locality: count}` over the given records
pub fn count_by_locality(quakes: &[Earthquake]) -> Map<String, JsonValue> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for quake in quakes {
        *counts.entry(quake.locality()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(locality, count)| (locality.to_string(), JsonValue::from(count)))
        .collect()
}

#[async_trait]
impl ChartHandler for CityCountHandler {
    async fn run(&self, start: &str, end: &str) -> Result<HandlerOutput, HandlerError> {
        let range = DateRange::parse(start, end)?;
        let quakes = self.records.quakes_in_range(range).await?;

        Ok(HandlerOutput::Json(JsonValue::Object(count_by_locality(&quakes))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seismo_store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn quake(id: &str, place: Option<&str>) -> Earthquake {
        Earthquake {
            id: id.to_string(),
            mag: 1.0,
            depth: 1.0,
            time: 0,
            longitude: 0.0,
            latitude: 0.0,
            mag_type: None,
            place: place.map(str::to_string),
        }
    }

    #[test]
    fn test_count_by_locality() {
        let quakes = vec![
            quake("1", Some("10 km SSW of Volcano, Hawaii")),
            quake("2", Some("3 km E of Volcano, Hawaii")),
            quake("3", Some("Fiji region")),
            quake("4", None),
        ];

        let counts = JsonValue::Object(count_by_locality(&quakes));
        assert_eq!(
            counts,
            json!({"Volcano, Hawaii": 2, "Fiji region": 1, "Unknown": 1})
        );
    }

    #[tokio::test]
    async fn test_empty_range_is_empty_object() {
        let handler = CityCountHandler::new(RecordStore::new(Arc::new(MemoryStore::new())));
        let output = handler.run("2025-03-01", "2025-03-02").await.unwrap();
        assert_eq!(output, HandlerOutput::Json(json!({})));
    }
}
