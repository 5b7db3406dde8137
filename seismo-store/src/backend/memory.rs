//! In-memory backend for tests and local development
//!
//! Mirrors the Redis semantics the repositories rely on, including the
//! blocking list pop.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

use super::Store;
use crate::error::Result;

/// Mean Earth radius used by Redis geo commands, in kilometres
const EARTH_RADIUS_KM: f64 = 6372.797_560_856;

#[derive(Default)]
struct Data {
    strings: HashMap<String, Vec<u8>>,
    sets: HashMap<String, BTreeSet<String>>,
    sorted: HashMap<String, HashMap<String, f64>>,
    geo: HashMap<String, HashMap<String, (f64, f64)>>,
    lists: HashMap<String, VecDeque<String>>,
}

impl Data {
    fn contains(&self, key: &str) -> bool {
        self.strings.contains_key(key)
            || self.sets.contains_key(key)
            || self.sorted.contains_key(key)
            || self.geo.contains_key(key)
            || self.lists.contains_key(key)
    }

    fn remove(&mut self, key: &str) -> bool {
        let mut removed = self.strings.remove(key).is_some();
        removed |= self.sets.remove(key).is_some();
        removed |= self.sorted.remove(key).is_some();
        removed |= self.geo.remove(key).is_some();
        removed |= self.lists.remove(key).is_some();
        removed
    }

    fn all_keys(&self) -> impl Iterator<Item = &String> {
        self.strings
            .keys()
            .chain(self.sets.keys())
            .chain(self.sorted.keys())
            .chain(self.geo.keys())
            .chain(self.lists.keys())
    }
}

/// Single namespace held in process memory
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Data>,
    pushed: Notify,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, Data> {
        // A poisoned lock only means another test thread panicked mid-write
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn try_pop_front(&self, key: &str) -> Option<String> {
        let mut data = self.data();
        let list = data.lists.get_mut(key)?;
        let value = list.pop_front();
        if list.is_empty() {
            data.lists.remove(key);
        }
        value
    }

    /// Number of elements in a list
    pub fn list_len(&self, key: &str) -> usize {
        self.data().lists.get(key).map_or(0, VecDeque::len)
    }
}

/// Great-circle distance in kilometres
fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let (lat1, lat2) = (lat1.to_radians(), lat2.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data().strings.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.data().strings.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &[u8]) -> Result<bool> {
        let mut data = self.data();
        if data.contains(key) {
            return Ok(false);
        }
        data.strings.insert(key.to_string(), value.to_vec());
        Ok(true)
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let data = self.data();
        let keys: BTreeSet<String> = data
            .all_keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        Ok(keys.into_iter().collect())
    }

    async fn delete(&self, keys: &[String]) -> Result<usize> {
        let mut data = self.data();
        Ok(keys.iter().filter(|key| data.remove(key)).count())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<()> {
        self.data()
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        Ok(self
            .data()
            .sets
            .get(key)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn sorted_add(&self, key: &str, member: &str, score: f64) -> Result<()> {
        self.data()
            .sorted
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(())
    }

    async fn sorted_range_by_score(&self, key: &str, min: f64, max: f64) -> Result<Vec<String>> {
        let data = self.data();
        let Some(members) = data.sorted.get(key) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<(&String, f64)> = members
            .iter()
            .filter(|(_, score)| **score >= min && **score <= max)
            .map(|(member, score)| (member, *score))
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        Ok(hits.into_iter().map(|(member, _)| member.clone()).collect())
    }

    async fn geo_add(&self, key: &str, longitude: f64, latitude: f64, member: &str) -> Result<()> {
        self.data()
            .geo
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), (longitude, latitude));
        Ok(())
    }

    async fn geo_radius(
        &self,
        key: &str,
        longitude: f64,
        latitude: f64,
        radius_km: f64,
    ) -> Result<Vec<String>> {
        let data = self.data();
        let Some(points) = data.geo.get(key) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<(&String, f64)> = points
            .iter()
            .map(|(member, (lon, lat))| (member, haversine_km(longitude, latitude, *lon, *lat)))
            .filter(|(_, distance)| *distance <= radius_km)
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));

        Ok(hits.into_iter().map(|(member, _)| member.clone()).collect())
    }

    async fn push_back(&self, key: &str, value: &str) -> Result<()> {
        self.data()
            .lists
            .entry(key.to_string())
            .or_default()
            .push_back(value.to_string());
        // Stores a permit when nobody waits, so a push racing a pop is not lost
        self.pushed.notify_one();
        Ok(())
    }

    async fn pop_front_blocking(&self, key: &str, timeout: Duration) -> Result<Option<String>> {
        let deadline = (!timeout.is_zero()).then(|| Instant::now() + timeout);

        loop {
            if let Some(value) = self.try_pop_front(key) {
                return Ok(Some(value));
            }

            match deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                    let _ = tokio::time::timeout_at(deadline, self.pushed.notified()).await;
                }
                None => self.pushed.notified().await,
            }
        }
    }
}
