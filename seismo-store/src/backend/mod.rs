//! Storage backends
//!
//! [`Store`] is the primitive key-value/set/sorted-set/geo/list surface the
//! repositories are written against. It carries no business logic.
//!
//! All backends are trait-based to enable testing without a Redis server.

mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Primitive operations of a namespace
#[async_trait]
pub trait Store: Send + Sync {
    /// Point read
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Point write, overwriting any previous value
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Writes only when the key is absent; returns whether the value was written
    async fn set_if_absent(&self, key: &str, value: &[u8]) -> Result<bool>;

    /// Lists keys starting with `prefix`
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Deletes keys of any type; returns how many existed
    async fn delete(&self, keys: &[String]) -> Result<usize>;

    async fn set_add(&self, key: &str, member: &str) -> Result<()>;

    async fn set_members(&self, key: &str) -> Result<Vec<String>>;

    async fn sorted_add(&self, key: &str, member: &str, score: f64) -> Result<()>;

    /// Members with `min <= score <= max`, ordered by score then member
    async fn sorted_range_by_score(&self, key: &str, min: f64, max: f64) -> Result<Vec<String>>;

    async fn geo_add(&self, key: &str, longitude: f64, latitude: f64, member: &str) -> Result<()>;

    /// Members within `radius_km` of a point, nearest first
    async fn geo_radius(
        &self,
        key: &str,
        longitude: f64,
        latitude: f64,
        radius_km: f64,
    ) -> Result<Vec<String>>;

    /// Appends to the tail of a list
    async fn push_back(&self, key: &str, value: &str) -> Result<()>;

    /// Removes and returns the head of a list.
    ///
    /// Suspends until an element is available or `timeout` elapses; a zero
    /// timeout waits indefinitely. The removal is atomic: concurrent callers
    /// never receive the same element.
    async fn pop_front_blocking(&self, key: &str, timeout: Duration) -> Result<Option<String>>;
}
