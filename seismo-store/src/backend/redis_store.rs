//! Redis backend
//!
//! One [`RedisStore`] per namespace, each bound to its own logical database.
//! The connection manager multiplexes commands over one connection and
//! reconnects on failure.
//!
//! A blocking pop holds the multiplexed connection until it returns, so the
//! queue namespace must not share its store with latency-sensitive callers.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;
use tracing::debug;

use super::Store;
use crate::error::{Result, StoreError};

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connects to a Redis logical database
    ///
    /// # Arguments
    /// * `url` - Connection URL including the database index (e.g., "redis://localhost:6379/2")
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| StoreError::Connection(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        debug!("Connected to {}", url);

        Ok(Self { conn })
    }

    fn conn(&self) -> ConnectionManager {
        self.conn.clone()
    }
}

/// Formats a score bound the way ZRANGEBYSCORE expects infinities
fn score_arg(score: f64) -> String {
    if score == f64::INFINITY {
        "+inf".to_string()
    } else if score == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        score.to_string()
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value: Option<Vec<u8>> = self.conn().get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let _: () = self.conn().set(key, value).await?;
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &[u8]) -> Result<bool> {
        let written: bool = self.conn().set_nx(key, value).await?;
        Ok(written)
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let keys: Vec<String> = self.conn().keys(format!("{}*", prefix)).await?;
        Ok(keys)
    }

    async fn delete(&self, keys: &[String]) -> Result<usize> {
        if keys.is_empty() {
            return Ok(0);
        }
        let deleted: usize = self.conn().del(keys).await?;
        Ok(deleted)
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<()> {
        let _: () = self.conn().sadd(key, member).await?;
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        let members: Vec<String> = self.conn().smembers(key).await?;
        Ok(members)
    }

    async fn sorted_add(&self, key: &str, member: &str, score: f64) -> Result<()> {
        let _: () = self.conn().zadd(key, member, score).await?;
        Ok(())
    }

    async fn sorted_range_by_score(&self, key: &str, min: f64, max: f64) -> Result<Vec<String>> {
        let members: Vec<String> = self
            .conn()
            .zrangebyscore(key, score_arg(min), score_arg(max))
            .await?;
        Ok(members)
    }

    async fn geo_add(&self, key: &str, longitude: f64, latitude: f64, member: &str) -> Result<()> {
        let _: () = redis::cmd("GEOADD")
            .arg(key)
            .arg(longitude)
            .arg(latitude)
            .arg(member)
            .query_async(&mut self.conn())
            .await?;
        Ok(())
    }

    async fn geo_radius(
        &self,
        key: &str,
        longitude: f64,
        latitude: f64,
        radius_km: f64,
    ) -> Result<Vec<String>> {
        let members: Vec<String> = redis::cmd("GEOSEARCH")
            .arg(key)
            .arg("FROMLONLAT")
            .arg(longitude)
            .arg(latitude)
            .arg("BYRADIUS")
            .arg(radius_km)
            .arg("km")
            .arg("ASC")
            .query_async(&mut self.conn())
            .await?;
        Ok(members)
    }

    async fn push_back(&self, key: &str, value: &str) -> Result<()> {
        let _: () = self.conn().rpush(key, value).await?;
        Ok(())
    }

    async fn pop_front_blocking(&self, key: &str, timeout: Duration) -> Result<Option<String>> {
        // BLPOP replies with [key, value], or nil on timeout
        let popped: Option<(String, String)> = redis::cmd("BLPOP")
            .arg(key)
            .arg(timeout.as_secs_f64())
            .query_async(&mut self.conn())
            .await?;
        Ok(popped.map(|(_, value)| value))
    }
}
