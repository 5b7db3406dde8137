//! API configuration
//!
//! Everything comes from environment variables with defaults suited to the
//! container deployment.

use anyhow::Context;
use std::time::Duration;

use seismo_store::StoreConfig;

/// USGS feed for March 2025
pub const DEFAULT_FEED_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query.geojson?starttime=2025-03-01%2000:00:00&endtime=2025-03-31%2023:59:59";

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server listens on
    pub bind_addr: String,

    /// GeoJSON feed fetched by `POST /data`
    pub feed_url: String,

    /// Age after which a job still `submitted` counts as stale
    pub stale_submitted: Duration,

    pub store: StoreConfig,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - BIND_ADDR (optional, default: 0.0.0.0:5000)
    /// - FEED_URL (optional, default: USGS March 2025 query)
    /// - STALE_SUBMITTED_SECS (optional, default: 300)
    /// - STORE_BACKEND, REDIS_HOST, REDIS_PORT (see [`StoreConfig::from_env`])
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

        let feed_url = std::env::var("FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string());

        let stale_submitted = match std::env::var("STALE_SUBMITTED_SECS") {
            Ok(value) => Duration::from_secs(
                value
                    .parse::<u64>()
                    .with_context(|| format!("STALE_SUBMITTED_SECS must be a number, got '{}'", value))?,
            ),
            Err(_) => Duration::from_secs(300),
        };

        let store = StoreConfig::from_env().context("invalid store configuration")?;

        Ok(Self {
            bind_addr,
            feed_url,
            stale_submitted,
            store,
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if !self.feed_url.starts_with("http://") && !self.feed_url.starts_with("https://") {
            anyhow::bail!("feed_url must start with http:// or https://");
        }

        if self.stale_submitted.is_zero() {
            anyhow::bail!("stale_submitted must be greater than 0");
        }

        self.store.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            feed_url: DEFAULT_FEED_URL.to_string(),
            stale_submitted: Duration::from_secs(300),
            store: StoreConfig::default(),
        }
    }
}
