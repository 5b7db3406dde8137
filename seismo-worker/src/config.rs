//! Worker configuration
//!
//! Defines the queue polling, error back-off and lease settings of a worker
//! process, plus the store connection it shares with the API.

use anyhow::Context;
use std::time::Duration;

use seismo_store::StoreConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Identifier used in logs
    pub worker_id: String,

    /// How long one blocking pop waits before the loop checks for shutdown
    pub dequeue_timeout: Duration,

    /// Pause after a queue error before retrying
    pub error_backoff: Duration,

    /// Execution lease recorded on each attempt; no lease when unset
    pub lease: Option<Duration>,

    pub store: StoreConfig,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(worker_id: String, store: StoreConfig) -> Self {
        Self {
            worker_id,
            dequeue_timeout: Duration::from_secs(5),
            error_backoff: Duration::from_millis(1000),
            lease: None,
            store,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - WORKER_ID (optional, default: random UUID)
    /// - DEQUEUE_TIMEOUT_SECS (optional, default: 5)
    /// - ERROR_BACKOFF_MS (optional, default: 1000)
    /// - LEASE_SECONDS (optional, default: no lease)
    /// - STORE_BACKEND, REDIS_HOST, REDIS_PORT (see [`StoreConfig::from_env`])
    pub fn from_env() -> anyhow::Result<Self> {
        let worker_id = std::env::var("WORKER_ID").unwrap_or_else(|_| uuid::Uuid::new_v4().to_string());

        let dequeue_timeout = env_u64("DEQUEUE_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(5));

        let error_backoff = env_u64("ERROR_BACKOFF_MS")?
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_millis(1000));

        let lease = env_u64("LEASE_SECONDS")?.map(Duration::from_secs);

        let store = StoreConfig::from_env().context("invalid store configuration")?;

        Ok(Self {
            worker_id,
            dequeue_timeout,
            error_backoff,
            lease,
            store,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.worker_id.is_empty() {
            anyhow::bail!("worker_id cannot be empty");
        }

        // A zero timeout would block forever and never observe shutdown
        if self.dequeue_timeout.is_zero() {
            anyhow::bail!("dequeue_timeout must be greater than 0");
        }

        if self.lease.is_some_and(|lease| lease.is_zero()) {
            anyhow::bail!("lease must be greater than 0 when set");
        }

        self.store.validate()
    }

    /// Lease as a chrono duration, as recorded on the job
    pub fn lease_duration(&self) -> Option<chrono::Duration> {
        self.lease.and_then(|lease| chrono::Duration::from_std(lease).ok())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), StoreConfig::default())
    }
}

fn env_u64(name: &str) -> anyhow::Result<Option<u64>> {
    match std::env::var(name) {
        Ok(value) => value
            .parse::<u64>()
            .map(Some)
            .with_context(|| format!("{} must be a number, got '{}'", name, value)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dequeue_timeout, Duration::from_secs(5));
        assert_eq!(config.error_backoff, Duration::from_millis(1000));
        assert!(config.lease.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.worker_id = String::new();
        assert!(config.validate().is_err());

        config.worker_id = "worker-1".to_string();
        config.dequeue_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        config.dequeue_timeout = Duration::from_secs(1);
        config.lease = Some(Duration::ZERO);
        assert!(config.validate().is_err());

        config.lease = Some(Duration::from_secs(60));
        assert!(config.validate().is_ok());
        assert_eq!(config.lease_duration(), Some(chrono::Duration::seconds(60)));
    }
}
