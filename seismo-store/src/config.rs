//! Store configuration
//!
//! Selects the backend and builds one store per namespace.

use std::sync::Arc;

use crate::backend::{MemoryStore, RedisStore, Store};
use crate::error::Result;

/// Storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Redis,
    Memory,
}

impl std::str::FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Backend::Redis),
            "memory" => Ok(Backend::Memory),
            other => anyhow::bail!("unknown store backend '{}', expected redis or memory", other),
        }
    }
}

/// Logical namespaces and their Redis database indexes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Records,
    Queue,
    Jobs,
    Results,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::Records,
        Namespace::Queue,
        Namespace::Jobs,
        Namespace::Results,
    ];

    pub fn db_index(&self) -> u8 {
        match self {
            Namespace::Records => 0,
            Namespace::Queue => 1,
            Namespace::Jobs => 2,
            Namespace::Results => 3,
        }
    }
}

/// Connection settings shared by the API and the worker
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: Backend,
    pub redis_host: String,
    pub redis_port: u16,
}

impl StoreConfig {
    /// Creates a Redis configuration for the given host
    pub fn new(redis_host: impl Into<String>, redis_port: u16) -> Self {
        Self {
            backend: Backend::Redis,
            redis_host: redis_host.into(),
            redis_port,
        }
    }

    /// In-memory configuration, for tests and single-process runs
    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory,
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - STORE_BACKEND (optional, redis or memory, default: redis)
    /// - REDIS_HOST (optional, default: redis-db)
    /// - REDIS_PORT (optional, default: 6379)
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = match std::env::var("STORE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => Backend::Redis,
        };

        let redis_host = std::env::var("REDIS_HOST").unwrap_or_else(|_| "redis-db".to_string());

        let redis_port = match std::env::var("REDIS_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("REDIS_PORT must be a port number, got '{}'", value))?,
            Err(_) => 6379,
        };

        Ok(Self {
            backend,
            redis_host,
            redis_port,
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.backend == Backend::Redis {
            if self.redis_host.is_empty() {
                anyhow::bail!("redis_host cannot be empty");
            }
            if self.redis_port == 0 {
                anyhow::bail!("redis_port must be greater than 0");
            }
        }
        Ok(())
    }

    /// Connection URL for one namespace
    pub fn url(&self, namespace: Namespace) -> String {
        format!(
            "redis://{}:{}/{}",
            self.redis_host,
            self.redis_port,
            namespace.db_index()
        )
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("redis-db", 6379)
    }
}

/// One store per namespace
#[derive(Clone)]
pub struct Stores {
    pub records: Arc<dyn Store>,
    pub queue: Arc<dyn Store>,
    pub jobs: Arc<dyn Store>,
    pub results: Arc<dyn Store>,
}

impl Stores {
    /// Opens every namespace for the configured backend
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        match config.backend {
            Backend::Memory => Ok(Self::in_memory()),
            Backend::Redis => {
                let [records, queue, jobs, results] = Namespace::ALL.map(|ns| config.url(ns));
                Ok(Self {
                    records: Arc::new(RedisStore::connect(&records).await?),
                    queue: Arc::new(RedisStore::connect(&queue).await?),
                    jobs: Arc::new(RedisStore::connect(&jobs).await?),
                    results: Arc::new(RedisStore::connect(&results).await?),
                })
            }
        }
    }

    /// Four independent in-memory namespaces
    pub fn in_memory() -> Self {
        Self {
            records: Arc::new(MemoryStore::new()),
            queue: Arc::new(MemoryStore::new()),
            jobs: Arc::new(MemoryStore::new()),
            results: Arc::new(MemoryStore::new()),
        }
    }
}
