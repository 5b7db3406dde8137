//! Seismo Store
//!
//! Persistence layer shared by the API and the worker.
//!
//! Four logically separate namespaces live behind the [`Store`] trait:
//! - records: earthquake features and their indexes ([`RecordStore`])
//! - queue: pending job identifiers ([`JobQueue`])
//! - jobs: job metadata ([`JobRepository`])
//! - results: typed job outputs ([`ResultRepository`])
//!
//! With Redis each namespace is a separate logical database; the in-memory
//! backend gives each namespace its own [`MemoryStore`].

pub mod backend;
pub mod config;
pub mod error;
pub mod jobs;
pub mod queue;
pub mod records;
pub mod results;

pub use backend::{MemoryStore, RedisStore, Store};
pub use config::{Backend, Namespace, StoreConfig, Stores};
pub use error::{Result, StoreError};
pub use jobs::JobRepository;
pub use queue::JobQueue;
pub use records::RecordStore;
pub use results::ResultRepository;
