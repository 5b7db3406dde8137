//! Store error types

use seismo_core::domain::job::TransitionError;
use seismo_core::domain::result::ResultError;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend could not be reached
    #[error("store connection error: {0}")]
    Connection(String),

    /// Backend rejected a command
    #[error("store command error: {0}")]
    Command(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Result(#[from] ResultError),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
