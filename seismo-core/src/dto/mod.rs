//! Data Transfer Objects for the HTTP API
//!
//! Request and response bodies exchanged between the API and its clients
//! (the CLI, scripts, the test suites).

pub mod job;
pub mod quake;

use serde::{Deserialize, Serialize};

/// Plain `{"message": ...}` response used by the data endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
