//! Configuration module
//!
//! Handles CLI configuration: where the API lives and how job waits poll it.

use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the Seismo API
    pub api_url: String,

    /// Interval between status polls when waiting on a job
    pub poll_interval: Duration,
}

impl Config {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            poll_interval: Duration::from_millis(500),
        }
    }
}
