//! Seismo HTTP Client
//!
//! A typed HTTP client for the Seismo API, used by the command line tool and
//! by scripts that drive the job pipeline.
//!
//! # Example
//!
//! ```no_run
//! use seismo_client::SeismoClient;
//! use seismo_core::dto::job::SubmitJob;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SeismoClient::new("http://localhost:5000");
//!
//!     client.load_data().await?;
//!     let job = client.submit_job(SubmitJob::new("2025-03-01", "2025-03-02")).await?;
//!     let job = client
//!         .wait_for_job(&job.id, Duration::from_millis(500), Duration::from_secs(30))
//!         .await?;
//!
//!     println!("Job {} finished as {}", job.id, job.status);
//!     Ok(())
//! }
//! ```

mod data;
pub mod error;
mod jobs;
mod quakes;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use jobs::decode_result;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Seismo API
///
/// Methods are grouped by resource:
/// - Dataset loading and clearing
/// - Earthquake queries and statistics
/// - Job submission, polling and results
#[derive(Debug, Clone)]
pub struct SeismoClient {
    /// Base URL of the API (e.g., "http://localhost:5000")
    base_url: String,
    client: Client,
}

impl SeismoClient {
    /// Create a new client
    ///
    /// ```
    /// use seismo_client::SeismoClient;
    ///
    /// let client = SeismoClient::new("http://localhost:5000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client (timeouts, proxies, TLS)
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Check the status code and return the body as text
    async fn handle_text_response(&self, response: reqwest::Response) -> Result<String> {
        let response = self.check_status(response).await?;
        Ok(response.text().await?)
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SeismoClient::new("http://localhost:5000");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = SeismoClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/jobs"), "http://localhost:5000/jobs");
    }

    #[test]
    fn test_client_with_custom_client() {
        let client = SeismoClient::with_client("http://api:5000", Client::new());
        assert_eq!(client.base_url(), "http://api:5000");
    }
}
