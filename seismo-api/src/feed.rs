//! Upstream feed client
//!
//! Fetches the GeoJSON document and hands back its feature array.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("feed returned status {0}")]
    Status(u16),

    #[error("feed document is malformed: {0}")]
    Malformed(String),
}

/// Source of earthquake features
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_features(&self) -> Result<Vec<JsonValue>, FeedError>;
}

/// Extracts the `features` array of a GeoJSON FeatureCollection.
///
/// A document without `features` is an empty collection.
pub fn features_of(document: JsonValue) -> Result<Vec<JsonValue>, FeedError> {
    match document {
        JsonValue::Object(mut map) => match map.remove("features") {
            Some(JsonValue::Array(features)) => Ok(features),
            Some(JsonValue::Null) | None => Ok(Vec::new()),
            Some(_) => Err(FeedError::Malformed("'features' is not an array".to_string())),
        },
        _ => Err(FeedError::Malformed("document is not an object".to_string())),
    }
}

/// HTTP feed client
#[derive(Debug, Clone)]
pub struct FeedClient {
    url: String,
    client: reqwest::Client,
}

impl FeedClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_features(&self) -> Result<Vec<JsonValue>, FeedError> {
        tracing::info!("Fetching feed from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let document: JsonValue = response
            .json()
            .await
            .map_err(|e| FeedError::Malformed(e.to_string()))?;

        features_of(document)
    }
}

/// Feed serving a fixed document, for tests and offline runs
#[derive(Debug, Clone, Default)]
pub struct StaticFeed {
    features: Vec<JsonValue>,
}

impl StaticFeed {
    pub fn new(features: Vec<JsonValue>) -> Self {
        Self { features }
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch_features(&self) -> Result<Vec<JsonValue>, FeedError> {
        Ok(self.features.clone())
    }
}
