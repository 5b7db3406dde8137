//! Ingestion Service
//!
//! Loads the upstream feed into the record store and clears it again.

use std::sync::Arc;
use thiserror::Error;

use seismo_core::domain::quake::Earthquake;
use seismo_store::{RecordStore, StoreError};

use crate::feed::{FeedError, FeedSource};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] FeedError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct IngestService {
    records: RecordStore,
    feed: Arc<dyn FeedSource>,
}

impl IngestService {
    pub fn new(records: RecordStore, feed: Arc<dyn FeedSource>) -> Self {
        Self { records, feed }
    }

    /// Fetches the feed and indexes every usable feature.
    ///
    /// Features that cannot be indexed are skipped; the whole feature array is
    /// also stored as-is. Returns the number of indexed records.
    pub async fn load(&self) -> Result<usize, IngestError> {
        let features = self.feed.fetch_features().await?;

        let mut loaded = 0;
        for feature in &features {
            let Some(quake) = Earthquake::from_feature(feature) else {
                tracing::debug!("Skipping feature {:?}", feature.get("id"));
                continue;
            };
            self.records.insert(&quake, feature).await?;
            loaded += 1;
        }

        self.records.set_raw_data(&features).await?;

        tracing::info!("Loaded {} of {} features", loaded, features.len());
        Ok(loaded)
    }

    /// Deletes every record and index; returns the number of deleted keys
    pub async fn clear(&self) -> Result<usize, IngestError> {
        let deleted = self.records.clear().await?;
        tracing::info!("Deleted {} record keys", deleted);
        Ok(deleted)
    }
}
