//! Seismo API
//!
//! HTTP surface of the earthquake service: data ingestion, record queries
//! and the job submission side of the chart pipeline.

pub mod api;
pub mod config;
pub mod feed;
pub mod service;

pub use api::{AppState, create_router};
pub use config::Config;
