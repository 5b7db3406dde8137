//! Service Module
//!
//! Business logic layer of the API.
//! Services sit between the HTTP handlers and the store repositories.

pub mod data;
pub mod job;
pub mod quake;

// Re-export for convenience
pub use data as data_service;
pub use job as job_service;
pub use quake as quake_service;
