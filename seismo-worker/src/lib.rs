//! Seismo Worker
//!
//! Queue consumer of the chart pipeline.
//!
//! Architecture:
//! - Configuration: settings from environment variables
//! - Handlers: chart generation per job type, behind an explicit registry
//! - Render: PNG bar charts
//! - Scheduler: the dequeue and process loop

pub mod config;
pub mod handlers;
pub mod render;
pub mod scheduler;

pub use config::Config;
pub use handlers::HandlerRegistry;
pub use scheduler::Worker;
