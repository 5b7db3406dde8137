//! Seismo Worker
//!
//! Long-lived process that pops chart jobs off the queue and stores their
//! results. Run several processes to scale out.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seismo_store::{RecordStore, Stores};
use seismo_worker::{Config, HandlerRegistry, Worker};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seismo_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Seismo Worker");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    info!(
        "Loaded configuration: worker_id={}, backend={:?}, dequeue_timeout={:?}, lease={:?}",
        config.worker_id, config.store.backend, config.dequeue_timeout, config.lease
    );

    let stores = Stores::connect(&config.store)
        .await
        .context("Failed to connect to store")?;

    let registry = Arc::new(HandlerRegistry::standard(RecordStore::new(
        stores.records.clone(),
    )));

    let worker = Worker::new(&config, &stores, registry);
    worker.run(shutdown_signal()).await;

    info!("Worker stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
