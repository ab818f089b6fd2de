//! # Node Runtime
//!
//! Entry point for the transaction admission node.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then `LN_*` environment overrides)
//! 2. Initialize logging at the configured level
//! 3. Validate configuration and build the pipeline
//! 4. Register the logging subscriber
//! 5. Wait for Ctrl-C, then drain the notification queue

use std::sync::Arc;

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, NodeRuntime};
use shared_bus::LoggingSubscriber;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("Failed to load configuration")?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.max_log_level()?)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let runtime = NodeRuntime::new(config).context("Failed to start node runtime")?;
    runtime.register_subscriber(Arc::new(LoggingSubscriber));

    info!("Node running; press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    // Queue shutdown joins the consumer thread.
    tokio::task::spawn_blocking(move || runtime.shutdown())
        .await
        .context("Shutdown task failed")?;

    info!("Node stopped");
    Ok(())
}
