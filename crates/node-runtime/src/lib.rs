//! # Node Runtime Library
//!
//! Wires the admission pipeline together: confirmed coin view, pending pool,
//! notification queue, relay and submitter. The `main.rs` binary adds
//! logging, configuration loading and signal handling on top.
//!
//! ## Wiring
//!
//! ```text
//! NodeConfig ──→ NodeRuntime::new()
//!                  ├─ NotificationQueue (consumer thread)
//!                  ├─ ChainState<InMemoryCoinsView> (behind one Mutex)
//!                  ├─ InventoryRelay
//!                  └─ TransactionSubmitter
//! ```

#![allow(clippy::type_complexity)]

pub mod config;

pub use config::{ConfigError, NodeConfig};

use mempool::{
    ChainState, InMemoryCoinsView, InventoryRelay, StandardnessVerifier, SystemTimeSource,
    TransactionSubmitter, TransactionVerifier,
};
use parking_lot::Mutex;
use shared_bus::{NotificationQueue, QueueError, ValidationSubscriber};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// The submitter as wired by the runtime.
pub type NodeSubmitter = TransactionSubmitter<InMemoryCoinsView, InventoryRelay>;

/// Runtime construction errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Notification queue: {0}")]
    Queue(#[from] QueueError),
}

/// The running admission pipeline.
pub struct NodeRuntime {
    config: NodeConfig,
    queue: Arc<NotificationQueue>,
    relay: Arc<InventoryRelay>,
    submitter: Arc<NodeSubmitter>,
}

impl NodeRuntime {
    /// Builds the pipeline with an empty confirmed coin set and the
    /// standardness policy as verifier.
    pub fn new(config: NodeConfig) -> Result<Self, RuntimeError> {
        Self::with_parts(
            config,
            InMemoryCoinsView::new(),
            Arc::new(StandardnessVerifier::default()),
        )
    }

    /// Builds the pipeline around a pre-populated coin set and a custom
    /// verifier.
    ///
    /// The coin set keeps a tombstone for every spent coin so resubmitted
    /// confirmed transactions are still recognised. Nothing prunes them
    /// automatically: they accumulate for the life of the runtime unless the
    /// owner calls `InMemoryCoinsView::prune_spent` through
    /// `submitter().state()`, which gives up that recognition for the
    /// pruned coins.
    pub fn with_parts(
        config: NodeConfig,
        coins: InMemoryCoinsView,
        verifier: Arc<dyn TransactionVerifier>,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;

        let queue = Arc::new(NotificationQueue::with_config(config.queue.clone())?);
        let relay = Arc::new(InventoryRelay::new());
        let state = ChainState::new(coins, config.mempool.clone(), verifier);

        let submitter = Arc::new(TransactionSubmitter::new(
            config.submitter.clone(),
            Arc::new(Mutex::new(state)),
            Arc::clone(&queue),
            Arc::clone(&relay),
            Arc::new(SystemTimeSource),
        ));

        info!(
            max_pool_bytes = config.mempool.max_pool_bytes,
            min_relay_fee = %config.mempool.min_relay_fee_per_kb,
            sync_timeout_ms = ?config.submitter.sync_timeout.map(|t| t.as_millis()),
            "Node runtime initialized"
        );

        Ok(Self {
            config,
            queue,
            relay,
            submitter,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn submitter(&self) -> Arc<NodeSubmitter> {
        Arc::clone(&self.submitter)
    }

    pub fn relay(&self) -> Arc<InventoryRelay> {
        Arc::clone(&self.relay)
    }

    pub fn queue(&self) -> Arc<NotificationQueue> {
        Arc::clone(&self.queue)
    }

    /// Registers a validation subscriber for all subsequent events.
    pub fn register_subscriber(&self, subscriber: Arc<dyn ValidationSubscriber>) {
        self.queue.register(subscriber);
    }

    /// Drains the notification queue and stops its consumer thread.
    ///
    /// Must be called from outside any task running on the queue.
    pub fn shutdown(&self) {
        info!(
            pending = self.queue.pending_callbacks(),
            "Shutting down node runtime"
        );
        self.queue.unregister_all();
        self.queue.shutdown();
    }
}
