//! # Validation Subscribers
//!
//! Defines the consuming side of the notification queue. Subscribers are
//! invoked on the queue's consumer thread, one event at a time, in the order
//! events were published.

use crate::events::NodeEvent;
use parking_lot::Mutex;
use tracing::debug;

/// A downstream component reacting to pool and chain changes
/// (wallets, indexers, persistence).
///
/// Implementations run on the single consumer thread and should not block
/// for long: every later task waits behind them.
pub trait ValidationSubscriber: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Handle one event.
    fn on_event(&self, event: &NodeEvent);
}

/// Subscriber that logs every event at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSubscriber;

impl ValidationSubscriber for LoggingSubscriber {
    fn name(&self) -> &str {
        "logging"
    }

    fn on_event(&self, event: &NodeEvent) {
        debug!(topic = ?event.topic(), txid = ?event.txid(), "Validation event: {:?}", event);
    }
}

/// Subscriber that keeps every event it receives.
///
/// Used by diagnostics and tests to observe what the queue delivered.
#[derive(Debug, Default)]
pub struct RecordingSubscriber {
    events: Mutex<Vec<NodeEvent>>,
}

impl RecordingSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events received so far.
    pub fn events(&self) -> Vec<NodeEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl ValidationSubscriber for RecordingSubscriber {
    fn name(&self) -> &str {
        "recording"
    }

    fn on_event(&self, event: &NodeEvent) {
        self.events.lock().push(event.clone());
    }
}
