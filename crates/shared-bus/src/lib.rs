//! # Shared Bus - Notification Queue for Validation Subscribers
//!
//! Carries pool and chain events from the admission path to downstream
//! subscribers (wallets, indexers, persistence) without blocking producers.
//!
//! ## Ordering Model
//!
//! ```text
//! ┌──────────────┐   publish()/enqueue()   ┌──────────────────┐
//! │  Submitter   │ ──────────────────────→ │ NotificationQueue│
//! │  (producer)  │                         │   FIFO channel   │
//! └──────────────┘                         └────────┬─────────┘
//!        ↑                                          │ one consumer thread
//!        │        CompletionHandle (oneshot)        ↓
//!        └───────────────────────────────── subscriber.on_event()
//! ```
//!
//! - Producers never block on `enqueue`/`publish`.
//! - A completion handle resolves only after its own task has run, so all
//!   earlier tasks from the same producer have run too.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod queue;
pub mod subscriber;

// Re-export main types
pub use events::{EventTopic, NodeEvent, RemovalReason};
pub use queue::{CompletionHandle, NotificationQueue, QueueConfig, QueueError, Task};
pub use subscriber::{LoggingSubscriber, RecordingSubscriber, ValidationSubscriber};

/// Default name of the queue's consumer thread.
pub const DEFAULT_QUEUE_THREAD_NAME: &str = "notify-queue";
