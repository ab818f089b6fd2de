//! # Notification Queue
//!
//! Ordered, many-producer / single-consumer task queue.
//!
//! ```text
//! producer ──enqueue()──┐
//! producer ──publish()──┼──→ [ unbounded FIFO ] ──→ consumer thread ──→ task()
//! producer ──signal()───┘                                │
//!                                                        └──→ oneshot ──→ waiter
//! ```
//!
//! - `enqueue` never blocks the producer.
//! - Tasks run one at a time on a dedicated thread, in enqueue order.
//! - A completion signal fires only after its task has been dequeued and
//!   run, so every task enqueued before it has already finished.

use crate::events::NodeEvent;
use crate::subscriber::ValidationSubscriber;
use crate::DEFAULT_QUEUE_THREAD_NAME;
use parking_lot::{Mutex, RwLock};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

/// A unit of work run on the consumer thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Errors from notification queue operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The queue was shut down; the task will never run.
    #[error("Notification queue closed")]
    Closed,

    /// The consumer thread could not be started.
    #[error("Failed to spawn queue consumer: {0}")]
    Spawn(String),
}

/// Notification queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Name given to the consumer thread.
    pub thread_name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_QUEUE_THREAD_NAME.to_string(),
        }
    }
}

/// Handle to a one-shot completion signal.
///
/// Resolves once the associated task has run on the consumer thread, or with
/// [`QueueError::Closed`] if the task can no longer run. Consumed by the
/// single waiter.
#[must_use = "a completion handle does nothing unless waited on"]
#[derive(Debug)]
pub struct CompletionHandle {
    receiver: oneshot::Receiver<()>,
}

impl CompletionHandle {
    /// Wait asynchronously for the signal.
    pub async fn wait(self) -> Result<(), QueueError> {
        self.receiver.await.map_err(|_| QueueError::Closed)
    }

    /// Block the current thread until the signal fires.
    ///
    /// Must not be called from within an async runtime or from the queue's
    /// own consumer thread.
    pub fn blocking_wait(self) -> Result<(), QueueError> {
        self.receiver.blocking_recv().map_err(|_| QueueError::Closed)
    }
}

/// Single-consumer task queue with a subscriber registry.
pub struct NotificationQueue {
    /// Producer side; `None` once shut down.
    sender: RwLock<Option<mpsc::UnboundedSender<Task>>>,
    /// Consumer thread, joined on shutdown.
    consumer: Mutex<Option<JoinHandle<()>>>,
    /// Tasks enqueued but not yet finished.
    pending: Arc<AtomicUsize>,
    /// Subscribers notified by `publish`, in registration order.
    subscribers: RwLock<Vec<Arc<dyn ValidationSubscriber>>>,
}

impl NotificationQueue {
    /// Start a queue with default configuration.
    pub fn start() -> Result<Self, QueueError> {
        Self::with_config(QueueConfig::default())
    }

    /// Start a queue and its consumer thread.
    pub fn with_config(config: QueueConfig) -> Result<Self, QueueError> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Task>();
        let pending = Arc::new(AtomicUsize::new(0));
        let consumer_pending = Arc::clone(&pending);

        let consumer = std::thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                while let Some(task) = receiver.blocking_recv() {
                    if catch_unwind(AssertUnwindSafe(task)).is_err() {
                        error!("Notification task panicked; continuing with next task");
                    }
                    consumer_pending.fetch_sub(1, Ordering::SeqCst);
                }
                debug!("Notification queue drained, consumer exiting");
            })
            .map_err(|e| QueueError::Spawn(e.to_string()))?;

        info!(thread = %config.thread_name, "Notification queue started");

        Ok(Self {
            sender: RwLock::new(Some(sender)),
            consumer: Mutex::new(Some(consumer)),
            pending,
            subscribers: RwLock::new(Vec::new()),
        })
    }

    /// Enqueue a task without blocking.
    ///
    /// # Errors
    ///
    /// `QueueError::Closed` if the queue has been shut down.
    pub fn enqueue<F>(&self, task: F) -> Result<(), QueueError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.read();
        let Some(sender) = sender.as_ref() else {
            return Err(QueueError::Closed);
        };

        self.pending.fetch_add(1, Ordering::SeqCst);
        if sender.send(Box::new(task)).is_err() {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(QueueError::Closed);
        }
        Ok(())
    }

    /// Enqueue a no-op task and return a handle signalled once it has run.
    ///
    /// If the queue is closed the handle resolves immediately with
    /// `QueueError::Closed`.
    pub fn enqueue_with_signal(&self) -> CompletionHandle {
        let (signal, receiver) = oneshot::channel();
        // On failure the task, and with it the signal sender, is dropped,
        // which resolves the handle with an error.
        let _ = self.enqueue(move || {
            let _ = signal.send(());
        });
        CompletionHandle { receiver }
    }

    /// Wait until every task enqueued before this call has run.
    pub async fn sync(&self) -> Result<(), QueueError> {
        self.enqueue_with_signal().wait().await
    }

    /// Register a subscriber for all subsequently published events.
    pub fn register(&self, subscriber: Arc<dyn ValidationSubscriber>) {
        debug!(subscriber = subscriber.name(), "Validation subscriber registered");
        self.subscribers.write().push(subscriber);
    }

    pub fn unregister_all(&self) {
        self.subscribers.write().clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Enqueue delivery of `event` to every currently registered subscriber.
    pub fn publish(&self, event: NodeEvent) -> Result<(), QueueError> {
        let subscribers = self.subscribers.read().clone();
        if subscribers.is_empty() {
            return Ok(());
        }
        self.enqueue(move || {
            for subscriber in &subscribers {
                subscriber.on_event(&event);
            }
        })
    }

    /// Number of tasks enqueued but not yet finished.
    pub fn pending_callbacks(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.read().is_none()
    }

    /// Stop accepting tasks, drain what is queued and join the consumer.
    ///
    /// Must not be called from a task running on the queue itself.
    pub fn shutdown(&self) {
        if self.sender.write().take().is_none() {
            return;
        }
        if let Some(consumer) = self.consumer.lock().take() {
            if consumer.join().is_err() {
                error!("Notification queue consumer terminated abnormally");
            }
        }
        info!("Notification queue stopped");
    }
}

impl Drop for NotificationQueue {
    fn drop(&mut self) {
        // Closing the channel lets the consumer finish the backlog and exit.
        self.sender.get_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriber::RecordingSubscriber;
    use shared_types::TxId;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    #[test]
    fn test_tasks_run_in_fifo_order() {
        let queue = NotificationQueue::start().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..50 {
            let seen = Arc::clone(&seen);
            queue.enqueue(move || seen.lock().push(i)).unwrap();
        }
        queue.enqueue_with_signal().blocking_wait().unwrap();

        assert_eq!(*seen.lock(), (0..50).collect::<Vec<_>>());

        queue.shutdown();
        assert_eq!(queue.pending_callbacks(), 0);
    }

    #[test]
    fn test_signal_fires_after_earlier_tasks() {
        let queue = NotificationQueue::start().unwrap();
        let done = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&done);
        queue
            .enqueue(move || {
                std::thread::sleep(Duration::from_millis(50));
                flag.store(true, Ordering::SeqCst);
            })
            .unwrap();

        queue.enqueue_with_signal().blocking_wait().unwrap();
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_async_wait() {
        let queue = NotificationQueue::start().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        queue
            .enqueue(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        queue.sync().await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_closed_queue_rejects_and_resolves() {
        let queue = NotificationQueue::start().unwrap();
        queue.shutdown();

        assert!(queue.is_closed());
        assert_eq!(queue.enqueue(|| {}), Err(QueueError::Closed));
        assert_eq!(
            queue.enqueue_with_signal().blocking_wait(),
            Err(QueueError::Closed)
        );
    }

    #[test]
    fn test_shutdown_drains_backlog() {
        let queue = NotificationQueue::start().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..20 {
            let c = Arc::clone(&counter);
            queue
                .enqueue(move || {
                    c.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }
        queue.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_panicking_task_does_not_stop_consumer() {
        let queue = NotificationQueue::start().unwrap();
        queue.enqueue(|| panic!("subscriber bug")).unwrap();

        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        queue.enqueue(move || flag.store(true, Ordering::SeqCst)).unwrap();

        queue.enqueue_with_signal().blocking_wait().unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_publish_reaches_subscribers_in_order() {
        let queue = NotificationQueue::start().unwrap();
        let first = Arc::new(RecordingSubscriber::new());
        let second = Arc::new(RecordingSubscriber::new());
        queue.register(first.clone());
        queue.register(second.clone());
        assert_eq!(queue.subscriber_count(), 2);

        for byte in 1..=3u8 {
            queue
                .publish(NodeEvent::TransactionRemovedFromMempool {
                    txid: TxId([byte; 32]),
                    reason: crate::events::RemovalReason::Manual,
                })
                .unwrap();
        }
        queue.enqueue_with_signal().blocking_wait().unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(first.events(), second.events());
        assert_eq!(first.events()[0].txid(), Some(TxId([1; 32])));
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let queue = NotificationQueue::start().unwrap();
        queue
            .publish(NodeEvent::BlockConnected {
                height: 1,
                txids: vec![],
            })
            .unwrap();
        assert_eq!(queue.pending_callbacks(), 0);
    }
}
