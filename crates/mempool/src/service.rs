//! # Transaction Submitter
//!
//! Orchestrates one submission across the shared resources.
//!
//! ## Flow
//!
//! ```text
//! submit(tx)
//!   ├─ lock chain state ─────────────────────────────────────┐
//!   │    confirmed output recorded?  → AlreadyConfirmed      │ exclusive
//!   │    already pending?            → Ok (no relay)         │ section
//!   │    pool.try_admit()            → verdict               │
//!   │    accepted: publish event, enqueue completion signal  │
//!   ├─ unlock ───────────────────────────────────────────────┘
//!   ├─ wait for completion signal (opt-in)
//!   └─ announce to peers (first-time Ok only)
//! ```
//!
//! ## Thread Safety
//!
//! The submitter is shared across tasks via `Arc`. The only lock it takes is
//! the chain state mutex, and never across an `.await`.

use crate::domain::{
    AdmissionVerdict, Amount, BlockHeight, ChainState, ChainStateError, MempoolError,
    MempoolInfo, Outcome, RemovedEntry, SubmitResult, SubmitterConfig, Transaction, TxId,
};
use crate::ports::inbound::{MempoolQueryApi, TransactionBroadcastApi};
use crate::ports::outbound::{ConfirmedStateView, ConfirmedStateWriter, RelayAnnouncer, TimeSource};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{CompletionHandle, NodeEvent, NotificationQueue, RemovalReason};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Admission and relay orchestrator.
///
/// ## Dependencies
///
/// - `V: ConfirmedStateView` - confirmed coin set, owned by the shared state
/// - `R: RelayAnnouncer` - peer announcements
pub struct TransactionSubmitter<V, R>
where
    V: ConfirmedStateView,
    R: RelayAnnouncer,
{
    config: SubmitterConfig,
    /// Confirmed view and pool behind the exclusive section.
    state: Arc<Mutex<ChainState<V>>>,
    /// Subscriber notification queue.
    queue: Arc<NotificationQueue>,
    relay: Arc<R>,
    time_source: Arc<dyn TimeSource>,
}

impl<V, R> TransactionSubmitter<V, R>
where
    V: ConfirmedStateView,
    R: RelayAnnouncer,
{
    pub fn new(
        config: SubmitterConfig,
        state: Arc<Mutex<ChainState<V>>>,
        queue: Arc<NotificationQueue>,
        relay: Arc<R>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            state,
            queue,
            relay,
            time_source,
        }
    }

    pub fn config(&self) -> &SubmitterConfig {
        &self.config
    }

    /// Shared handle to the chain state.
    pub fn state(&self) -> Arc<Mutex<ChainState<V>>> {
        Arc::clone(&self.state)
    }

    pub fn queue(&self) -> &Arc<NotificationQueue> {
        &self.queue
    }

    /// Submits `transaction` for admission.
    ///
    /// Rejections are reported in the result, never as errors. With
    /// `wait_for_sync`, a first-time acceptance returns only after every
    /// subscriber notification queued for it has run (or the configured
    /// timeout elapsed). With `relay`, a first-time acceptance is announced
    /// to peers.
    pub async fn submit(
        &self,
        transaction: Transaction,
        max_fee: Amount,
        relay: bool,
        wait_for_sync: bool,
    ) -> SubmitResult {
        let txid = transaction.txid();
        let (mut result, signal) = self.admit(transaction, txid, max_fee, wait_for_sync);

        if let Some(signal) = signal {
            self.wait_for_sync(txid, signal).await;
        }

        if relay && result.outcome.is_ok() && !result.already_pending {
            self.relay.announce(txid);
            result.relayed = true;
        }

        result
    }

    /// Submits with the configured fee cap, relaying and waiting for sync.
    pub async fn submit_with_defaults(&self, transaction: Transaction) -> SubmitResult {
        self.submit(transaction, self.config.default_max_fee, true, true)
            .await
    }

    /// The exclusive section: decide and, on acceptance, insert.
    fn admit(
        &self,
        transaction: Transaction,
        txid: TxId,
        max_fee: Amount,
        wait_for_sync: bool,
    ) -> (SubmitResult, Option<CompletionHandle>) {
        let mut state = self.state.lock();

        match state.has_confirmed_output(txid, transaction.outputs.len()) {
            Ok(false) => {}
            Ok(true) => {
                debug!(txid = %txid, "Transaction already confirmed");
                return (SubmitResult::new(txid, Outcome::AlreadyConfirmed), None);
            }
            Err(e) => {
                error!(txid = %txid, error = %e, "Confirmed state lookup failed");
                let result = SubmitResult::new(txid, Outcome::InternalError).with_detail(e.to_string());
                return (result, None);
            }
        }

        if state.pool().contains(&txid) {
            debug!(txid = %txid, "Transaction already pending");
            let mut result = SubmitResult::new(txid, Outcome::Ok);
            result.already_pending = true;
            return (result, None);
        }

        match state.try_admit(transaction, max_fee, self.time_source.now()) {
            AdmissionVerdict::Accepted { fee, size } => {
                info!(txid = %txid, fee = %fee, size, "Transaction accepted to mempool");
                self.notify(NodeEvent::TransactionAddedToMempool { txid, fee, size });
                // Queued after the event above, so it fires once subscribers saw it.
                let signal = wait_for_sync.then(|| self.queue.enqueue_with_signal());
                (SubmitResult::new(txid, Outcome::Ok), signal)
            }
            AdmissionVerdict::RejectedMissingInputs => {
                debug!(txid = %txid, "Transaction rejected: missing inputs");
                (SubmitResult::new(txid, Outcome::MissingInputs), None)
            }
            AdmissionVerdict::RejectedInvalid(reason) => {
                debug!(txid = %txid, reason = %reason, "Transaction rejected by mempool");
                let result = SubmitResult::new(txid, Outcome::RejectedByPool).with_detail(reason);
                (result, None)
            }
            AdmissionVerdict::RejectedInternalError(reason) => {
                error!(txid = %txid, reason = %reason, "Mempool internal error");
                let result = SubmitResult::new(txid, Outcome::InternalError).with_detail(reason);
                (result, None)
            }
        }
    }

    /// Waits for the completion signal. A timeout or a closed queue is
    /// logged and does not change the outcome.
    async fn wait_for_sync(&self, txid: TxId, signal: CompletionHandle) {
        let waited = match self.config.sync_timeout {
            None => signal.wait().await,
            Some(limit) => match tokio::time::timeout(limit, signal.wait()).await {
                Ok(waited) => waited,
                Err(_) => {
                    warn!(
                        txid = %txid,
                        timeout_ms = limit.as_millis() as u64,
                        "Timed out waiting for subscriber notifications"
                    );
                    return;
                }
            },
        };

        if let Err(e) = waited {
            warn!(txid = %txid, error = %e, "Subscriber notifications not confirmed");
        }
    }

    /// Removes `txid` and its in-pool descendants.
    pub fn remove_transaction(&self, txid: &TxId) -> Result<Vec<TxId>, MempoolError> {
        let mut state = self.state.lock();
        let removed = state
            .pool_mut()
            .remove_recursive(txid, RemovalReason::Manual)?;
        self.notify_removed(&removed);
        Ok(removed.iter().map(|r| r.entry.txid).collect())
    }

    fn notify_removed(&self, removed: &[RemovedEntry]) {
        for gone in removed {
            self.notify(NodeEvent::TransactionRemovedFromMempool {
                txid: gone.entry.txid,
                reason: gone.reason,
            });
        }
    }

    fn notify(&self, event: NodeEvent) {
        if let Err(e) = self.queue.publish(event) {
            warn!(error = %e, "Failed to queue subscriber notification");
        }
    }
}

impl<V, R> TransactionSubmitter<V, R>
where
    V: ConfirmedStateWriter,
    R: RelayAnnouncer,
{
    /// Connects a confirmed block under the exclusive section.
    ///
    /// Subscribers see one removal event per evicted entry, then the block.
    pub fn connect_block(
        &self,
        transactions: &[Transaction],
        height: BlockHeight,
    ) -> Result<Vec<RemovedEntry>, ChainStateError> {
        let mut state = self.state.lock();
        let removed = state.connect_block(transactions, height)?;

        self.notify_removed(&removed);
        self.notify(NodeEvent::BlockConnected {
            height,
            txids: transactions.iter().map(Transaction::txid).collect(),
        });

        info!(
            height,
            confirmed = transactions.len(),
            evicted = removed.len(),
            "Block connected"
        );
        Ok(removed)
    }
}

#[async_trait]
impl<V, R> TransactionBroadcastApi for TransactionSubmitter<V, R>
where
    V: ConfirmedStateView,
    R: RelayAnnouncer,
{
    async fn submit(
        &self,
        transaction: Transaction,
        max_fee: Amount,
        relay: bool,
        wait_for_sync: bool,
    ) -> SubmitResult {
        TransactionSubmitter::submit(self, transaction, max_fee, relay, wait_for_sync).await
    }
}

impl<V, R> MempoolQueryApi for TransactionSubmitter<V, R>
where
    V: ConfirmedStateView,
    R: RelayAnnouncer,
{
    fn contains(&self, txid: &TxId) -> bool {
        self.state.lock().pool().contains(txid)
    }

    fn get_transaction(&self, txid: &TxId) -> Option<Arc<Transaction>> {
        self.state
            .lock()
            .pool()
            .get(txid)
            .map(|entry| Arc::clone(&entry.transaction))
    }

    fn info(&self) -> MempoolInfo {
        self.state.lock().pool().info()
    }
}
