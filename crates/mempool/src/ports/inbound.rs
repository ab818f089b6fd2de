//! # Inbound Ports - Broadcast and Query APIs
//!
//! Driving ports exposed to the RPC layer, wallets and the block connector.

use crate::domain::{Amount, MempoolInfo, SubmitResult, Transaction, TxId};
use async_trait::async_trait;
use std::sync::Arc;

/// Transaction submission.
///
/// # Example
///
/// ```rust,ignore
/// use mempool::ports::TransactionBroadcastApi;
///
/// async fn broadcast(api: &impl TransactionBroadcastApi, tx: Transaction) {
///     let result = api.submit(tx, Amount::from_sat(10_000_000), true, true).await;
///     if !result.outcome.is_ok() {
///         eprintln!("{}", result.message());
///     }
/// }
/// ```
#[async_trait]
pub trait TransactionBroadcastApi: Send + Sync {
    /// Admits `transaction` to the pending pool and, on first-time success,
    /// optionally waits for subscriber notifications and relays it.
    ///
    /// Never fails: every rejection is reported in the returned outcome.
    /// A transaction that is already pending yields `Outcome::Ok` with
    /// `already_pending` set and is never relayed again.
    async fn submit(
        &self,
        transaction: Transaction,
        max_fee: Amount,
        relay: bool,
        wait_for_sync: bool,
    ) -> SubmitResult;
}

/// Read-only pool queries.
pub trait MempoolQueryApi: Send + Sync {
    fn contains(&self, txid: &TxId) -> bool;

    fn get_transaction(&self, txid: &TxId) -> Option<Arc<Transaction>>;

    fn info(&self) -> MempoolInfo;
}
