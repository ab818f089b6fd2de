//! Core domain entities for the Mempool subsystem.
//!
//! Defines the pool entry and the admission policy configuration.

use std::sync::Arc;
use std::time::Duration;

// Re-export from shared-types for convenience
pub use shared_types::{
    Amount, BlockHeight, Coin, OutPoint, Transaction, TxId, TxIn, TxOut, COIN,
};

/// Timestamp in milliseconds since UNIX epoch.
pub type Timestamp = u64;

/// A transaction in the pending pool with admission-time metadata.
///
/// INVARIANT: `txid == transaction.txid()`; no two entries share a `txid`.
#[derive(Clone, Debug)]
pub struct PoolEntry {
    /// The admitted transaction, owned by the pool from now on.
    pub transaction: Arc<Transaction>,
    /// Transaction id (pool key).
    pub txid: TxId,
    /// Sum of inputs minus sum of outputs.
    pub fee: Amount,
    /// Serialized size in bytes.
    pub size: usize,
    /// Timestamp when admitted (ms).
    pub added_at: Timestamp,
}

impl PoolEntry {
    pub fn new(transaction: Transaction, txid: TxId, fee: Amount, size: usize, added_at: Timestamp) -> Self {
        Self {
            transaction: Arc::new(transaction),
            txid,
            fee,
            size,
            added_at,
        }
    }

    /// Fee rate in base units per 1000 bytes.
    pub fn fee_per_kb(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.fee.to_sat().saturating_mul(1000) / self.size as u64
    }

    /// Outpoints spent by this entry.
    pub fn spent_outpoints(&self) -> impl Iterator<Item = OutPoint> + '_ {
        self.transaction.inputs.iter().map(|input| input.prevout)
    }
}

/// Mempool admission policy.
///
/// Fee-priority ordering and eviction are policy concerns outside the pool;
/// a full pool rejects new transactions.
#[derive(Clone, Debug)]
pub struct MempoolConfig {
    /// Maximum number of entries.
    pub max_transactions: usize,
    /// Maximum total serialized size of all entries.
    pub max_pool_bytes: usize,
    /// Maximum serialized size of one transaction.
    pub max_tx_size: usize,
    /// Minimum fee per 1000 bytes for admission.
    pub min_relay_fee_per_kb: Amount,
    /// Confirmations required before a coinbase output may be spent.
    pub coinbase_maturity: u64,
}

impl Default for MempoolConfig {
    fn default() -> Self {
        Self {
            max_transactions: 100_000,
            max_pool_bytes: 300 * 1024 * 1024, // 300 MB
            max_tx_size: 100_000,
            min_relay_fee_per_kb: Amount::from_sat(1000),
            coinbase_maturity: 100,
        }
    }
}

impl MempoolConfig {
    /// Creates a small, fee-free config for testing.
    pub fn for_testing() -> Self {
        Self {
            max_transactions: 100,
            max_pool_bytes: 1024 * 1024,
            min_relay_fee_per_kb: Amount::ZERO,
            coinbase_maturity: 10,
            ..Default::default()
        }
    }
}

/// Submission defaults.
#[derive(Clone, Debug)]
pub struct SubmitterConfig {
    /// Fee cap used by `submit_with_defaults`. Zero disables the cap.
    pub default_max_fee: Amount,
    /// Upper bound on the wait for subscriber notifications. `None` waits
    /// until the queue has run the completion task.
    pub sync_timeout: Option<Duration>,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            default_max_fee: Amount::from_sat(COIN / 10),
            sync_timeout: None,
        }
    }
}

impl SubmitterConfig {
    /// Creates a config with a short sync timeout for testing.
    pub fn for_testing() -> Self {
        Self {
            sync_timeout: Some(Duration::from_secs(5)),
            ..Default::default()
        }
    }
}
