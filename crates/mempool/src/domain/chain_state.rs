//! # Chain State - Confirmed View and Pending Pool Under One Lock
//!
//! Everything the admission path reads and writes lives in this struct so a
//! single exclusive section covers the confirmed-membership check, the
//! pool-membership check and the insertion.

use super::entities::{Amount, BlockHeight, MempoolConfig, OutPoint, Timestamp, Transaction, TxId};
use super::errors::ChainStateError;
use super::pool::TransactionPool;
use super::value_objects::{AdmissionVerdict, RemovedEntry};
use crate::ports::outbound::{ConfirmedStateView, ConfirmedStateWriter, TransactionVerifier};
use std::sync::Arc;

/// Confirmed view plus pending pool.
pub struct ChainState<V> {
    coins: V,
    pool: TransactionPool,
    verifier: Arc<dyn TransactionVerifier>,
}

impl<V: ConfirmedStateView> ChainState<V> {
    pub fn new(coins: V, config: MempoolConfig, verifier: Arc<dyn TransactionVerifier>) -> Self {
        Self {
            coins,
            pool: TransactionPool::new(config),
            verifier,
        }
    }

    pub fn coins(&self) -> &V {
        &self.coins
    }

    pub fn coins_mut(&mut self) -> &mut V {
        &mut self.coins
    }

    pub fn pool(&self) -> &TransactionPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut TransactionPool {
        &mut self.pool
    }

    /// Returns true if any of the first `output_count` outputs of `txid` is
    /// recorded in the confirmed view, spent or not.
    ///
    /// Only outputs are consulted; inputs never make a transaction
    /// "confirmed".
    pub fn has_confirmed_output(
        &self,
        txid: TxId,
        output_count: usize,
    ) -> Result<bool, ChainStateError> {
        for index in 0..output_count as u32 {
            if self.coins.lookup(&OutPoint::new(txid, index))?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Runs pool admission against this state's view and verifier.
    pub fn try_admit(
        &mut self,
        tx: Transaction,
        max_fee: Amount,
        now: Timestamp,
    ) -> AdmissionVerdict {
        self.pool
            .try_admit(tx, max_fee, &self.coins, self.verifier.as_ref(), now)
    }
}

impl<V: ConfirmedStateWriter> ChainState<V> {
    /// Applies a confirmed block and evicts what it confirms or conflicts
    /// with from the pool.
    ///
    /// The pool is untouched if the view rejects the block.
    pub fn connect_block(
        &mut self,
        transactions: &[Transaction],
        height: BlockHeight,
    ) -> Result<Vec<RemovedEntry>, ChainStateError> {
        self.coins.apply_block(transactions, height)?;
        Ok(self.pool.remove_for_block(transactions))
    }
}
