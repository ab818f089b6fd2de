//! # Transaction Pool - Pending Transactions and Admission Policy
//!
//! ## Data Structures
//!
//! - `entries`: O(1) lookup by txid
//! - `spent_by`: which pool entry spends a given outpoint (conflict index)
//!
//! ## Invariants Enforced
//!
//! - No duplicate txids (checked in `try_admit()`)
//! - No two entries spend the same outpoint
//! - `total_bytes` equals the sum of entry sizes

use super::entities::{
    Amount, Coin, MempoolConfig, OutPoint, PoolEntry, Timestamp, Transaction, TxId,
};
use super::errors::{ChainStateError, MempoolError, VerifyError};
use super::value_objects::{AdmissionVerdict, MempoolInfo, RemovedEntry};
use crate::ports::outbound::{ConfirmedStateView, TransactionVerifier};
use shared_bus::RemovalReason;
use std::collections::{HashMap, HashSet, VecDeque};

/// Reason strings reported by admission.
pub mod reject {
    pub const COINBASE: &str = "coinbase";
    pub const TX_SIZE: &str = "tx-size";
    pub const ALREADY_IN_POOL: &str = "txn-already-in-mempool";
    pub const ALREADY_KNOWN: &str = "txn-already-known";
    pub const POOL_CONFLICT: &str = "txn-mempool-conflict";
    pub const PREMATURE_COINBASE_SPEND: &str = "bad-txns-premature-spend-of-coinbase";
    pub const INPUT_VALUES_OUT_OF_RANGE: &str = "bad-txns-inputvalues-outofrange";
    pub const IN_BELOW_OUT: &str = "bad-txns-in-belowout";
    pub const ABSURD_FEE: &str = "absurdly-high-fee";
    pub const MIN_RELAY_FEE: &str = "min relay fee not met";
    pub const POOL_FULL: &str = "mempool full";
}

/// Set of accepted, unconfirmed transactions.
///
/// The pool does not lock itself; callers serialize access through the
/// exclusive section that also guards the confirmed view.
#[derive(Debug)]
pub struct TransactionPool {
    /// Admission policy.
    config: MempoolConfig,

    /// All entries indexed by txid.
    entries: HashMap<TxId, PoolEntry>,

    /// Spending entry for each outpoint consumed by the pool.
    spent_by: HashMap<OutPoint, TxId>,

    /// Sum of entry sizes.
    total_bytes: usize,
}

impl TransactionPool {
    /// Creates a new empty pool.
    pub fn new(config: MempoolConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            spent_by: HashMap::new(),
            total_bytes: 0,
        }
    }

    /// Creates a pool with the default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MempoolConfig::default())
    }

    pub fn config(&self) -> &MempoolConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, txid: &TxId) -> bool {
        self.entries.contains_key(txid)
    }

    pub fn get(&self, txid: &TxId) -> Option<&PoolEntry> {
        self.entries.get(txid)
    }

    /// Iterates over all entries in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &PoolEntry> {
        self.entries.values()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Sum of all entry fees, saturating at `u64::MAX` base units.
    pub fn total_fees(&self) -> Amount {
        self.entries
            .values()
            .fold(Amount::ZERO, |acc, e| acc.saturating_add(e.fee))
    }

    /// The pool entry spending `outpoint`, if any.
    pub fn spender_of(&self, outpoint: &OutPoint) -> Option<TxId> {
        self.spent_by.get(outpoint).copied()
    }

    /// The coin created by a pool entry at `outpoint`, if any.
    pub fn pool_coin(&self, outpoint: &OutPoint) -> Option<Coin> {
        let entry = self.entries.get(&outpoint.txid)?;
        let output = entry.transaction.outputs.get(outpoint.index as usize)?;
        Some(Coin::in_pool(output.clone()))
    }

    /// Validates `tx` against the pool and `view`, inserting it on success.
    ///
    /// Checks run in a fixed order and the first failure decides the
    /// verdict. Nothing is modified unless the verdict is `Accepted`.
    /// A `max_fee` of zero disables the absurd-fee check.
    pub fn try_admit<V>(
        &mut self,
        tx: Transaction,
        max_fee: Amount,
        view: &V,
        verifier: &dyn TransactionVerifier,
        now: Timestamp,
    ) -> AdmissionVerdict
    where
        V: ConfirmedStateView + ?Sized,
    {
        if let Err(e) = tx.check_structure() {
            return AdmissionVerdict::RejectedInvalid(e.to_string());
        }
        if tx.is_coinbase() {
            return invalid(reject::COINBASE);
        }

        let size = tx.serialized_size();
        if size > self.config.max_tx_size {
            return invalid(reject::TX_SIZE);
        }

        let txid = tx.txid();
        if self.contains(&txid) {
            return invalid(reject::ALREADY_IN_POOL);
        }
        for index in 0..tx.outputs.len() as u32 {
            match view.lookup(&OutPoint::new(txid, index)) {
                Ok(Some(_)) => return invalid(reject::ALREADY_KNOWN),
                Ok(None) => {}
                Err(e) => return internal(e),
            }
        }

        if tx
            .inputs
            .iter()
            .any(|input| self.spent_by.contains_key(&input.prevout))
        {
            return invalid(reject::POOL_CONFLICT);
        }

        let spent_coins = match self.resolve_inputs(&tx, view) {
            Ok(Some(coins)) => coins,
            Ok(None) => return AdmissionVerdict::RejectedMissingInputs,
            Err(e) => return internal(e),
        };

        let spend_height = view.tip_height() + 1;
        let immature = spent_coins.iter().any(|coin| {
            coin.is_coinbase
                && coin
                    .height()
                    .is_some_and(|h| spend_height.saturating_sub(h) < self.config.coinbase_maturity)
        });
        if immature {
            return invalid(reject::PREMATURE_COINBASE_SPEND);
        }

        let fee = match self.compute_fee(&tx, &spent_coins, size, max_fee) {
            Ok(fee) => fee,
            Err(reason) => return invalid(reason),
        };

        if self.entries.len() >= self.config.max_transactions
            || self.total_bytes + size > self.config.max_pool_bytes
        {
            return invalid(reject::POOL_FULL);
        }

        match verifier.verify(&tx, &spent_coins) {
            Ok(()) => {}
            Err(VerifyError::Invalid(reason)) => return AdmissionVerdict::RejectedInvalid(reason),
            Err(VerifyError::Internal(reason)) => {
                return AdmissionVerdict::RejectedInternalError(reason)
            }
        }

        for input in &tx.inputs {
            self.spent_by.insert(input.prevout, txid);
        }
        self.total_bytes += size;
        self.entries
            .insert(txid, PoolEntry::new(tx, txid, fee, size, now));

        AdmissionVerdict::Accepted { fee, size }
    }

    /// Resolves every input to an unspent coin.
    ///
    /// Returns `Ok(None)` as soon as one input cannot be resolved.
    fn resolve_inputs<V>(
        &self,
        tx: &Transaction,
        view: &V,
    ) -> Result<Option<Vec<Coin>>, ChainStateError>
    where
        V: ConfirmedStateView + ?Sized,
    {
        let mut coins = Vec::with_capacity(tx.inputs.len());
        for input in &tx.inputs {
            // Parent still pending: only the pool can supply the coin.
            if self.entries.contains_key(&input.prevout.txid) {
                match self.pool_coin(&input.prevout) {
                    Some(coin) => coins.push(coin),
                    None => return Ok(None),
                }
                continue;
            }
            match view.lookup(&input.prevout)? {
                Some(coin) if !coin.is_spent() => coins.push(coin),
                _ => return Ok(None),
            }
        }
        Ok(Some(coins))
    }

    fn compute_fee(
        &self,
        tx: &Transaction,
        spent_coins: &[Coin],
        size: usize,
        max_fee: Amount,
    ) -> Result<Amount, &'static str> {
        let value_in = spent_coins
            .iter()
            .try_fold(Amount::ZERO, |acc, coin| acc.checked_add(coin.value()))
            .filter(|total| total.is_money_range())
            .ok_or(reject::INPUT_VALUES_OUT_OF_RANGE)?;
        // Structure checks bound the output total.
        let value_out = tx.total_output().unwrap_or(Amount::ZERO);

        let fee = value_in
            .checked_sub(value_out)
            .ok_or(reject::IN_BELOW_OUT)?;

        if max_fee > Amount::ZERO && fee > max_fee {
            return Err(reject::ABSURD_FEE);
        }

        let min_fee = self
            .config
            .min_relay_fee_per_kb
            .to_sat()
            .saturating_mul(size as u64)
            / 1000;
        if fee.to_sat() < min_fee {
            return Err(reject::MIN_RELAY_FEE);
        }

        Ok(fee)
    }

    /// Removes `txid` and every pool entry descending from it.
    ///
    /// # Errors
    /// `TransactionNotFound` if `txid` is not in the pool.
    pub fn remove_recursive(
        &mut self,
        txid: &TxId,
        reason: RemovalReason,
    ) -> Result<Vec<RemovedEntry>, MempoolError> {
        if !self.contains(txid) {
            return Err(MempoolError::TransactionNotFound(*txid));
        }

        let mut removed = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([*txid]);

        while let Some(next) = queue.pop_front() {
            if !visited.insert(next) {
                continue;
            }
            let Some(entry) = self.remove_entry(&next) else {
                continue;
            };
            for index in 0..entry.transaction.outputs.len() as u32 {
                if let Some(child) = self.spender_of(&OutPoint::new(next, index)) {
                    queue.push_back(child);
                }
            }
            removed.push(RemovedEntry { entry, reason });
        }

        Ok(removed)
    }

    /// Removes entries confirmed by a block and every entry conflicting
    /// with the block's spends.
    ///
    /// Descendants of confirmed entries stay: their inputs are now
    /// confirmed coins.
    pub fn remove_for_block(&mut self, transactions: &[Transaction]) -> Vec<RemovedEntry> {
        let mut removed = Vec::new();

        for tx in transactions {
            let txid = tx.txid();
            if let Some(entry) = self.remove_entry(&txid) {
                removed.push(RemovedEntry {
                    entry,
                    reason: RemovalReason::Block,
                });
            }

            for input in &tx.inputs {
                let Some(conflict) = self.spender_of(&input.prevout) else {
                    continue;
                };
                if let Ok(mut gone) = self.remove_recursive(&conflict, RemovalReason::Conflict) {
                    removed.append(&mut gone);
                }
            }
        }

        removed
    }

    /// Removes one entry and its spend index without touching descendants.
    fn remove_entry(&mut self, txid: &TxId) -> Option<PoolEntry> {
        let entry = self.entries.remove(txid)?;
        for outpoint in entry.spent_outpoints() {
            if self.spent_by.get(&outpoint) == Some(txid) {
                self.spent_by.remove(&outpoint);
            }
        }
        self.total_bytes -= entry.size;
        Some(entry)
    }

    /// Status snapshot.
    pub fn info(&self) -> MempoolInfo {
        MempoolInfo {
            size: self.len(),
            bytes: self.total_bytes,
            total_fee: self.total_fees(),
            max_bytes: self.config.max_pool_bytes,
            min_relay_fee_per_kb: self.config.min_relay_fee_per_kb,
        }
    }
}

fn invalid(reason: &str) -> AdmissionVerdict {
    AdmissionVerdict::RejectedInvalid(reason.to_string())
}

fn internal(error: ChainStateError) -> AdmissionVerdict {
    AdmissionVerdict::RejectedInternalError(error.to_string())
}
