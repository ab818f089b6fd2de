//! In-memory confirmed coin set.
//!
//! Spent coins are kept as tombstones so that a transaction whose outputs
//! have all been spent is still recognized as confirmed. `prune_spent`
//! drops them, after which such a transaction can no longer be told apart
//! from an unknown one.

use crate::domain::{BlockHeight, ChainStateError, Coin, OutPoint, Transaction};
use crate::ports::outbound::{ConfirmedStateView, ConfirmedStateWriter};
use std::collections::HashMap;
use tracing::debug;

/// Confirmed coin set held in a hash map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCoinsView {
    coins: HashMap<OutPoint, Coin>,
    tip: BlockHeight,
}

impl InMemoryCoinsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `coin` at `outpoint`, replacing any previous record.
    pub fn add_coin(&mut self, outpoint: OutPoint, coin: Coin) {
        self.coins.insert(outpoint, coin);
    }

    /// Records every output of `tx` as confirmed at `height`.
    pub fn add_transaction_outputs(&mut self, tx: &Transaction, height: BlockHeight) {
        let txid = tx.txid();
        let is_coinbase = tx.is_coinbase();
        for (index, output) in tx.outputs.iter().enumerate() {
            self.coins.insert(
                OutPoint::new(txid, index as u32),
                Coin::confirmed(output.clone(), height, is_coinbase),
            );
        }
    }

    /// Marks the coin at `outpoint` spent and returns it.
    ///
    /// # Errors
    /// `MissingCoin` if the coin is unknown or already spent.
    pub fn spend(&mut self, outpoint: &OutPoint) -> Result<Coin, ChainStateError> {
        match self.coins.get_mut(outpoint) {
            Some(coin) if !coin.is_spent() => {
                coin.mark_spent();
                Ok(coin.clone())
            }
            _ => Err(ChainStateError::MissingCoin(*outpoint)),
        }
    }

    pub fn set_tip(&mut self, height: BlockHeight) {
        self.tip = height;
    }

    /// Number of recorded coins, tombstones included.
    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn unspent_count(&self) -> usize {
        self.coins.values().filter(|c| !c.is_spent()).count()
    }

    /// Drops spent tombstones; returns how many were removed.
    pub fn prune_spent(&mut self) -> usize {
        let before = self.coins.len();
        self.coins.retain(|_, coin| !coin.is_spent());
        let pruned = before - self.coins.len();
        debug!(pruned, "Pruned spent coins");
        pruned
    }
}

impl ConfirmedStateView for InMemoryCoinsView {
    fn lookup(&self, outpoint: &OutPoint) -> Result<Option<Coin>, ChainStateError> {
        Ok(self.coins.get(outpoint).cloned())
    }

    fn tip_height(&self) -> BlockHeight {
        self.tip
    }
}

impl ConfirmedStateWriter for InMemoryCoinsView {
    fn apply_block(
        &mut self,
        transactions: &[Transaction],
        height: BlockHeight,
    ) -> Result<(), ChainStateError> {
        // Stage every change first so a bad spend leaves the set untouched.
        let mut staged: HashMap<OutPoint, Coin> = HashMap::new();

        for tx in transactions {
            if !tx.is_coinbase() {
                for input in &tx.inputs {
                    let current = staged
                        .get(&input.prevout)
                        .or_else(|| self.coins.get(&input.prevout))
                        .cloned();
                    match current {
                        Some(mut coin) if !coin.is_spent() => {
                            coin.mark_spent();
                            staged.insert(input.prevout, coin);
                        }
                        _ => return Err(ChainStateError::MissingCoin(input.prevout)),
                    }
                }
            }

            let txid = tx.txid();
            let is_coinbase = tx.is_coinbase();
            for (index, output) in tx.outputs.iter().enumerate() {
                staged.insert(
                    OutPoint::new(txid, index as u32),
                    Coin::confirmed(output.clone(), height, is_coinbase),
                );
            }
        }

        let changed = staged.len();
        self.coins.extend(staged);
        self.tip = height;
        debug!(height, changed, "Applied block to coin view");
        Ok(())
    }
}
