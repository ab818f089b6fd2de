//! # Core Domain Entities
//!
//! Defines the UTXO transaction model shared by every crate in the node.
//!
//! ## Clusters
//!
//! - **Value**: `Amount`, money-range constants
//! - **Identity**: `TxId`, `OutPoint`
//! - **Transaction**: `TxIn`, `TxOut`, `Transaction`
//! - **State**: `Coin`, `CoinOrigin`

use crate::errors::{TransactionCheckError, TxIdParseError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A 32-byte hash (double SHA-256).
pub type Hash = [u8; 32];

/// Height of a block in the confirmed chain.
pub type BlockHeight = u64;

/// Number of base units in one coin.
pub const COIN: u64 = 100_000_000;

/// Upper bound for any single amount or sum of amounts.
pub const MAX_MONEY: Amount = Amount(21_000_000 * COIN);

// =============================================================================
// CLUSTER A: VALUE
// =============================================================================

/// A non-negative amount of base units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(u64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Creates an amount from base units.
    pub const fn from_sat(sat: u64) -> Self {
        Self(sat)
    }

    /// Returns the amount in base units.
    pub const fn to_sat(self) -> u64 {
        self.0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Adds, clamping at the largest representable amount.
    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    /// Returns true if the amount does not exceed `MAX_MONEY`.
    pub fn is_money_range(self) -> bool {
        self <= MAX_MONEY
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:08}", self.0 / COIN, self.0 % COIN)
    }
}

// =============================================================================
// CLUSTER B: IDENTITY
// =============================================================================

/// Content hash identifying a transaction.
///
/// Displayed as byte-reversed hex, the convention used by block explorers
/// and RPC clients.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxId(pub Hash);

impl TxId {
    pub const fn from_bytes(bytes: Hash) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Returns true for the all-zero id used by null outpoints.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Byte-reversed hex representation.
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", &self.to_hex()[..16])
    }
}

impl FromStr for TxId {
    type Err = TxIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| TxIdParseError::InvalidHex(e.to_string()))?;
        let mut hash: Hash = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TxIdParseError::InvalidLength(bytes.len()))?;
        hash.reverse();
        Ok(Self(hash))
    }
}

/// Reference to one output of a prior transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: TxId,
    pub index: u32,
}

impl OutPoint {
    pub const fn new(txid: TxId, index: u32) -> Self {
        Self { txid, index }
    }

    /// The outpoint spent by a coinbase input.
    pub const fn null() -> Self {
        Self {
            txid: TxId([0u8; 32]),
            index: u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.txid.is_zero() && self.index == u32::MAX
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

// =============================================================================
// CLUSTER C: TRANSACTION
// =============================================================================

/// A transaction input spending a prior output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    /// The output being spent.
    pub prevout: OutPoint,
    /// Unlocking data satisfying the spent output's condition.
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

impl TxIn {
    pub fn new(prevout: OutPoint) -> Self {
        Self {
            prevout,
            script_sig: Vec::new(),
            sequence: u32::MAX,
        }
    }
}

/// A transaction output: a value locked by a spending condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    pub value: Amount,
    /// Spending condition (locking script).
    pub script_pubkey: Vec<u8>,
}

impl TxOut {
    pub fn new(value: Amount, script_pubkey: Vec<u8>) -> Self {
        Self {
            value,
            script_pubkey,
        }
    }
}

/// An immutable UTXO transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    /// Creates a version-1 transaction with no lock time.
    pub fn new(inputs: Vec<TxIn>, outputs: Vec<TxOut>) -> Self {
        Self {
            version: 1,
            inputs,
            outputs,
            lock_time: 0,
        }
    }

    /// Canonical byte encoding used for hashing and size accounting.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16 + self.inputs.len() * 48 + self.outputs.len() * 40);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            buf.extend_from_slice(input.prevout.txid.as_bytes());
            buf.extend_from_slice(&input.prevout.index.to_le_bytes());
            buf.extend_from_slice(&(input.script_sig.len() as u32).to_le_bytes());
            buf.extend_from_slice(&input.script_sig);
            buf.extend_from_slice(&input.sequence.to_le_bytes());
        }
        buf.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            buf.extend_from_slice(&output.value.to_sat().to_le_bytes());
            buf.extend_from_slice(&(output.script_pubkey.len() as u32).to_le_bytes());
            buf.extend_from_slice(&output.script_pubkey);
        }
        buf.extend_from_slice(&self.lock_time.to_le_bytes());
        buf
    }

    /// Compute the transaction id (double SHA-256 of the canonical encoding).
    pub fn txid(&self) -> TxId {
        let first = Sha256::digest(self.encode());
        TxId(Sha256::digest(first).into())
    }

    /// Size of the canonical encoding in bytes.
    pub fn serialized_size(&self) -> usize {
        self.encode().len()
    }

    /// A coinbase has exactly one input spending the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].prevout.is_null()
    }

    /// Sum of all output values, `None` on overflow.
    pub fn total_output(&self) -> Option<Amount> {
        self.outputs
            .iter()
            .try_fold(Amount::ZERO, |acc, out| acc.checked_add(out.value))
    }

    /// Context-free structural checks.
    ///
    /// Does not look at any chain or pool state.
    pub fn check_structure(&self) -> Result<(), TransactionCheckError> {
        if self.inputs.is_empty() {
            return Err(TransactionCheckError::NoInputs);
        }
        if self.outputs.is_empty() {
            return Err(TransactionCheckError::NoOutputs);
        }

        let mut total = Amount::ZERO;
        for output in &self.outputs {
            if !output.value.is_money_range() {
                return Err(TransactionCheckError::OutputTooLarge(output.value));
            }
            total = total
                .checked_add(output.value)
                .filter(|t| t.is_money_range())
                .ok_or(TransactionCheckError::TotalOutputTooLarge)?;
        }

        let mut seen = HashSet::with_capacity(self.inputs.len());
        for input in &self.inputs {
            if !seen.insert(input.prevout) {
                return Err(TransactionCheckError::DuplicateInputs(input.prevout));
            }
        }

        if !self.is_coinbase() && self.inputs.iter().any(|i| i.prevout.is_null()) {
            return Err(TransactionCheckError::NullPrevout);
        }

        Ok(())
    }
}

// =============================================================================
// CLUSTER D: STATE
// =============================================================================

/// Where a coin was materialized from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoinOrigin {
    /// Created by a transaction confirmed at `height`.
    Confirmed { height: BlockHeight },
    /// Created by a transaction still in the pending pool.
    Mempool,
}

/// The materialized state of one transaction output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub output: TxOut,
    pub origin: CoinOrigin,
    pub is_coinbase: bool,
    pub spent: bool,
}

impl Coin {
    /// An unspent coin confirmed at `height`.
    pub fn confirmed(output: TxOut, height: BlockHeight, is_coinbase: bool) -> Self {
        Self {
            output,
            origin: CoinOrigin::Confirmed { height },
            is_coinbase,
            spent: false,
        }
    }

    /// An unspent coin created by a pending transaction.
    pub fn in_pool(output: TxOut) -> Self {
        Self {
            output,
            origin: CoinOrigin::Mempool,
            is_coinbase: false,
            spent: false,
        }
    }

    pub fn value(&self) -> Amount {
        self.output.value
    }

    pub fn is_spent(&self) -> bool {
        self.spent
    }

    pub fn mark_spent(&mut self) {
        self.spent = true;
    }

    /// Confirmation height, `None` for pool coins.
    pub fn height(&self) -> Option<BlockHeight> {
        match self.origin {
            CoinOrigin::Confirmed { height } => Some(height),
            CoinOrigin::Mempool => None,
        }
    }
}
