//! # Error Types
//!
//! Errors produced by context-free transaction checks and id parsing.
//! The `Display` strings of `TransactionCheckError` are the canonical
//! rejection reasons surfaced to callers.

use crate::entities::{Amount, OutPoint};
use thiserror::Error;

/// Structural defects detectable without any chain or pool state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionCheckError {
    #[error("bad-txns-vin-empty")]
    NoInputs,

    #[error("bad-txns-vout-empty")]
    NoOutputs,

    /// A single output above the money range.
    #[error("bad-txns-vout-toolarge ({0})")]
    OutputTooLarge(Amount),

    #[error("bad-txns-txouttotal-toolarge")]
    TotalOutputTooLarge,

    /// The same outpoint is spent twice within one transaction.
    #[error("bad-txns-inputs-duplicate ({0})")]
    DuplicateInputs(OutPoint),

    #[error("bad-txns-prevout-null")]
    NullPrevout,
}

/// Errors parsing a transaction id from its hex form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxIdParseError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("txid must be 32 bytes, got {0}")]
    InvalidLength(usize),
}
