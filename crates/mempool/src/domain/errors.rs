//! Mempool error types.
//!
//! Admission results are values (`AdmissionVerdict`), not errors. These
//! errors cover pool maintenance and collaborator failures.

use super::entities::{OutPoint, TxId};
use thiserror::Error;

/// Pool maintenance error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MempoolError {
    /// Transaction not found in the pool.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TxId),
}

/// Failure of the confirmed-state collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChainStateError {
    /// The backing store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A block spends a coin the view does not hold.
    #[error("Missing or spent coin {0}")]
    MissingCoin(OutPoint),
}

/// Verdict of the external script/consensus verifier when it refuses a
/// transaction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The transaction violates a consensus or policy rule.
    #[error("{0}")]
    Invalid(String),

    /// The verifier itself failed.
    #[error("verifier failure: {0}")]
    Internal(String),
}
