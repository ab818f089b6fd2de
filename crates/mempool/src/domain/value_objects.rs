//! Value objects for the Mempool subsystem.
//!
//! Immutable results produced by admission and submission.

use super::entities::{Amount, PoolEntry, TxId};
use shared_bus::RemovalReason;
use std::fmt;

/// Result of one pool admission attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdmissionVerdict {
    /// The transaction was inserted.
    Accepted { fee: Amount, size: usize },
    /// A consensus or policy rule rejected the transaction.
    RejectedInvalid(String),
    /// At least one input references no known unspent coin.
    RejectedMissingInputs,
    /// A collaborator failed while evaluating the transaction.
    RejectedInternalError(String),
}

impl AdmissionVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Outcome of a transaction submission.
///
/// The variant names are part of the external contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Ok,
    AlreadyConfirmed,
    MissingInputs,
    RejectedByPool,
    InternalError,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "No error"),
            Self::AlreadyConfirmed => write!(f, "Transaction already in block chain"),
            Self::MissingInputs => write!(f, "Missing inputs"),
            Self::RejectedByPool => write!(f, "Transaction rejected by mempool"),
            Self::InternalError => write!(f, "Mempool internal error"),
        }
    }
}

/// Everything a submission caller learns.
///
/// `error_detail` is empty unless the outcome is a rejection or an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitResult {
    pub txid: TxId,
    pub outcome: Outcome,
    pub error_detail: String,
    /// The transaction was already pending before this call.
    pub already_pending: bool,
    /// This call handed the transaction to the relay announcer. Delivery is
    /// up to the announcer; `InventoryRelay` drops it when no peer is
    /// connected.
    pub relayed: bool,
}

impl SubmitResult {
    pub(crate) fn new(txid: TxId, outcome: Outcome) -> Self {
        Self {
            txid,
            outcome,
            error_detail: String::new(),
            already_pending: false,
            relayed: false,
        }
    }

    pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.error_detail = detail.into();
        self
    }

    /// Human-readable message: outcome text plus detail when present.
    pub fn message(&self) -> String {
        if self.error_detail.is_empty() {
            self.outcome.to_string()
        } else {
            format!("{}: {}", self.outcome, self.error_detail)
        }
    }
}

/// An entry that left the pool and why.
#[derive(Clone, Debug)]
pub struct RemovedEntry {
    pub entry: PoolEntry,
    pub reason: RemovalReason,
}

/// Pool status snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MempoolInfo {
    /// Number of entries.
    pub size: usize,
    /// Total serialized size of all entries.
    pub bytes: usize,
    /// Sum of entry fees.
    pub total_fee: Amount,
    /// Configured byte capacity.
    pub max_bytes: usize,
    /// Configured minimum relay fee.
    pub min_relay_fee_per_kb: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_messages() {
        assert_eq!(Outcome::Ok.to_string(), "No error");
        assert_eq!(
            Outcome::AlreadyConfirmed.to_string(),
            "Transaction already in block chain"
        );
        assert!(Outcome::Ok.is_ok());
        assert!(!Outcome::MissingInputs.is_ok());
    }

    #[test]
    fn test_submit_result_message_includes_detail() {
        let txid = TxId([3; 32]);
        let plain = SubmitResult::new(txid, Outcome::MissingInputs);
        assert_eq!(plain.message(), "Missing inputs");

        let detailed =
            SubmitResult::new(txid, Outcome::RejectedByPool).with_detail("txn-mempool-conflict");
        assert_eq!(
            detailed.message(),
            "Transaction rejected by mempool: txn-mempool-conflict"
        );
    }

    #[test]
    fn test_verdict_is_accepted() {
        assert!(AdmissionVerdict::Accepted {
            fee: Amount::ZERO,
            size: 10
        }
        .is_accepted());
        assert!(!AdmissionVerdict::RejectedMissingInputs.is_accepted());
    }
}
