//! # Node Events
//!
//! Defines the events delivered to validation subscribers through the
//! notification queue.

use serde::{Deserialize, Serialize};
use shared_types::{Amount, BlockHeight, TxId};
use std::fmt;

/// Coarse grouping of events, used for logging and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Pending pool membership changes.
    Mempool,
    /// Confirmed chain changes.
    Chain,
}

/// Why a transaction left the pending pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Included in a connected block.
    Block,
    /// Spent an outpoint also spent by a confirmed transaction.
    Conflict,
    /// Removed explicitly by an operator or maintenance task.
    Manual,
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block => write!(f, "block"),
            Self::Conflict => write!(f, "conflict"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// All events that can be published to validation subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeEvent {
    // =========================================================================
    // MEMPOOL
    // =========================================================================
    /// A transaction was admitted to the pending pool.
    TransactionAddedToMempool {
        txid: TxId,
        fee: Amount,
        /// Serialized size in bytes.
        size: usize,
    },

    /// A transaction left the pending pool.
    TransactionRemovedFromMempool { txid: TxId, reason: RemovalReason },

    // =========================================================================
    // CHAIN
    // =========================================================================
    /// A block was connected to the confirmed chain.
    BlockConnected {
        height: BlockHeight,
        /// Ids of the transactions confirmed by the block.
        txids: Vec<TxId>,
    },
}

impl NodeEvent {
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::TransactionAddedToMempool { .. } | Self::TransactionRemovedFromMempool { .. } => {
                EventTopic::Mempool
            }
            Self::BlockConnected { .. } => EventTopic::Chain,
        }
    }

    /// The transaction this event is about, if any.
    pub fn txid(&self) -> Option<TxId> {
        match self {
            Self::TransactionAddedToMempool { txid, .. }
            | Self::TransactionRemovedFromMempool { txid, .. } => Some(*txid),
            Self::BlockConnected { .. } => None,
        }
    }
}
