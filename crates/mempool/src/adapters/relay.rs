//! Relay adapters.
//!
//! `InventoryRelay` queues transaction announcements per connected peer for
//! the wire layer to drain; `NoOpRelay` drops them.

use crate::domain::TxId;
use crate::ports::outbound::RelayAnnouncer;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

/// Identifier of a connected peer.
pub type PeerId = u64;

#[derive(Debug, Default)]
struct PeerInventory {
    /// Ids waiting to be sent, in announcement order.
    queued: Vec<TxId>,
    /// Ids already queued, sent, or announced to us by the peer.
    known: HashSet<TxId>,
}

/// Per-peer inventory announcement queues.
#[derive(Debug, Default)]
pub struct InventoryRelay {
    peers: Mutex<HashMap<PeerId, PeerInventory>>,
}

impl InventoryRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `peer`. Reconnecting an existing peer is a no-op.
    pub fn connect_peer(&self, peer: PeerId) {
        self.peers.lock().entry(peer).or_default();
        debug!(peer, "Peer connected for relay");
    }

    /// Stops tracking `peer`, discarding its queue.
    pub fn disconnect_peer(&self, peer: PeerId) -> bool {
        let removed = self.peers.lock().remove(&peer).is_some();
        if removed {
            debug!(peer, "Peer disconnected from relay");
        }
        removed
    }

    pub fn peer_count(&self) -> usize {
        self.peers.lock().len()
    }

    /// Records that `peer` already has `txid`, so it is never announced
    /// back to it.
    pub fn mark_known(&self, peer: PeerId, txid: TxId) {
        if let Some(inventory) = self.peers.lock().get_mut(&peer) {
            inventory.known.insert(txid);
        }
    }

    /// Drains the ids queued for `peer`.
    pub fn take_inventory(&self, peer: PeerId) -> Vec<TxId> {
        self.peers
            .lock()
            .get_mut(&peer)
            .map(|inventory| std::mem::take(&mut inventory.queued))
            .unwrap_or_default()
    }
}

impl RelayAnnouncer for InventoryRelay {
    fn announce(&self, txid: TxId) {
        let mut peers = self.peers.lock();
        if peers.is_empty() {
            warn!(txid = %txid, "No connected peers; announcement dropped");
            return;
        }

        let mut queued_for = 0usize;
        for inventory in peers.values_mut() {
            if inventory.known.insert(txid) {
                inventory.queued.push(txid);
                queued_for += 1;
            }
        }
        trace!(txid = %txid, peers = queued_for, "Transaction announced");
    }
}

/// Relay that announces nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpRelay;

impl RelayAnnouncer for NoOpRelay {
    fn announce(&self, txid: TxId) {
        debug!(txid = %txid, "Relay disabled; announcement skipped");
    }
}
