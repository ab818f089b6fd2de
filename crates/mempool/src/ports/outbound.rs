//! Outbound (Driven) ports for the Mempool subsystem.
//!
//! These traits define the collaborators the admission path depends on:
//! confirmed chain state, script/consensus verification, peer relay and
//! time.

use crate::domain::{
    BlockHeight, ChainStateError, Coin, OutPoint, Timestamp, Transaction, TxId, VerifyError,
};

/// Read access to confirmed chain state.
///
/// Implementations must stay consistent for as long as the caller holds the
/// exclusive section guarding the view.
pub trait ConfirmedStateView: Send + Sync {
    /// Looks up the recorded coin for `outpoint`.
    ///
    /// # Returns
    /// - `Ok(Some(coin))`: the output is recorded (spent or unspent)
    /// - `Ok(None)`: the output was never confirmed
    /// - `Err`: the backing store failed
    fn lookup(&self, outpoint: &OutPoint) -> Result<Option<Coin>, ChainStateError>;

    /// Height of the most recently connected block.
    fn tip_height(&self) -> BlockHeight;
}

/// Write access to confirmed chain state, used when a block is connected.
pub trait ConfirmedStateWriter: ConfirmedStateView {
    /// Spends the inputs and records the outputs of every transaction in
    /// `transactions`, confirmed at `height`.
    ///
    /// All-or-nothing: on error the view is left unchanged.
    fn apply_block(
        &mut self,
        transactions: &[Transaction],
        height: BlockHeight,
    ) -> Result<(), ChainStateError>;
}

/// Opaque script and consensus verifier.
///
/// `spent_coins` holds the resolved coin for each input, in input order.
pub trait TransactionVerifier: Send + Sync {
    fn verify(&self, transaction: &Transaction, spent_coins: &[Coin]) -> Result<(), VerifyError>;
}

/// Announces transaction ids to connected peers.
///
/// Fire-and-forget: delivery failures are logged by the implementation and
/// never reported back.
pub trait RelayAnnouncer: Send + Sync {
    fn announce(&self, txid: TxId);
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Confirmed-state view whose every read fails.
#[cfg(test)]
pub struct FailingStateView;

#[cfg(test)]
impl ConfirmedStateView for FailingStateView {
    fn lookup(&self, _outpoint: &OutPoint) -> Result<Option<Coin>, ChainStateError> {
        Err(ChainStateError::Storage("disk unavailable".into()))
    }

    fn tip_height(&self) -> BlockHeight {
        0
    }
}

/// Relay that records every announcement.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingRelay {
    announced: parking_lot::Mutex<Vec<TxId>>,
}

#[cfg(test)]
impl RecordingRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn announced(&self) -> Vec<TxId> {
        self.announced.lock().clone()
    }
}

#[cfg(test)]
impl RelayAnnouncer for RecordingRelay {
    fn announce(&self, txid: TxId) {
        self.announced.lock().push(txid);
    }
}

/// Mock time source for testing.
#[cfg(test)]
pub struct MockTimeSource {
    time: std::sync::atomic::AtomicU64,
}

#[cfg(test)]
impl MockTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: std::sync::atomic::AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(std::sync::atomic::Ordering::SeqCst)
    }
}
