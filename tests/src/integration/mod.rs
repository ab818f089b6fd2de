//! # Integration Fixtures
//!
//! Builds a submitter over an in-memory coin set with a recording
//! subscriber and a relay that counts every announcement.

pub mod concurrency;
pub mod submit_flows;

use mempool::{
    AcceptAllVerifier, Amount, ChainState, Coin, InMemoryCoinsView, MempoolConfig, OutPoint,
    RelayAnnouncer, SubmitterConfig, SystemTimeSource, Transaction, TransactionSubmitter, TxId,
    TxIn, TxOut,
};
use parking_lot::Mutex;
use rand::Rng;
use shared_bus::{NotificationQueue, RecordingSubscriber};
use std::sync::Arc;

/// Value of every funding coin.
pub const FUNDING_VALUE: u64 = 100_000;

/// Relay that records every announcement, duplicates included.
#[derive(Default)]
pub struct CountingRelay {
    announced: Mutex<Vec<TxId>>,
}

impl CountingRelay {
    pub fn announced(&self) -> Vec<TxId> {
        self.announced.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.announced.lock().len()
    }
}

impl RelayAnnouncer for CountingRelay {
    fn announce(&self, txid: TxId) {
        self.announced.lock().push(txid);
    }
}

pub type TestSubmitter = TransactionSubmitter<InMemoryCoinsView, CountingRelay>;

/// A wired pipeline plus handles for observing it.
pub struct Pipeline {
    pub submitter: Arc<TestSubmitter>,
    pub relay: Arc<CountingRelay>,
    pub subscriber: Arc<RecordingSubscriber>,
}

/// Builds a pipeline whose confirmed view is `coins`.
pub fn pipeline_with(coins: InMemoryCoinsView, config: SubmitterConfig) -> Pipeline {
    let state = ChainState::new(coins, MempoolConfig::for_testing(), Arc::new(AcceptAllVerifier));
    let queue = Arc::new(NotificationQueue::start().expect("queue starts"));
    let subscriber = Arc::new(RecordingSubscriber::new());
    queue.register(subscriber.clone());

    let relay = Arc::new(CountingRelay::default());
    let submitter = Arc::new(TransactionSubmitter::new(
        config,
        Arc::new(Mutex::new(state)),
        queue,
        Arc::clone(&relay),
        Arc::new(SystemTimeSource),
    ));

    Pipeline {
        submitter,
        relay,
        subscriber,
    }
}

/// Builds a pipeline with one confirmed funding coin per outpoint.
pub fn pipeline(funding: &[OutPoint]) -> Pipeline {
    pipeline_with(funded_view(funding), SubmitterConfig::for_testing())
}

pub fn funded_view(funding: &[OutPoint]) -> InMemoryCoinsView {
    let mut coins = InMemoryCoinsView::new();
    for outpoint in funding {
        coins.add_coin(
            *outpoint,
            Coin::confirmed(TxOut::new(Amount::from_sat(FUNDING_VALUE), vec![0x51]), 1, false),
        );
    }
    coins.set_tip(1);
    coins
}

/// An outpoint of a random, never-seen transaction.
pub fn random_outpoint() -> OutPoint {
    OutPoint::new(TxId(rand::thread_rng().gen()), 0)
}

/// Spends `inputs` into a single output worth `value` base units.
pub fn pay(inputs: &[OutPoint], value: u64) -> Transaction {
    Transaction::new(
        inputs.iter().map(|o| TxIn::new(*o)).collect(),
        vec![TxOut::new(Amount::from_sat(value), vec![0x51])],
    )
}
