//! # Submission Flows
//!
//! Single-caller scenarios through the full pipeline:
//!
//! 1. Unknown input → `MissingInputs`, nothing admitted or relayed
//! 2. First acceptance with relay and sync → subscribers ran before return
//! 3. Resubmission of a pending transaction → `Ok`, no second entry or relay
//! 4. Confirmation then resubmission → `AlreadyConfirmed`

#[cfg(test)]
mod tests {
    use super::super::*;
    use mempool::{MempoolQueryApi, Outcome, TransactionBroadcastApi};
    use node_runtime::{NodeConfig, NodeRuntime};
    use shared_bus::{NodeEvent, ValidationSubscriber};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    // =============================================================================
    // SCENARIOS
    // =============================================================================

    #[tokio::test]
    async fn test_missing_input_is_not_admitted() {
        let p = pipeline(&[]);
        let tx = pay(&[random_outpoint()], 1_000);
        let txid = tx.txid();

        let result = p.submitter.submit(tx, Amount::ZERO, true, true).await;

        assert_eq!(result.outcome, Outcome::MissingInputs);
        assert_eq!(result.message(), "Missing inputs");
        assert!(!p.submitter.contains(&txid));
        assert_eq!(p.relay.count(), 0);
        assert!(p.subscriber.is_empty());
    }

    #[tokio::test]
    async fn test_accept_relays_once_after_subscribers_ran() {
        let funding = random_outpoint();
        let p = pipeline(&[funding]);
        let tx = pay(&[funding], 90_000);
        let txid = tx.txid();

        let result = p.submitter.submit(tx, Amount::ZERO, true, true).await;

        assert_eq!(result.outcome, Outcome::Ok);
        assert!(result.error_detail.is_empty());
        assert!(result.relayed);
        // Observed immediately on return, without flushing the queue.
        assert_eq!(p.subscriber.len(), 1);
        assert!(matches!(
            p.subscriber.events()[0],
            NodeEvent::TransactionAddedToMempool { txid: seen, .. } if seen == txid
        ));
        assert_eq!(p.relay.announced(), vec![txid]);
    }

    #[tokio::test]
    async fn test_resubmission_keeps_single_entry() {
        let funding = random_outpoint();
        let p = pipeline(&[funding]);
        let tx = pay(&[funding], 90_000);

        let first = p.submitter.submit(tx.clone(), Amount::ZERO, true, true).await;
        assert!(first.relayed);

        for _ in 0..5 {
            let again = p.submitter.submit(tx.clone(), Amount::ZERO, true, true).await;
            assert_eq!(again.outcome, Outcome::Ok);
            assert!(again.already_pending);
            assert!(!again.relayed);
        }

        assert_eq!(p.submitter.info().size, 1);
        assert_eq!(p.relay.count(), 1);
        assert_eq!(p.subscriber.len(), 1);
    }

    #[tokio::test]
    async fn test_confirmed_transaction_not_readmitted() {
        let funding = random_outpoint();
        let p = pipeline(&[funding]);
        let tx = pay(&[funding], 90_000);
        let txid = tx.txid();

        assert!(p
            .submitter
            .submit(tx.clone(), Amount::ZERO, false, false)
            .await
            .outcome
            .is_ok());
        p.submitter.connect_block(&[tx.clone()], 2).unwrap();

        let result = p.submitter.submit(tx, Amount::ZERO, true, true).await;

        assert_eq!(result.outcome, Outcome::AlreadyConfirmed);
        assert_eq!(result.message(), "Transaction already in block chain");
        assert!(!p.submitter.contains(&txid));
        assert_eq!(p.relay.count(), 0);
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    #[tokio::test]
    async fn test_recorded_confirmed_output_short_circuits() {
        let funding = random_outpoint();
        let tx = pay(&[funding], 90_000);
        let mut coins = funded_view(&[funding]);
        coins.add_transaction_outputs(&tx, 1);
        let p = pipeline_with(coins, SubmitterConfig::for_testing());

        let result = p.submitter.submit(tx.clone(), Amount::ZERO, true, true).await;

        assert_eq!(result.outcome, Outcome::AlreadyConfirmed);
        assert_eq!(p.submitter.info().size, 0);
        assert_eq!(p.relay.count(), 0);
        // The funding coin was never reserved by the pool.
        let other_spend = pay(&[funding], 80_000);
        assert!(p
            .submitter
            .submit(other_spend, Amount::ZERO, false, false)
            .await
            .outcome
            .is_ok());
    }

    #[tokio::test]
    async fn test_fully_spent_confirmed_transaction_still_confirmed() {
        let funding = random_outpoint();
        let tx = pay(&[funding], 90_000);
        let mut coins = funded_view(&[funding]);
        coins.add_transaction_outputs(&tx, 1);
        coins.spend(&OutPoint::new(tx.txid(), 0)).unwrap();
        let p = pipeline_with(coins, SubmitterConfig::for_testing());

        let result = p.submitter.submit(tx, Amount::ZERO, true, true).await;
        assert_eq!(result.outcome, Outcome::AlreadyConfirmed);
    }

    #[tokio::test]
    async fn test_conflicting_spend_rejected_with_reason() {
        let funding = random_outpoint();
        let p = pipeline(&[funding]);

        let first = p
            .submitter
            .submit(pay(&[funding], 90_000), Amount::ZERO, true, false)
            .await;
        let second = p
            .submitter
            .submit(pay(&[funding], 85_000), Amount::ZERO, true, false)
            .await;

        assert!(first.outcome.is_ok());
        assert_eq!(second.outcome, Outcome::RejectedByPool);
        assert_eq!(second.error_detail, "txn-mempool-conflict");
        assert!(!second.relayed);
        assert_eq!(p.relay.count(), 1);
    }

    #[tokio::test]
    async fn test_chained_pending_spend_survives_parent_confirmation() {
        let funding = random_outpoint();
        let p = pipeline(&[funding]);
        let parent = pay(&[funding], 90_000);
        let child = pay(&[OutPoint::new(parent.txid(), 0)], 80_000);
        let child_id = child.txid();

        for tx in [parent.clone(), child] {
            let result = p.submitter.submit(tx, Amount::ZERO, true, false).await;
            assert!(result.outcome.is_ok());
        }
        p.submitter.connect_block(&[parent], 2).unwrap();

        assert!(p.submitter.contains(&child_id));
        assert_eq!(p.submitter.info().size, 1);
    }

    /// Subscriber that takes a while and records that it finished.
    struct SlowSubscriber {
        finished: AtomicBool,
    }

    impl ValidationSubscriber for SlowSubscriber {
        fn name(&self) -> &str {
            "slow"
        }

        fn on_event(&self, _event: &NodeEvent) {
            std::thread::sleep(Duration::from_millis(50));
            self.finished.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_sync_waits_for_slow_subscriber() {
        let funding = random_outpoint();
        let p = pipeline(&[funding]);
        let slow = Arc::new(SlowSubscriber {
            finished: AtomicBool::new(false),
        });
        p.submitter.queue().register(slow.clone());

        let result = p
            .submitter
            .submit(pay(&[funding], 90_000), Amount::ZERO, false, true)
            .await;

        assert!(result.outcome.is_ok());
        assert!(slow.finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_broadcast_api_through_node_runtime() {
        let funding = random_outpoint();
        let config = NodeConfig {
            mempool: MempoolConfig::for_testing(),
            ..NodeConfig::default()
        };
        let runtime =
            NodeRuntime::with_parts(config, funded_view(&[funding]), Arc::new(AcceptAllVerifier))
                .unwrap();
        runtime.relay().connect_peer(7);
        let api: Arc<dyn TransactionBroadcastApi> = runtime.submitter();

        let tx = pay(&[funding], 90_000);
        let txid = tx.txid();
        let result = api.submit(tx, Amount::from_sat(50_000), true, true).await;

        assert_eq!(result.outcome, Outcome::Ok);
        assert_eq!(runtime.relay().take_inventory(7), vec![txid]);
        runtime.shutdown();
    }
}
