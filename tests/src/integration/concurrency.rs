//! # Concurrent Submission
//!
//! Racing callers against the single exclusive section:
//!
//! - N submitters of the same new transaction → one entry, one first-time `Ok`
//! - Competing spends of one coin → exactly one admitted
//! - Submission racing block connection → never left pending once confirmed

#[cfg(test)]
mod tests {
    use super::super::*;
    use futures::future::join_all;
    use mempool::{MempoolQueryApi, Outcome, SubmitResult};
    use std::collections::HashSet;

    const SUBMITTERS: usize = 32;

    async fn submit_all(p: &Pipeline, txs: Vec<Transaction>) -> Vec<SubmitResult> {
        let handles = txs.into_iter().map(|tx| {
            let submitter = Arc::clone(&p.submitter);
            tokio::spawn(async move { submitter.submit(tx, Amount::ZERO, true, true).await })
        });
        join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.expect("submit task panicked"))
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_transaction_admitted_once() {
        let funding = random_outpoint();
        let p = pipeline(&[funding]);
        let tx = pay(&[funding], 90_000);
        let txid = tx.txid();

        let results = submit_all(&p, vec![tx; SUBMITTERS]).await;

        assert!(results.iter().all(|r| r.outcome == Outcome::Ok));
        let first_time = results.iter().filter(|r| !r.already_pending).count();
        assert_eq!(first_time, 1);
        assert_eq!(p.submitter.info().size, 1);
        assert_eq!(p.relay.announced(), vec![txid]);
        assert_eq!(p.subscriber.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_distinct_transactions_all_admitted() {
        let funding: Vec<_> = (0..SUBMITTERS).map(|_| random_outpoint()).collect();
        let p = pipeline(&funding);
        let txs: Vec<_> = funding.iter().map(|o| pay(&[*o], 90_000)).collect();
        let expected: HashSet<_> = txs.iter().map(Transaction::txid).collect();

        let results = submit_all(&p, txs).await;

        assert!(results.iter().all(|r| r.outcome.is_ok() && r.relayed));
        assert_eq!(p.submitter.info().size, SUBMITTERS);
        let announced: HashSet<_> = p.relay.announced().into_iter().collect();
        assert_eq!(announced, expected);
        assert_eq!(p.relay.count(), SUBMITTERS);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_competing_spends_admit_exactly_one() {
        let funding = random_outpoint();
        let p = pipeline(&[funding]);
        // Same input, different outputs: distinct transactions.
        let txs: Vec<_> = (0..SUBMITTERS as u64)
            .map(|i| pay(&[funding], 90_000 - i))
            .collect();

        let results = submit_all(&p, txs).await;

        let accepted: Vec<_> = results.iter().filter(|r| r.outcome.is_ok()).collect();
        assert_eq!(accepted.len(), 1);
        assert!(results
            .iter()
            .filter(|r| !r.outcome.is_ok())
            .all(|r| r.outcome == Outcome::RejectedByPool && r.error_detail == "txn-mempool-conflict"));
        assert_eq!(p.relay.announced(), vec![accepted[0].txid]);
        assert_eq!(p.submitter.info().size, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_submission_racing_confirmation() {
        let funding = random_outpoint();
        let p = pipeline(&[funding]);
        let tx = pay(&[funding], 90_000);
        let txid = tx.txid();

        let connector = {
            let submitter = Arc::clone(&p.submitter);
            let block = vec![tx.clone()];
            tokio::task::spawn_blocking(move || submitter.connect_block(&block, 2))
        };
        let submitter = Arc::clone(&p.submitter);
        let submission =
            tokio::spawn(async move { submitter.submit(tx, Amount::ZERO, true, true).await });

        let connected = connector.await.expect("connect task panicked");
        let result = submission.await.expect("submit task panicked");

        assert!(connected.is_ok());
        assert!(matches!(
            result.outcome,
            Outcome::Ok | Outcome::AlreadyConfirmed
        ));
        assert_eq!(result.relayed, result.outcome == Outcome::Ok);
        assert!(!p.submitter.contains(&txid));
    }
}
