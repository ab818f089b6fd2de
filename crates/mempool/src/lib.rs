//! # Transaction Admission Pipeline (Mempool)
//!
//! Admits caller-submitted transactions into the pending pool, synchronizes
//! with validation subscribers and announces new transactions to peers.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | A transaction with a recorded confirmed output is never admitted | `service.rs` - `admit()`, `domain/pool.rs` - `try_admit()` |
//! | A pending transaction is never admitted twice | `domain/pool.rs` - `try_admit()` duplicate check |
//! | Confirmed check, pool check and insert are atomic | `service.rs` - one `ChainState` lock per `admit()` |
//! | Relay only for a first-time `Ok` | `service.rs` - `submit()` |
//!
//! ## Submission Outcomes
//!
//! | Outcome | Meaning | Relayed |
//! |---------|---------|---------|
//! | `Ok` | Admitted now, or already pending (`already_pending`) | First-time only |
//! | `AlreadyConfirmed` | An output is recorded in confirmed state | No |
//! | `MissingInputs` | An input resolves to no unspent coin | No |
//! | `RejectedByPool` | Policy or consensus rejection, reason in `error_detail` | No |
//! | `InternalError` | A collaborator failed, detail in `error_detail` | No |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `ConfirmedStateView` | Confirmed coin lookups |
//! | `ConfirmedStateWriter` | Applying connected blocks |
//! | `TransactionVerifier` | Script and consensus verdict |
//! | `RelayAnnouncer` | Peer announcements |
//! | `TimeSource` | Admission timestamps |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  service.rs - TransactionSubmitter (lock, queue, relay)         │
//! │  adapters/  - InMemoryCoinsView, InventoryRelay, verifiers      │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - TransactionBroadcastApi, MempoolQueryApi   │
//! │  ports/outbound.rs - ConfirmedStateView, RelayAnnouncer, ...    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/entities.rs      - PoolEntry, MempoolConfig             │
//! │  domain/pool.rs          - TransactionPool, admission policy    │
//! │  domain/chain_state.rs   - ChainState (view + pool)             │
//! │  domain/value_objects.rs - AdmissionVerdict, Outcome            │
//! │  domain/errors.rs        - MempoolError, ChainStateError        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
pub use service::TransactionSubmitter;
