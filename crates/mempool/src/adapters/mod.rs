//! Adapters layer for the Mempool subsystem.
//!
//! Concrete implementations of the outbound ports: an in-memory confirmed
//! coin set, peer relay and transaction verifiers.

pub mod coins;
pub mod relay;
pub mod verifier;

pub use coins::InMemoryCoinsView;
pub use relay::{InventoryRelay, NoOpRelay, PeerId};
pub use verifier::{AcceptAllVerifier, FnVerifier, StandardnessVerifier};
