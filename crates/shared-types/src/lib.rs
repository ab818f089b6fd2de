//! # Shared Types Crate
//!
//! Domain entities shared by the node's subsystems: the UTXO transaction
//! model, transaction ids and coins.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Immutable Transactions**: A `Transaction` is never mutated once built;
//!   its `TxId` is a pure function of its content.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
