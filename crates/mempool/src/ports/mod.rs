//! Ports layer for the Mempool subsystem.
//!
//! Defines the hexagonal architecture port traits:
//! - Inbound (Driving) ports: submission and query API
//! - Outbound (Driven) ports: confirmed state, verifier, relay, time

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
