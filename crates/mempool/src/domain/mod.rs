//! # Domain Layer - Mempool Subsystem
//!
//! Pure admission logic; no locking, threads or I/O.
//!
//! ## Components
//!
//! - `entities`: PoolEntry, MempoolConfig
//! - `pool`: TransactionPool with the admission policy and conflict index
//! - `chain_state`: confirmed view and pool grouped behind one lock
//! - `value_objects`: AdmissionVerdict, Outcome, SubmitResult, MempoolInfo
//! - `errors`: MempoolError, ChainStateError, VerifyError

pub mod chain_state;
pub mod entities;
pub mod errors;
pub mod pool;
pub mod value_objects;

pub use chain_state::*;
pub use entities::*;
pub use errors::*;
pub use pool::*;
pub use value_objects::*;
