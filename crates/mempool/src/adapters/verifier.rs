//! Verifier adapters.
//!
//! Script and signature evaluation live outside this crate; these adapters
//! cover wiring without a script engine and the standardness policy.

use crate::domain::{Amount, Coin, Transaction, VerifyError};
use crate::ports::outbound::TransactionVerifier;

/// Accepts every transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllVerifier;

impl TransactionVerifier for AcceptAllVerifier {
    fn verify(&self, _transaction: &Transaction, _spent_coins: &[Coin]) -> Result<(), VerifyError> {
        Ok(())
    }
}

/// Adapts a closure into a verifier.
pub struct FnVerifier<F> {
    check: F,
}

impl<F> FnVerifier<F>
where
    F: Fn(&Transaction, &[Coin]) -> Result<(), VerifyError> + Send + Sync,
{
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

impl<F> TransactionVerifier for FnVerifier<F>
where
    F: Fn(&Transaction, &[Coin]) -> Result<(), VerifyError> + Send + Sync,
{
    fn verify(&self, transaction: &Transaction, spent_coins: &[Coin]) -> Result<(), VerifyError> {
        (self.check)(transaction, spent_coins)
    }
}

/// Relay policy: rejects outputs that are uneconomical to spend or carry
/// oversized locking scripts.
#[derive(Debug, Clone)]
pub struct StandardnessVerifier {
    /// Outputs below this value are dust.
    pub dust_threshold: Amount,
    /// Largest accepted locking script, in bytes.
    pub max_script_size: usize,
}

impl Default for StandardnessVerifier {
    fn default() -> Self {
        Self {
            dust_threshold: Amount::from_sat(546),
            max_script_size: 10_000,
        }
    }
}

impl TransactionVerifier for StandardnessVerifier {
    fn verify(&self, transaction: &Transaction, _spent_coins: &[Coin]) -> Result<(), VerifyError> {
        for output in &transaction.outputs {
            if output.script_pubkey.len() > self.max_script_size {
                return Err(VerifyError::Invalid("scriptpubkey".into()));
            }
            if output.value < self.dust_threshold {
                return Err(VerifyError::Invalid("dust".into()));
            }
        }
        Ok(())
    }
}
