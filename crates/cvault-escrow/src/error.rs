//! # Escrow Errors
//!
//! The Vault Manager's error taxonomy. Validation and authorization
//! failures are never retried internally; `NotUnlocked` invites the
//! caller to re-`evaluate` later; `AlreadyRevoked` is a terminal-state
//! violation; `ChainIntegrity` poisons threshold evaluation when a
//! subject's history cannot be trusted.

use thiserror::Error;

use cvault_core::VaultId;
use cvault_ledger::LedgerError;

/// Errors from Vault Manager operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EscrowError {
    /// Malformed or missing input; the caller must fix and retry.
    #[error("validation error: {0}")]
    Validation(String),

    /// Actor, role, or ownership mismatch. Never retried.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// No such vault or condition.
    #[error("not found: {0}")]
    NotFound(String),

    /// Key requested before every condition holds. The caller should
    /// wait and retry `evaluate` later.
    #[error("{0} is not unlocked")]
    NotUnlocked(VaultId),

    /// The vault is revoked; the operation can never succeed.
    #[error("{0} is revoked")]
    AlreadyRevoked(VaultId),

    /// The ledger chain backing a threshold condition is damaged.
    /// Surfaced prominently, never auto-repaired.
    #[error("chain integrity: {0}")]
    ChainIntegrity(#[source] LedgerError),
}
