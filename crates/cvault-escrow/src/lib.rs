//! # cvault-escrow — Condition-Gated Key Escrow
//!
//! The Vault Manager: custodial holding of decryption keys, released
//! only when every release condition on the vault holds.
//!
//! ## Status Machine
//!
//! ```text
//! LOCKED ──▶ UNLOCKED          (all conditions met, via evaluate)
//!    │           │
//!    └───────────┴──▶ REVOKED  (explicit issuer/admin action, terminal)
//! ```
//!
//! UNLOCKED never returns to LOCKED; REVOKED is terminal. The
//! all-conditions-AND model plus one-way transitions keep the security
//! property easy to state: a key can never be released before every
//! condition holds, and once released the fact is audited, not
//! reversible.
//!
//! ## Concurrency
//!
//! Each vault's status and conditions form one mutable unit behind one
//! mutex. `evaluate`, `grant_approval`, `release_key`'s unlock check,
//! and `revoke` all run under it, so no two callers can observe or
//! produce an inconsistent intermediate state. Locks are `parking_lot`
//! and never held across `.await` points.

pub mod error;
pub mod manager;
pub mod vault;

pub use error::EscrowError;
pub use manager::VaultManager;
pub use vault::{ConditionView, KeyMaterial, Vault, VaultSpec, VaultStatus, VaultView};
