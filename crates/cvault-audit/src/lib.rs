//! # cvault-audit — Append-Only Audit Trail
//!
//! Passive sink for every state-changing operation in the Vault Manager
//! and the Ledger. Entries are appended, never mutated, never deleted;
//! a vault's terminal audit entry survives the vault itself.
//!
//! ## Design
//!
//! The trail records outcomes, not intentions: denied release attempts
//! and failed appends land here alongside successes, so the trail answers
//! "who tried what, when" without consulting any other store.
//!
//! Writers go through the [`AuditSink`] trait so domain crates never
//! depend on a concrete trail; [`SharedAuditTrail`] is the process-local
//! implementation shared between the escrow manager, the ledger, and the
//! API's query surface.

pub mod trail;

pub use trail::{AuditAction, AuditEntry, AuditSink, AuditTrail, NullSink, SharedAuditTrail};
