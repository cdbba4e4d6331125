//! # cvault-ledger — Hash-Chained Academic Record Store
//!
//! Append-only, tamper-evident record store. Each subject owns an
//! isolated chain: record `n` stores the hash of record `n-1`, and the
//! first record links to a fixed genesis constant. There is no mutation
//! or deletion API — a correction is a new compensating record, so chain
//! length and history are preserved.
//!
//! ## Chain Rule
//!
//! ```text
//! data_hash(n)     = SHA256(subject \n category \n value \n timestamp \n previous_hash(n))
//! previous_hash(n) = data_hash(n-1)
//! previous_hash(0) = GENESIS_HASH  (64 ASCII zeros)
//! ```
//!
//! ## Concurrency
//!
//! Appends for one subject are strictly serialized by a per-chain write
//! lock — two concurrent appends can never read the same tip and fork
//! the chain. Reads (`aggregate`, `verify_chain`, `records`) run
//! concurrently and observe only committed records.
//!
//! ## Tamper Detection
//!
//! [`Ledger::verify_chain`] walks genesis → tip recomputing every hash
//! and reports the **earliest** divergence index and kind, not a global
//! pass/fail. Verification precision is load-bearing: callers locate the
//! tampered record from the report.

pub mod record;
pub mod store;

pub use record::{
    chain_hash, verify_records, ChainVerification, DivergenceKind, LedgerRecord, GENESIS_HASH,
};
pub use store::{AggregateKind, Ledger, LedgerError};
