//! # Error Types — Shared Error Taxonomy
//!
//! Defines the foundational error type used by the core primitives. The
//! domain crates (`cvault-ledger`, `cvault-escrow`, `cvault-store`) layer
//! their own `thiserror` enums on top of this one, mapping to the
//! stack-wide taxonomy: validation, authorization, not-found, premature
//! release, terminal-state violation, chain integrity, transient storage.
//!
//! ## Design
//!
//! - Validation failures carry the offending input so callers can fix and
//!   retry; they are never retried internally.
//! - Parsing errors fail loudly with the rejected text in the message.

use thiserror::Error;

/// Errors produced by the core primitive types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed or out-of-range input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A string did not parse as the expected identifier or timestamp.
    #[error("parse error: {0}")]
    Parse(String),
}
