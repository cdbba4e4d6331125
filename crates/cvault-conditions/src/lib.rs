//! # cvault-conditions — Release Conditions and Their Evaluation
//!
//! The closed tagged variant for release conditions, the pure evaluation
//! engine, and the heuristic drafting assistant.
//!
//! ## Design
//!
//! Conditions are a **closed** enum with exhaustive handling at every
//! evaluation and persistence site. There is no ad hoc "type" field and
//! no way for an unrecognized condition shape to slip through and
//! silently evaluate as met or unmet — adding a variant is a compile
//! error at every match until handled.
//!
//! Evaluation is a pure function over a [`Facts`] bundle; all mutation
//! (persisting the recomputed flag, granting approvals) happens in the
//! escrow manager under its per-vault lock. Monotonicity — a condition
//! that was met never becomes unmet short of vault revocation — is
//! enforced by [`ConditionState::absorb`], the only write path for the
//! derived flag.
//!
//! The drafting assistant ([`draft`]) is advisory and lossy: it pattern-
//! matches free text into candidate conditions that a human must confirm
//! before they bind to any vault. It is not a security boundary.

pub mod condition;
pub mod draft;
pub mod engine;

pub use condition::{Condition, ConditionSlot, ConditionState, ThresholdOperator};
pub use draft::{draft_conditions, DraftCondition};
pub use engine::{evaluate, Facts, NoThresholds, ThresholdFacts};
