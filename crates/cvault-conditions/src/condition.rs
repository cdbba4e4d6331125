//! # Condition Types
//!
//! The closed release-condition variant and its per-vault mutable state.

use serde::{Deserialize, Serialize};

use cvault_core::{ActorId, ConditionId, Timestamp};

// ─── Operators ───────────────────────────────────────────────────────

/// Comparison operator for threshold conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdOperator {
    /// Strictly greater than the target.
    Gt,
    /// Greater than or equal to the target.
    Ge,
    /// Equal to the target.
    Eq,
}

impl ThresholdOperator {
    /// Apply the comparison.
    pub fn apply(&self, value: f64, target: f64) -> bool {
        match self {
            Self::Gt => value > target,
            Self::Ge => value >= target,
            Self::Eq => value == target,
        }
    }

    /// The operator's symbolic form.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
        }
    }
}

impl std::fmt::Display for ThresholdOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

// ─── Condition variant ───────────────────────────────────────────────

/// One boolean-valued release requirement.
///
/// Closed variant — evaluation and persistence match exhaustively, so a
/// malformed or unknown condition shape cannot exist at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// Met once the current time reaches `unlock_at`.
    TimeLock {
        /// The instant the lock opens.
        unlock_at: Timestamp,
    },
    /// Met once an authorized approver grants it.
    Approval {
        /// If set, only this identity may grant; otherwise any actor
        /// whose role carries approval rights.
        required_approver: Option<ActorId>,
    },
    /// Met while a ledger aggregate satisfies the comparison.
    ///
    /// The metric names a ledger category; the aggregate is recomputed
    /// fresh from the subject's chain on every evaluation.
    Threshold {
        /// Ledger category to aggregate (e.g. "attendance").
        metric: String,
        /// Comparison against the target.
        operator: ThresholdOperator,
        /// The value to compare the aggregate with.
        target: f64,
    },
}

impl Condition {
    /// One-line human description, used by views and audit details.
    pub fn describe(&self) -> String {
        match self {
            Self::TimeLock { unlock_at } => format!("release after {unlock_at}"),
            Self::Approval {
                required_approver: Some(who),
            } => format!("requires approval from {who}"),
            Self::Approval {
                required_approver: None,
            } => "requires faculty approval".to_string(),
            Self::Threshold {
                metric,
                operator,
                target,
            } => format!("{metric} {operator} {target}"),
        }
    }
}

// ─── Mutable state ───────────────────────────────────────────────────

/// The mutable evaluation state carried beside a condition.
///
/// Written only by the escrow manager under its per-vault lock: the
/// engine's recomputed flag is folded in through [`absorb`], and
/// approval grants set `granted_by` exactly once.
///
/// [`absorb`]: ConditionState::absorb
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionState {
    /// Whether the condition currently holds. Monotonic: once true it
    /// stays true for the life of the vault.
    pub met: bool,
    /// Who granted an approval condition, once granted.
    pub granted_by: Option<ActorId>,
    /// When the condition was last evaluated.
    pub last_evaluated: Option<Timestamp>,
}

impl ConditionState {
    /// Fold a freshly computed result into the stored flag.
    ///
    /// The flag can only move false → true; a later evaluation that
    /// comes back false (a threshold that dipped, say) does not unmeet
    /// the condition.
    pub fn absorb(&mut self, result: bool, at: Timestamp) {
        self.met = self.met || result;
        self.last_evaluated = Some(at);
    }
}

/// A condition bound into a vault: identity, variant, and state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSlot {
    /// Identity of this condition within its vault.
    pub id: ConditionId,
    /// The release requirement.
    pub condition: Condition,
    /// Mutable evaluation state.
    pub state: ConditionState,
}

impl ConditionSlot {
    /// Bind a condition with fresh (unmet) state.
    pub fn new(condition: Condition) -> Self {
        Self {
            id: ConditionId::new(),
            condition,
            state: ConditionState::default(),
        }
    }
}
