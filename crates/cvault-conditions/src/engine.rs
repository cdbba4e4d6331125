//! # Condition Engine — Pure Evaluation
//!
//! `evaluate(condition, state, facts) -> bool`, no side effects. The
//! escrow manager owns persisting the result (monotonically) back onto
//! the condition's state; this module never mutates anything.

use cvault_core::Timestamp;

use crate::condition::{Condition, ConditionState};

/// Source of threshold aggregates at evaluation time.
///
/// Implemented over the ledger by the escrow manager; the returned value
/// must be recomputed fresh from committed records per call, never
/// cached beyond it.
pub trait ThresholdFacts {
    /// The current aggregate for a metric, or `None` when the subject
    /// has no usable data for it.
    fn aggregate(&self, metric: &str) -> Option<f64>;
}

/// Facts a single evaluation runs against.
pub struct Facts<'a> {
    /// The evaluation instant.
    pub now: Timestamp,
    /// Threshold aggregate lookup.
    pub thresholds: &'a dyn ThresholdFacts,
}

/// No threshold data at all. For vaults without threshold conditions and
/// for tests.
pub struct NoThresholds;

impl ThresholdFacts for NoThresholds {
    fn aggregate(&self, _metric: &str) -> Option<f64> {
        None
    }
}

/// Evaluate one condition against current facts.
///
/// - `TimeLock` is met iff `now >= unlock_at`.
/// - `Approval` is met iff a grant has been recorded.
/// - `Threshold` is met iff the aggregate exists and satisfies the
///   comparison; a metric with no data evaluates unmet, never errors.
pub fn evaluate(condition: &Condition, state: &ConditionState, facts: &Facts<'_>) -> bool {
    match condition {
        Condition::TimeLock { unlock_at } => facts.now >= *unlock_at,
        Condition::Approval { .. } => state.granted_by.is_some(),
        Condition::Threshold {
            metric,
            operator,
            target,
        } => facts
            .thresholds
            .aggregate(metric)
            .is_some_and(|value| operator.apply(value, *target)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ThresholdOperator;
    use cvault_core::ActorId;
    use std::collections::HashMap;

    struct FixedFacts(HashMap<String, f64>);

    impl ThresholdFacts for FixedFacts {
        fn aggregate(&self, metric: &str) -> Option<f64> {
            self.0.get(metric).copied()
        }
    }

    fn at(iso: &str) -> Timestamp {
        Timestamp::parse(iso).unwrap()
    }

    fn facts_at<'a>(now: Timestamp, thresholds: &'a dyn ThresholdFacts) -> Facts<'a> {
        Facts { now, thresholds }
    }

    #[test]
    fn test_time_lock() {
        let condition = Condition::TimeLock {
            unlock_at: at("2026-06-15T12:00:00Z"),
        };
        let state = ConditionState::default();

        let before = facts_at(at("2026-06-15T11:59:59Z"), &NoThresholds);
        assert!(!evaluate(&condition, &state, &before));

        let exactly = facts_at(at("2026-06-15T12:00:00Z"), &NoThresholds);
        assert!(evaluate(&condition, &state, &exactly));

        let after = facts_at(at("2026-06-16T00:00:00Z"), &NoThresholds);
        assert!(evaluate(&condition, &state, &after));
    }

    #[test]
    fn test_approval_follows_grant() {
        let condition = Condition::Approval {
            required_approver: Some(ActorId::new("faculty_x")),
        };
        let mut state = ConditionState::default();
        let facts = facts_at(Timestamp::now(), &NoThresholds);

        assert!(!evaluate(&condition, &state, &facts));
        state.granted_by = Some(ActorId::new("faculty_x"));
        assert!(evaluate(&condition, &state, &facts));
    }

    #[test]
    fn test_threshold_against_aggregate() {
        let condition = Condition::Threshold {
            metric: "attendance".into(),
            operator: ThresholdOperator::Gt,
            target: 80.0,
        };
        let state = ConditionState::default();

        let low = FixedFacts(HashMap::from([("attendance".to_string(), 75.0)]));
        assert!(!evaluate(&condition, &state, &facts_at(Timestamp::now(), &low)));

        let high = FixedFacts(HashMap::from([("attendance".to_string(), 85.0)]));
        assert!(evaluate(&condition, &state, &facts_at(Timestamp::now(), &high)));
    }

    #[test]
    fn test_threshold_without_data_is_unmet() {
        let condition = Condition::Threshold {
            metric: "attendance".into(),
            operator: ThresholdOperator::Ge,
            target: 1.0,
        };
        let state = ConditionState::default();
        let facts = facts_at(Timestamp::now(), &NoThresholds);
        assert!(!evaluate(&condition, &state, &facts));
    }

    #[test]
    fn test_evaluation_has_no_side_effects() {
        let condition = Condition::TimeLock {
            unlock_at: at("2020-01-01T00:00:00Z"),
        };
        let state = ConditionState::default();
        let facts = facts_at(Timestamp::now(), &NoThresholds);
        assert!(evaluate(&condition, &state, &facts));
        // The engine computed `true` but the stored state is untouched;
        // only the manager persists results.
        assert!(!state.met);
    }
}
