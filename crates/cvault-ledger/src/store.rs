//! # Ledger Store — Per-Subject Chains Under Lock
//!
//! The concurrent store wrapping the pure chain logic in
//! [`crate::record`]. One lock per subject chain: appends serialize,
//! reads snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use cvault_audit::{AuditAction, AuditEntry, AuditSink};
use cvault_core::{Actor, SubjectId, Timestamp};

use crate::record::{
    chain_hash, verify_records, ChainVerification, DivergenceKind, LedgerRecord, GENESIS_HASH,
};

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from ledger operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// Malformed input; the caller must fix and retry.
    #[error("validation error: {0}")]
    Validation(String),

    /// The actor's role may not issue records.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A chain walk found damage. Fatal to trust in this subject's
    /// history; never auto-repaired.
    #[error("chain integrity violated for {subject}: {kind} at record {index}")]
    ChainIntegrity {
        /// The damaged subject chain.
        subject: SubjectId,
        /// Earliest divergent index.
        index: usize,
        /// What kind of damage.
        kind: DivergenceKind,
    },
}

// ─── Aggregates ──────────────────────────────────────────────────────

/// The derived statistic [`Ledger::aggregate`] computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    /// The most recent record's numeric value. This is what threshold
    /// conditions evaluate against: the latest record is the subject's
    /// current standing.
    Latest,
    /// How many records exist in the category.
    Count,
    /// Mean of the numeric values in the category.
    Average,
}

impl AggregateKind {
    /// Parse from the lowercase wire name.
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "count" => Ok(Self::Count),
            "average" => Ok(Self::Average),
            other => Err(LedgerError::Validation(format!(
                "unknown aggregate kind: {other:?}"
            ))),
        }
    }
}

impl std::fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Latest => "latest",
            Self::Count => "count",
            Self::Average => "average",
        };
        f.write_str(s)
    }
}

// ─── Ledger ──────────────────────────────────────────────────────────

/// One subject's chain behind its own lock.
#[derive(Debug, Default)]
struct Chain {
    records: RwLock<Vec<LedgerRecord>>,
}

/// The concurrent, append-only ledger.
///
/// Cloning yields another handle to the same chains. Locks are
/// `parking_lot` and are never held across `.await` points.
#[derive(Clone)]
pub struct Ledger {
    chains: Arc<RwLock<HashMap<SubjectId, Arc<Chain>>>>,
    audit: Arc<dyn AuditSink>,
}

impl Ledger {
    /// Create an empty ledger writing audit entries to `audit`.
    pub fn new(audit: Arc<dyn AuditSink>) -> Self {
        Self {
            chains: Arc::new(RwLock::new(HashMap::new())),
            audit,
        }
    }

    /// Get or create the chain handle for a subject.
    fn chain(&self, subject: &SubjectId) -> Arc<Chain> {
        if let Some(chain) = self.chains.read().get(subject) {
            return Arc::clone(chain);
        }
        Arc::clone(
            self.chains
                .write()
                .entry(subject.clone())
                .or_insert_with(|| Arc::new(Chain::default())),
        )
    }

    /// Append a record to `subject`'s chain.
    ///
    /// Serialized per subject: the chain's write lock is held from tip
    /// read to commit, so concurrent appends cannot fork. The whole
    /// operation commits or leaves no trace.
    ///
    /// # Errors
    ///
    /// `Validation` on empty category/value; `Unauthorized` unless the
    /// issuer's role may issue records. Refusals are audited.
    pub fn append(
        &self,
        subject: &SubjectId,
        category: &str,
        value: &str,
        issued_by: &Actor,
    ) -> Result<LedgerRecord, LedgerError> {
        let category = category.trim();
        let value = value.trim();
        if category.is_empty() || value.is_empty() {
            return Err(LedgerError::Validation(
                "category and value must be non-empty".into(),
            ));
        }
        if !issued_by.role.may_issue_records() {
            self.audit.record(AuditEntry::new(
                issued_by.id.clone(),
                AuditAction::AccessDenied,
                subject.to_string(),
                serde_json::json!({
                    "operation": "append",
                    "reason": format!("role {} may not issue records", issued_by.role),
                }),
            ));
            return Err(LedgerError::Unauthorized(format!(
                "role {} may not issue records",
                issued_by.role
            )));
        }

        let chain = self.chain(subject);
        let mut records = chain.records.write();

        let previous_hash = records
            .last()
            .map(|tip| tip.data_hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string());
        let timestamp = Timestamp::now();
        let data_hash = chain_hash(subject, category, value, timestamp, &previous_hash);
        let record = LedgerRecord {
            subject: subject.clone(),
            category: category.to_string(),
            value: value.to_string(),
            timestamp,
            issued_by: issued_by.id.clone(),
            seq: records.len() as u64,
            previous_hash,
            data_hash,
        };
        records.push(record.clone());
        drop(records);

        tracing::info!(subject = %subject, category, seq = record.seq, "record appended");
        self.audit.record(AuditEntry::new(
            issued_by.id.clone(),
            AuditAction::RecordAppended,
            subject.to_string(),
            serde_json::json!({
                "category": record.category,
                "seq": record.seq,
                "data_hash": record.data_hash,
            }),
        ));
        Ok(record)
    }

    /// Compute a derived statistic over `subject`'s records of `category`.
    ///
    /// Recomputed fresh from the committed chain on every call — never
    /// cached. Category comparison ignores ASCII case. `Count` is always
    /// a number (0 for an unknown subject); `Latest` and `Average` return
    /// `None` when no numeric records exist.
    pub fn aggregate(
        &self,
        subject: &SubjectId,
        category: &str,
        kind: AggregateKind,
    ) -> Option<f64> {
        let chain = match self.chains.read().get(subject) {
            Some(chain) => Arc::clone(chain),
            None => {
                return match kind {
                    AggregateKind::Count => Some(0.0),
                    _ => None,
                }
            }
        };
        let records = chain.records.read();
        let matching = records
            .iter()
            .filter(|r| r.category.eq_ignore_ascii_case(category));

        match kind {
            AggregateKind::Count => Some(matching.count() as f64),
            AggregateKind::Latest => matching.last().and_then(LedgerRecord::numeric_value),
            AggregateKind::Average => {
                let values: Vec<f64> = matching.filter_map(LedgerRecord::numeric_value).collect();
                if values.is_empty() {
                    None
                } else {
                    Some(values.iter().sum::<f64>() / values.len() as f64)
                }
            }
        }
    }

    /// Walk `subject`'s chain genesis → tip, reporting the earliest
    /// divergence. An unknown subject verifies trivially (length 0).
    pub fn verify_chain(&self, subject: &SubjectId) -> ChainVerification {
        let chain = match self.chains.read().get(subject) {
            Some(chain) => Arc::clone(chain),
            None => return ChainVerification::Ok { length: 0 },
        };
        let records = chain.records.read();
        verify_records(&records)
    }

    /// Verify and turn any divergence into a [`LedgerError`].
    ///
    /// Used where tampered history must poison the dependent operation
    /// (threshold evaluation) instead of producing a report.
    pub fn require_intact(&self, subject: &SubjectId) -> Result<usize, LedgerError> {
        match self.verify_chain(subject) {
            ChainVerification::Ok { length } => Ok(length),
            ChainVerification::Divergent { index, kind } => Err(LedgerError::ChainIntegrity {
                subject: subject.clone(),
                index,
                kind,
            }),
        }
    }

    /// Snapshot of `subject`'s records, oldest first.
    pub fn records(&self, subject: &SubjectId) -> Vec<LedgerRecord> {
        match self.chains.read().get(subject) {
            Some(chain) => chain.records.read().clone(),
            None => Vec::new(),
        }
    }

    /// Test-only: overwrite one committed record to simulate tampering.
    #[doc(hidden)]
    pub fn tamper_with(&self, subject: &SubjectId, index: usize, f: impl FnOnce(&mut LedgerRecord)) {
        if let Some(chain) = self.chains.read().get(subject) {
            if let Some(record) = chain.records.write().get_mut(index) {
                f(record);
            }
        }
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("subjects", &self.chains.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvault_audit::{NullSink, SharedAuditTrail};
    use cvault_core::Role;

    fn faculty() -> Actor {
        Actor::new("faculty_x", Role::Faculty)
    }

    fn student_subject() -> SubjectId {
        SubjectId::new("student_a")
    }

    fn ledger() -> Ledger {
        Ledger::new(Arc::new(NullSink))
    }

    #[test]
    fn test_append_links_from_genesis() {
        let ledger = ledger();
        let subject = student_subject();
        let first = ledger.append(&subject, "attendance", "70", &faculty()).unwrap();
        assert_eq!(first.seq, 0);
        assert_eq!(first.previous_hash, GENESIS_HASH);
        assert_eq!(first.data_hash, first.recompute_hash());

        let second = ledger.append(&subject, "attendance", "75", &faculty()).unwrap();
        assert_eq!(second.seq, 1);
        assert_eq!(second.previous_hash, first.data_hash);
    }

    #[test]
    fn test_append_rejects_empty_fields() {
        let ledger = ledger();
        let subject = student_subject();
        assert!(matches!(
            ledger.append(&subject, "", "85", &faculty()),
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            ledger.append(&subject, "attendance", "  ", &faculty()),
            Err(LedgerError::Validation(_))
        ));
        assert!(ledger.records(&subject).is_empty());
    }

    #[test]
    fn test_append_requires_issuer_role() {
        let ledger = ledger();
        let subject = student_subject();
        let student = Actor::new("student_a", Role::Student);
        assert!(matches!(
            ledger.append(&subject, "attendance", "85", &student),
            Err(LedgerError::Unauthorized(_))
        ));
        let admin = Actor::new("root", Role::Admin);
        assert!(ledger.append(&subject, "attendance", "85", &admin).is_ok());
    }

    #[test]
    fn test_denied_append_is_audited() {
        let trail = SharedAuditTrail::new();
        let ledger = Ledger::new(Arc::new(trail.clone()));
        let subject = student_subject();
        let verifier = Actor::new("nosy", Role::Verifier);
        let _ = ledger.append(&subject, "attendance", "85", &verifier);
        let denied = trail.entries_by_action(AuditAction::AccessDenied);
        assert_eq!(denied.len(), 1);
        assert_eq!(denied[0].target, subject.to_string());
    }

    #[test]
    fn test_chains_are_isolated_per_subject() {
        let ledger = ledger();
        let a = SubjectId::new("student_a");
        let b = SubjectId::new("student_b");
        ledger.append(&a, "attendance", "70", &faculty()).unwrap();
        let first_b = ledger.append(&b, "attendance", "90", &faculty()).unwrap();
        // b's chain starts from genesis regardless of a's records.
        assert_eq!(first_b.previous_hash, GENESIS_HASH);
        assert_eq!(ledger.records(&a).len(), 1);
        assert_eq!(ledger.records(&b).len(), 1);
    }

    #[test]
    fn test_aggregate_latest() {
        let ledger = ledger();
        let subject = student_subject();
        ledger.append(&subject, "attendance", "70", &faculty()).unwrap();
        ledger.append(&subject, "attendance", "85%", &faculty()).unwrap();
        ledger.append(&subject, "grade", "91", &faculty()).unwrap();
        assert_eq!(
            ledger.aggregate(&subject, "attendance", AggregateKind::Latest),
            Some(85.0)
        );
        assert_eq!(
            ledger.aggregate(&subject, "grade", AggregateKind::Latest),
            Some(91.0)
        );
    }

    #[test]
    fn test_aggregate_category_ignores_case() {
        let ledger = ledger();
        let subject = student_subject();
        ledger.append(&subject, "Attendance", "70", &faculty()).unwrap();
        assert_eq!(
            ledger.aggregate(&subject, "attendance", AggregateKind::Latest),
            Some(70.0)
        );
    }

    #[test]
    fn test_aggregate_count_and_average() {
        let ledger = ledger();
        let subject = student_subject();
        for v in ["60", "70", "80"] {
            ledger.append(&subject, "attendance", v, &faculty()).unwrap();
        }
        assert_eq!(
            ledger.aggregate(&subject, "attendance", AggregateKind::Count),
            Some(3.0)
        );
        assert_eq!(
            ledger.aggregate(&subject, "attendance", AggregateKind::Average),
            Some(70.0)
        );
    }

    #[test]
    fn test_aggregate_missing_data() {
        let ledger = ledger();
        let subject = student_subject();
        // Unknown subject: count is zero, others unavailable.
        assert_eq!(
            ledger.aggregate(&subject, "attendance", AggregateKind::Count),
            Some(0.0)
        );
        assert_eq!(
            ledger.aggregate(&subject, "attendance", AggregateKind::Latest),
            None
        );
        // Known subject, non-numeric latest value.
        ledger.append(&subject, "grade", "A", &faculty()).unwrap();
        assert_eq!(ledger.aggregate(&subject, "grade", AggregateKind::Latest), None);
        assert_eq!(ledger.aggregate(&subject, "grade", AggregateKind::Average), None);
    }

    #[test]
    fn test_verify_chain_ok_and_after_tamper() {
        let ledger = ledger();
        let subject = student_subject();
        for v in ["60", "70", "80", "90"] {
            ledger.append(&subject, "attendance", v, &faculty()).unwrap();
        }
        assert_eq!(
            ledger.verify_chain(&subject),
            ChainVerification::Ok { length: 4 }
        );

        ledger.tamper_with(&subject, 2, |r| r.value = "100".into());
        assert_eq!(
            ledger.verify_chain(&subject),
            ChainVerification::Divergent {
                index: 2,
                kind: DivergenceKind::HashMismatch,
            }
        );
    }

    #[test]
    fn test_require_intact() {
        let ledger = ledger();
        let subject = student_subject();
        ledger.append(&subject, "attendance", "80", &faculty()).unwrap();
        assert_eq!(ledger.require_intact(&subject).unwrap(), 1);

        ledger.tamper_with(&subject, 0, |r| r.value = "0".into());
        assert!(matches!(
            ledger.require_intact(&subject),
            Err(LedgerError::ChainIntegrity { index: 0, .. })
        ));
    }

    #[test]
    fn test_concurrent_appends_never_fork() {
        // Arbitrary interleavings of same-subject appends must always
        // yield previous_hash(n) == data_hash(n-1).
        let ledger = ledger();
        let subject = student_subject();
        let mut handles = Vec::new();
        for t in 0..8 {
            let ledger = ledger.clone();
            let subject = subject.clone();
            handles.push(std::thread::spawn(move || {
                let issuer = Actor::new(format!("faculty_{t}"), Role::Faculty);
                for i in 0..50 {
                    ledger
                        .append(&subject, "attendance", &format!("{}", i % 100), &issuer)
                        .unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let records = ledger.records(&subject);
        assert_eq!(records.len(), 400);
        assert_eq!(
            ledger.verify_chain(&subject),
            ChainVerification::Ok { length: 400 }
        );
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.seq, i as u64);
            if i == 0 {
                assert_eq!(record.previous_hash, GENESIS_HASH);
            } else {
                assert_eq!(record.previous_hash, records[i - 1].data_hash);
            }
        }
    }

    #[test]
    fn test_correction_is_a_new_record() {
        // No mutation API exists; a correction appends and the chain
        // keeps its history.
        let ledger = ledger();
        let subject = student_subject();
        ledger.append(&subject, "grade", "55", &faculty()).unwrap();
        ledger.append(&subject, "grade", "85", &faculty()).unwrap();
        let records = ledger.records(&subject);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value, "55");
        assert_eq!(
            ledger.aggregate(&subject, "grade", AggregateKind::Latest),
            Some(85.0)
        );
    }

    #[test]
    fn test_aggregate_kind_parse() {
        assert_eq!(AggregateKind::parse("latest").unwrap(), AggregateKind::Latest);
        assert_eq!(AggregateKind::parse("COUNT").unwrap(), AggregateKind::Count);
        assert!(AggregateKind::parse("median").is_err());
    }
}
