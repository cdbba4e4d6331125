//! # Ledger Records and Chain Verification
//!
//! The record type, the chain-hash function, and the pure verification
//! walk. Everything here is side-effect free; the locking store lives in
//! [`crate::store`].

use serde::{Deserialize, Serialize};

use cvault_core::{sha256_hex, ActorId, SubjectId, Timestamp};

/// The `previous_hash` of the first record in every subject chain.
///
/// Fixed-width all-zero hex keeps every link the same shape, so a
/// malformed genesis link is structurally detectable.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// One immutable entry in a subject's chain.
///
/// Position is strictly increasing per subject (`seq`); the record never
/// changes after commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// The subject this record is about.
    pub subject: SubjectId,
    /// Record category (e.g. "attendance", "grade").
    pub category: String,
    /// Recorded value, kept as text; aggregation parses numerics on read.
    pub value: String,
    /// When the record was committed.
    pub timestamp: Timestamp,
    /// Who issued the record.
    pub issued_by: ActorId,
    /// 0-based position in the subject's chain.
    pub seq: u64,
    /// `data_hash` of the predecessor, or [`GENESIS_HASH`] for `seq` 0.
    pub previous_hash: String,
    /// Hash over this record's fields and `previous_hash`.
    pub data_hash: String,
}

/// Compute a record's `data_hash` from its fields.
///
/// Fields are joined with `'\n'` so distinct field tuples cannot collide
/// by concatenation. The timestamp enters in its canonical
/// `YYYY-MM-DDTHH:MM:SSZ` form.
pub fn chain_hash(
    subject: &SubjectId,
    category: &str,
    value: &str,
    timestamp: Timestamp,
    previous_hash: &str,
) -> String {
    let preimage = format!(
        "{}\n{}\n{}\n{}\n{}",
        subject.as_str(),
        category,
        value,
        timestamp.to_iso8601(),
        previous_hash
    );
    sha256_hex(preimage.as_bytes())
}

impl LedgerRecord {
    /// Recompute this record's hash from its stored fields.
    pub fn recompute_hash(&self) -> String {
        chain_hash(
            &self.subject,
            &self.category,
            &self.value,
            self.timestamp,
            &self.previous_hash,
        )
    }

    /// The record's value parsed as a number, if it is one.
    ///
    /// A trailing `%` is tolerated ("85%" reads as 85).
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.trim().trim_end_matches('%').trim().parse().ok()
    }
}

// ─── Verification ────────────────────────────────────────────────────

/// What went wrong at the earliest divergent record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceKind {
    /// The stored `data_hash` does not match the recomputation from the
    /// record's own fields — the record body was altered.
    HashMismatch,
    /// The record's `previous_hash` does not equal its predecessor's
    /// `data_hash` (or the genesis constant at index 0) — the chain was
    /// respliced.
    BrokenLink,
}

impl std::fmt::Display for DivergenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::HashMismatch => "hash_mismatch",
            Self::BrokenLink => "broken_link",
        };
        f.write_str(s)
    }
}

/// Outcome of a full chain walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChainVerification {
    /// Every link and every hash checks out.
    Ok {
        /// Number of records verified.
        length: usize,
    },
    /// The chain diverges; trust nothing at or after `index`.
    Divergent {
        /// 0-based index of the earliest bad record.
        index: usize,
        /// What kind of damage was found there.
        kind: DivergenceKind,
    },
}

impl ChainVerification {
    /// Whether the walk found no damage.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// Walk a chain from genesis to tip, reporting the earliest divergence.
///
/// Link checks run before hash checks at each index: a record whose
/// `previous_hash` was respliced reports `BrokenLink` even though its
/// own `data_hash` would also fail to recompute.
pub fn verify_records(records: &[LedgerRecord]) -> ChainVerification {
    let mut expected_prev = GENESIS_HASH.to_string();
    for (index, record) in records.iter().enumerate() {
        if record.previous_hash != expected_prev {
            return ChainVerification::Divergent {
                index,
                kind: DivergenceKind::BrokenLink,
            };
        }
        if record.recompute_hash() != record.data_hash {
            return ChainVerification::Divergent {
                index,
                kind: DivergenceKind::HashMismatch,
            };
        }
        expected_prev = record.data_hash.clone();
    }
    ChainVerification::Ok {
        length: records.len(),
    }
}
