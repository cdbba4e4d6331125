//! # Audit Trail — Entries, Actions, and the Shared Sink
//!
//! ## Invariant
//!
//! The trail is strictly append-only. There is no update, trim, or delete
//! path — a deployment that needs bounded memory must drain to durable
//! storage upstream of this type, not discard history.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use cvault_core::{ActorId, Timestamp};

// ─── Actions ─────────────────────────────────────────────────────────

/// The kind of event an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A vault was created with its conditions.
    VaultCreated,
    /// A vault's conditions were re-evaluated.
    VaultEvaluated,
    /// A vault transitioned LOCKED → UNLOCKED.
    VaultUnlocked,
    /// Escrowed key material was released to an authorized requester.
    KeyReleased,
    /// An approval condition was granted.
    ApprovalGranted,
    /// A vault was revoked by its issuer or an administrator.
    VaultRevoked,
    /// A vault and its key material were removed.
    VaultDeleted,
    /// A record was appended to a subject's ledger chain.
    RecordAppended,
    /// A subject's chain was verified.
    ChainVerified,
    /// An operation was refused (authorization, validation, or state).
    AccessDenied,
}

impl AuditAction {
    /// The snake_case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VaultCreated => "vault_created",
            Self::VaultEvaluated => "vault_evaluated",
            Self::VaultUnlocked => "vault_unlocked",
            Self::KeyReleased => "key_released",
            Self::ApprovalGranted => "approval_granted",
            Self::VaultRevoked => "vault_revoked",
            Self::VaultDeleted => "vault_deleted",
            Self::RecordAppended => "record_appended",
            Self::ChainVerified => "chain_verified",
            Self::AccessDenied => "access_denied",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Entries ─────────────────────────────────────────────────────────

/// A single audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Who performed (or attempted) the action.
    pub actor: ActorId,
    /// What happened.
    pub action: AuditAction,
    /// The vault, subject, or chain the action targeted.
    pub target: String,
    /// When the entry was written.
    pub timestamp: Timestamp,
    /// Free-form structured detail (never key material).
    pub details: serde_json::Value,
}

impl AuditEntry {
    /// Build an entry stamped with the current time.
    pub fn new(
        actor: ActorId,
        action: AuditAction,
        target: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            actor,
            action,
            target: target.into(),
            timestamp: Timestamp::now(),
            details,
        }
    }
}

// ─── Sink trait ──────────────────────────────────────────────────────

/// Anything that accepts audit entries.
///
/// The escrow manager and ledger write through this trait; tests can
/// substitute their own collector.
pub trait AuditSink: Send + Sync {
    /// Append one entry. Must not fail — auditing is passive and a sink
    /// that cannot keep up must buffer or drop downstream, not error the
    /// operation being audited.
    fn record(&self, entry: AuditEntry);
}

/// A sink that discards everything. Useful for focused unit tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AuditSink for NullSink {
    fn record(&self, _entry: AuditEntry) {}
}

// ─── Trail ───────────────────────────────────────────────────────────

/// The in-memory append-only trail.
#[derive(Debug, Default)]
pub struct AuditTrail {
    entries: Vec<AuditEntry>,
}

impl AuditTrail {
    /// Create an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn append(&mut self, entry: AuditEntry) {
        tracing::debug!(action = %entry.action, target = %entry.target, actor = %entry.actor, "audit");
        self.entries.push(entry);
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the trail is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose target matches.
    pub fn entries_for_target(&self, target: &str) -> Vec<&AuditEntry> {
        self.entries.iter().filter(|e| e.target == target).collect()
    }

    /// Entries of one action kind.
    pub fn entries_by_action(&self, action: AuditAction) -> Vec<&AuditEntry> {
        self.entries.iter().filter(|e| e.action == action).collect()
    }

    /// The most recent `n` entries (all of them if fewer exist).
    pub fn last_n(&self, n: usize) -> &[AuditEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }
}

// ─── Shared handle ───────────────────────────────────────────────────

/// Thread-safe, cloneable handle to one process-wide trail.
///
/// The lock is `parking_lot`, not `tokio::sync` — it is never held across
/// an `.await` point.
#[derive(Debug, Clone, Default)]
pub struct SharedAuditTrail {
    inner: Arc<RwLock<AuditTrail>>,
}

impl SharedAuditTrail {
    /// Create a new empty shared trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the trail is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Snapshot of the most recent `n` entries.
    pub fn last_n(&self, n: usize) -> Vec<AuditEntry> {
        self.inner.read().last_n(n).to_vec()
    }

    /// Snapshot of entries for one target.
    pub fn entries_for_target(&self, target: &str) -> Vec<AuditEntry> {
        self.inner
            .read()
            .entries_for_target(target)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Snapshot of entries for one action kind.
    pub fn entries_by_action(&self, action: AuditAction) -> Vec<AuditEntry> {
        self.inner
            .read()
            .entries_by_action(action)
            .into_iter()
            .cloned()
            .collect()
    }
}

impl AuditSink for SharedAuditTrail {
    fn record(&self, entry: AuditEntry) {
        self.inner.write().append(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(actor: &str, action: AuditAction, target: &str) -> AuditEntry {
        AuditEntry::new(
            ActorId::new(actor),
            action,
            target,
            serde_json::json!({}),
        )
    }

    #[test]
    fn test_append_and_query() {
        let mut trail = AuditTrail::new();
        trail.append(entry("alice", AuditAction::VaultCreated, "vault:a"));
        trail.append(entry("bob", AuditAction::KeyReleased, "vault:a"));
        trail.append(entry("carol", AuditAction::RecordAppended, "subject:x"));

        assert_eq!(trail.len(), 3);
        assert_eq!(trail.entries_for_target("vault:a").len(), 2);
        assert_eq!(trail.entries_by_action(AuditAction::KeyReleased).len(), 1);
    }

    #[test]
    fn test_last_n() {
        let mut trail = AuditTrail::new();
        for i in 0..5 {
            trail.append(entry("alice", AuditAction::VaultEvaluated, &format!("vault:{i}")));
        }
        let last = trail.last_n(2);
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].target, "vault:3");
        assert_eq!(last[1].target, "vault:4");
        assert_eq!(trail.last_n(100).len(), 5);
        assert!(trail.last_n(0).is_empty());
    }

    #[test]
    fn test_nothing_is_ever_removed() {
        let mut trail = AuditTrail::new();
        for i in 0..10_000 {
            trail.append(entry("a", AuditAction::RecordAppended, &format!("s:{i}")));
        }
        assert_eq!(trail.len(), 10_000);
        assert_eq!(trail.entries()[0].target, "s:0");
    }

    #[test]
    fn test_shared_trail_is_cloneable_view() {
        let shared = SharedAuditTrail::new();
        let writer = shared.clone();
        writer.record(entry("alice", AuditAction::VaultRevoked, "vault:z"));
        assert_eq!(shared.len(), 1);
        assert_eq!(shared.entries_for_target("vault:z").len(), 1);
    }

    #[test]
    fn test_shared_trail_concurrent_writers() {
        let shared = SharedAuditTrail::new();
        let mut handles = Vec::new();
        for t in 0..8 {
            let sink = shared.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    sink.record(AuditEntry::new(
                        ActorId::new(format!("actor-{t}")),
                        AuditAction::VaultEvaluated,
                        format!("vault:{t}-{i}"),
                        serde_json::json!({}),
                    ));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(shared.len(), 800);
    }

    #[test]
    fn test_action_wire_names() {
        assert_eq!(AuditAction::VaultCreated.to_string(), "vault_created");
        assert_eq!(AuditAction::AccessDenied.to_string(), "access_denied");
        let json = serde_json::to_string(&AuditAction::KeyReleased).unwrap();
        assert_eq!(json, "\"key_released\"");
    }

    #[test]
    fn test_entry_serde_roundtrip() {
        let e = AuditEntry::new(
            ActorId::new("alice"),
            AuditAction::ApprovalGranted,
            "vault:a",
            serde_json::json!({"condition": "c1"}),
        );
        let json = serde_json::to_string(&e).unwrap();
        let parsed: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, e);
    }
}
