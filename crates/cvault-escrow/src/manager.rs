//! # Vault Manager
//!
//! Owns every vault and the only mutable handles to them. All
//! state-changing operations run under the target vault's own mutex and
//! mirror their outcome — success or refusal — to the audit sink.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use cvault_audit::{AuditAction, AuditEntry, AuditSink};
use cvault_conditions::{evaluate as evaluate_condition, Condition, ConditionSlot, Facts, ThresholdFacts};
use cvault_core::{Actor, ActorId, SubjectId, Timestamp, VaultId};
use cvault_ledger::{AggregateKind, Ledger};

use crate::error::EscrowError;
use crate::vault::{KeyMaterial, Vault, VaultSpec, VaultStatus, VaultView};

/// Audit identity for operations that take no caller (condition
/// re-evaluation can be triggered by anyone, including schedulers).
const SYSTEM_ACTOR: &str = "system";

/// Threshold facts backed by the live ledger, recomputed per call.
struct LedgerThresholds<'a> {
    ledger: &'a Ledger,
    subject: SubjectId,
}

impl ThresholdFacts for LedgerThresholds<'_> {
    fn aggregate(&self, metric: &str) -> Option<f64> {
        self.ledger.aggregate(&self.subject, metric, AggregateKind::Latest)
    }
}

/// The Vault Manager. Cloning yields another handle to the same vaults.
#[derive(Clone)]
pub struct VaultManager {
    vaults: Arc<RwLock<HashMap<VaultId, Arc<Mutex<Vault>>>>>,
    ledger: Ledger,
    audit: Arc<dyn AuditSink>,
}

impl VaultManager {
    /// Create a manager over the given ledger and audit sink.
    pub fn new(ledger: Ledger, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            vaults: Arc::new(RwLock::new(HashMap::new())),
            ledger,
            audit,
        }
    }

    /// The ledger backing threshold conditions.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn handle(&self, vault_id: VaultId) -> Result<Arc<Mutex<Vault>>, EscrowError> {
        self.vaults
            .read()
            .get(&vault_id)
            .cloned()
            .ok_or_else(|| EscrowError::NotFound(vault_id.to_string()))
    }

    fn audit_denied(&self, actor: &ActorId, target: String, operation: &str, reason: &str) {
        self.audit.record(AuditEntry::new(
            actor.clone(),
            AuditAction::AccessDenied,
            target,
            serde_json::json!({ "operation": operation, "reason": reason }),
        ));
    }

    // ─── create ──────────────────────────────────────────────────────

    /// Create a vault owned by `actor`, initially LOCKED.
    ///
    /// # Errors
    ///
    /// `Validation` if the spec carries no conditions — a vault with an
    /// empty condition set would unlock unconditionally.
    pub fn create(&self, actor: &Actor, spec: VaultSpec) -> Result<VaultId, EscrowError> {
        if spec.conditions.is_empty() {
            return Err(EscrowError::Validation(
                "a vault requires at least one release condition".into(),
            ));
        }

        let vault = Vault {
            id: VaultId::new(),
            owner: actor.id.clone(),
            beneficiary: spec.beneficiary,
            ciphertext_ref: spec.ciphertext_ref,
            key: spec.key,
            conditions: spec.conditions.into_iter().map(ConditionSlot::new).collect(),
            status: VaultStatus::Locked,
            created_at: Timestamp::now(),
        };
        let vault_id = vault.id;
        let descriptions: Vec<String> =
            vault.conditions.iter().map(|s| s.condition.describe()).collect();

        self.vaults
            .write()
            .insert(vault_id, Arc::new(Mutex::new(vault)));

        tracing::info!(vault = %vault_id, owner = %actor.id, "vault created");
        self.audit.record(AuditEntry::new(
            actor.id.clone(),
            AuditAction::VaultCreated,
            vault_id.to_string(),
            serde_json::json!({ "conditions": descriptions }),
        ));
        Ok(vault_id)
    }

    // ─── evaluate ────────────────────────────────────────────────────

    /// Re-evaluate every condition and transition LOCKED → UNLOCKED when
    /// all hold. Idempotent with respect to the final state; safe to
    /// call arbitrarily often.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown vault; `AlreadyRevoked` for a revoked
    /// one (informational — the vault is unchanged); `ChainIntegrity`
    /// when a threshold's backing chain is damaged, in which case no
    /// condition state changes.
    pub fn evaluate(&self, vault_id: VaultId) -> Result<VaultStatus, EscrowError> {
        self.evaluate_at(vault_id, Timestamp::now())
    }

    fn evaluate_at(&self, vault_id: VaultId, now: Timestamp) -> Result<VaultStatus, EscrowError> {
        let system = ActorId::new(SYSTEM_ACTOR);
        let handle = self.handle(vault_id)?;
        let mut vault = handle.lock();

        if vault.status == VaultStatus::Revoked {
            self.audit_denied(&system, vault_id.to_string(), "evaluate", "vault is revoked");
            return Err(EscrowError::AlreadyRevoked(vault_id));
        }

        // Threshold facts are only trustworthy over an intact chain;
        // refuse to evaluate against tampered history.
        let subject = vault.threshold_subject();
        if vault.has_threshold_conditions() {
            if let Err(damage) = self.ledger.require_intact(&subject) {
                self.audit.record(AuditEntry::new(
                    system.clone(),
                    AuditAction::AccessDenied,
                    vault_id.to_string(),
                    serde_json::json!({ "operation": "evaluate", "reason": damage.to_string() }),
                ));
                return Err(EscrowError::ChainIntegrity(damage));
            }
        }

        let thresholds = LedgerThresholds {
            ledger: &self.ledger,
            subject,
        };
        let facts = Facts {
            now,
            thresholds: &thresholds,
        };
        for slot in &mut vault.conditions {
            let result = evaluate_condition(&slot.condition, &slot.state, &facts);
            slot.state.absorb(result, now);
        }

        let met = vault.conditions.iter().filter(|s| s.state.met).count();
        let total = vault.conditions.len();
        let unlocked_now = vault.status == VaultStatus::Locked && vault.all_conditions_met();
        if unlocked_now {
            vault.status = VaultStatus::Unlocked;
        }
        let status = vault.status;
        drop(vault);

        self.audit.record(AuditEntry::new(
            system.clone(),
            AuditAction::VaultEvaluated,
            vault_id.to_string(),
            serde_json::json!({ "met": met, "total": total, "status": status.to_string() }),
        ));
        if unlocked_now {
            tracing::info!(vault = %vault_id, "all conditions met, vault unlocked");
            self.audit.record(AuditEntry::new(
                system,
                AuditAction::VaultUnlocked,
                vault_id.to_string(),
                serde_json::json!({}),
            ));
        }
        Ok(status)
    }

    // ─── release_key ─────────────────────────────────────────────────

    /// Release the escrowed key to an authorized requester of an
    /// UNLOCKED vault. Repeated calls return byte-identical material —
    /// the key never rotates after unlock.
    ///
    /// # Errors
    ///
    /// `AlreadyRevoked`, then `Unauthorized` (requester is neither owner
    /// nor beneficiary — checked before the status so strangers learn
    /// nothing about it), then `NotUnlocked`. Every refusal is audited.
    pub fn release_key(
        &self,
        vault_id: VaultId,
        requester: &Actor,
    ) -> Result<KeyMaterial, EscrowError> {
        let handle = self.handle(vault_id)?;
        let vault = handle.lock();

        if vault.status == VaultStatus::Revoked {
            self.audit_denied(&requester.id, vault_id.to_string(), "release_key", "vault is revoked");
            return Err(EscrowError::AlreadyRevoked(vault_id));
        }
        if !vault.is_release_recipient(&requester.id) {
            self.audit_denied(
                &requester.id,
                vault_id.to_string(),
                "release_key",
                "requester is neither owner nor beneficiary",
            );
            return Err(EscrowError::Unauthorized(format!(
                "{} may not receive this key",
                requester.id
            )));
        }
        if vault.status != VaultStatus::Unlocked {
            self.audit_denied(&requester.id, vault_id.to_string(), "release_key", "vault is locked");
            return Err(EscrowError::NotUnlocked(vault_id));
        }

        let key = vault.key.clone();
        drop(vault);

        tracing::info!(vault = %vault_id, requester = %requester.id, "key released");
        self.audit.record(AuditEntry::new(
            requester.id.clone(),
            AuditAction::KeyReleased,
            vault_id.to_string(),
            serde_json::json!({}),
        ));
        Ok(key)
    }

    // ─── grant_approval ──────────────────────────────────────────────

    /// Grant an approval condition. One-shot: a repeated grant by an
    /// authorized approver is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the approver's role may not approve, or the
    /// condition names a different approver; `NotFound` for an unknown
    /// condition; `Validation` if the condition is not an approval.
    pub fn grant_approval(
        &self,
        vault_id: VaultId,
        condition_id: cvault_core::ConditionId,
        approver: &Actor,
    ) -> Result<(), EscrowError> {
        let handle = self.handle(vault_id)?;
        let mut vault = handle.lock();

        if vault.status == VaultStatus::Revoked {
            self.audit_denied(&approver.id, vault_id.to_string(), "grant_approval", "vault is revoked");
            return Err(EscrowError::AlreadyRevoked(vault_id));
        }

        let slot_index = vault
            .conditions
            .iter()
            .position(|slot| slot.id == condition_id)
            .ok_or_else(|| EscrowError::NotFound(condition_id.to_string()))?;

        let required = match &vault.conditions[slot_index].condition {
            Condition::Approval { required_approver } => required_approver.clone(),
            _ => {
                return Err(EscrowError::Validation(format!(
                    "{condition_id} is not an approval condition"
                )))
            }
        };

        if !approver.role.may_approve() {
            let reason = format!("role {} may not grant approvals", approver.role);
            drop(vault);
            self.audit_denied(&approver.id, vault_id.to_string(), "grant_approval", &reason);
            return Err(EscrowError::Unauthorized(reason));
        }
        if let Some(required) = required {
            if required != approver.id {
                let reason = format!("approval is reserved for {required}");
                drop(vault);
                self.audit_denied(&approver.id, vault_id.to_string(), "grant_approval", &reason);
                return Err(EscrowError::Unauthorized(reason));
            }
        }

        if vault.conditions[slot_index].state.granted_by.is_some() {
            return Ok(());
        }

        let slot = &mut vault.conditions[slot_index];
        slot.state.granted_by = Some(approver.id.clone());
        slot.state.absorb(true, Timestamp::now());
        drop(vault);

        tracing::info!(vault = %vault_id, condition = %condition_id, approver = %approver.id, "approval granted");
        self.audit.record(AuditEntry::new(
            approver.id.clone(),
            AuditAction::ApprovalGranted,
            vault_id.to_string(),
            serde_json::json!({ "condition": condition_id.to_string() }),
        ));
        Ok(())
    }

    // ─── revoke ──────────────────────────────────────────────────────

    /// Revoke a vault: owner or admin only; any non-terminal status
    /// transitions to REVOKED, after which release always fails.
    pub fn revoke(&self, vault_id: VaultId, actor: &Actor) -> Result<(), EscrowError> {
        let handle = self.handle(vault_id)?;
        let mut vault = handle.lock();

        if vault.owner != actor.id && !actor.role.is_admin() {
            drop(vault);
            self.audit_denied(&actor.id, vault_id.to_string(), "revoke", "only the owner or an admin may revoke");
            return Err(EscrowError::Unauthorized(
                "only the owner or an admin may revoke".into(),
            ));
        }
        if vault.status == VaultStatus::Revoked {
            return Err(EscrowError::AlreadyRevoked(vault_id));
        }

        let previous = vault.status;
        vault.status = VaultStatus::Revoked;
        drop(vault);

        tracing::warn!(vault = %vault_id, actor = %actor.id, "vault revoked");
        self.audit.record(AuditEntry::new(
            actor.id.clone(),
            AuditAction::VaultRevoked,
            vault_id.to_string(),
            serde_json::json!({ "previous_status": previous.to_string() }),
        ));
        Ok(())
    }

    // ─── delete ──────────────────────────────────────────────────────

    /// Irreversibly remove a vault and its key material. The terminal
    /// audit entry is written before removal and survives it.
    pub fn delete(&self, vault_id: VaultId, actor: &Actor) -> Result<(), EscrowError> {
        // Map write lock first, then the vault mutex — the same order
        // every writer uses, so a holder of the vault lock can finish.
        let mut vaults = self.vaults.write();
        let handle = vaults
            .get(&vault_id)
            .cloned()
            .ok_or_else(|| EscrowError::NotFound(vault_id.to_string()))?;
        let vault = handle.lock();

        if vault.owner != actor.id && !actor.role.is_admin() {
            drop(vault);
            drop(vaults);
            self.audit_denied(&actor.id, vault_id.to_string(), "delete", "only the owner or an admin may delete");
            return Err(EscrowError::Unauthorized(
                "only the owner or an admin may delete".into(),
            ));
        }

        self.audit.record(AuditEntry::new(
            actor.id.clone(),
            AuditAction::VaultDeleted,
            vault_id.to_string(),
            serde_json::json!({ "status_at_deletion": vault.status.to_string() }),
        ));
        drop(vault);
        vaults.remove(&vault_id);
        tracing::warn!(vault = %vault_id, actor = %actor.id, "vault deleted");
        Ok(())
    }

    // ─── reads ───────────────────────────────────────────────────────

    /// A key-free view of one vault.
    pub fn get(&self, vault_id: VaultId) -> Result<VaultView, EscrowError> {
        let handle = self.handle(vault_id)?;
        let vault = handle.lock();
        Ok(VaultView::from(&*vault))
    }

    /// Key-free views of every vault `actor` owns or benefits from,
    /// newest first.
    pub fn list_for(&self, actor: &ActorId) -> Vec<VaultView> {
        let handles: Vec<_> = self.vaults.read().values().cloned().collect();
        let mut views: Vec<VaultView> = handles
            .iter()
            .map(|handle| handle.lock())
            .filter(|vault| vault.owner == *actor || vault.beneficiary.as_ref() == Some(actor))
            .map(|vault| VaultView::from(&*vault))
            .collect();
        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        views
    }
}

impl std::fmt::Debug for VaultManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultManager")
            .field("vaults", &self.vaults.read().len())
            .finish()
    }
}
