//! # Vault Types — Status, Key Material, Views
//!
//! The vault record itself plus the types that cross its boundary: the
//! creation spec coming in, and the key-free views going out.

use serde::{Deserialize, Serialize};

use cvault_conditions::{Condition, ConditionSlot};
use cvault_core::{ActorId, ContentRef, SubjectId, Timestamp, VaultId};

use crate::error::EscrowError;

// ─── Status ──────────────────────────────────────────────────────────

/// The lifecycle status of a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VaultStatus {
    /// At least one condition is (or was last known) unmet.
    Locked,
    /// Every condition held at some evaluation; the key is releasable.
    Unlocked,
    /// Explicitly revoked by the issuer or an administrator. Terminal.
    Revoked,
}

impl VaultStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked)
    }
}

impl std::fmt::Display for VaultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Locked => "LOCKED",
            Self::Unlocked => "UNLOCKED",
            Self::Revoked => "REVOKED",
        };
        f.write_str(s)
    }
}

// ─── Key material ────────────────────────────────────────────────────

/// Escrowed key bytes. Opaque to the stack: generated by the external
/// randomness source, stored here, released verbatim.
///
/// `Debug` redacts; serialization is lowercase hex (used only on the
/// release path, never in vault views).
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial(Vec<u8>);

impl KeyMaterial {
    /// Wrap key bytes. Empty keys are rejected.
    pub fn new(bytes: Vec<u8>) -> Result<Self, EscrowError> {
        if bytes.is_empty() {
            return Err(EscrowError::Validation("key material must be non-empty".into()));
        }
        Ok(Self(bytes))
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse from lowercase/uppercase hex.
    pub fn from_hex(s: &str) -> Result<Self, EscrowError> {
        let s = s.trim();
        if s.is_empty() || s.len() % 2 != 0 {
            return Err(EscrowError::Validation(format!(
                "key hex must be a non-empty even-length string, got {} chars",
                s.len()
            )));
        }
        let mut bytes = Vec::with_capacity(s.len() / 2);
        for chunk in s.as_bytes().chunks(2) {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| EscrowError::Validation("key hex is not ASCII".into()))?;
            let byte = u8::from_str_radix(pair, 16)
                .map_err(|_| EscrowError::Validation(format!("invalid key hex pair {pair:?}")))?;
            bytes.push(byte);
        }
        Self::new(bytes)
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyMaterial(<{} bytes redacted>)", self.0.len())
    }
}

impl Serialize for KeyMaterial {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for KeyMaterial {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ─── Vault ───────────────────────────────────────────────────────────

/// A unit of escrow: one key, one ciphertext reference, and the
/// conditions gating release.
///
/// Owned exclusively by the Vault Manager; its conditions never outlive
/// it. Field mutation happens only under the manager's per-vault lock.
#[derive(Debug, Clone)]
pub struct Vault {
    /// Vault identity.
    pub id: VaultId,
    /// The issuer who created the vault and escrowed the key.
    pub owner: ActorId,
    /// The intended recipient, if different from the owner.
    pub beneficiary: Option<ActorId>,
    /// Content-addressed reference to the externally stored ciphertext.
    pub ciphertext_ref: ContentRef,
    /// The escrowed key. Never rotates after creation.
    pub key: KeyMaterial,
    /// Ordered release conditions. All must hold to unlock.
    pub conditions: Vec<ConditionSlot>,
    /// Current lifecycle status.
    pub status: VaultStatus,
    /// Creation time.
    pub created_at: Timestamp,
}

impl Vault {
    /// Whether `actor` may receive the released key.
    pub fn is_release_recipient(&self, actor: &ActorId) -> bool {
        *actor == self.owner || self.beneficiary.as_ref() == Some(actor)
    }

    /// Whether every condition currently holds.
    pub fn all_conditions_met(&self) -> bool {
        self.conditions.iter().all(|slot| slot.state.met)
    }

    /// The ledger subject whose records back threshold conditions:
    /// the beneficiary when set, else the owner.
    pub fn threshold_subject(&self) -> SubjectId {
        let who = self.beneficiary.as_ref().unwrap_or(&self.owner);
        SubjectId::new(who.as_str())
    }

    /// Whether any condition needs ledger aggregates.
    pub fn has_threshold_conditions(&self) -> bool {
        self.conditions
            .iter()
            .any(|slot| matches!(slot.condition, Condition::Threshold { .. }))
    }
}

// ─── Creation spec ───────────────────────────────────────────────────

/// Everything needed to create a vault. The owner is the calling actor,
/// supplied separately — a spec cannot assert its own issuer.
#[derive(Debug, Clone, Deserialize)]
pub struct VaultSpec {
    /// Intended recipient, if any.
    pub beneficiary: Option<ActorId>,
    /// Reference to the externally stored ciphertext.
    pub ciphertext_ref: ContentRef,
    /// The key to escrow.
    pub key: KeyMaterial,
    /// Release conditions; at least one is required.
    pub conditions: Vec<Condition>,
}

// ─── Views ───────────────────────────────────────────────────────────

/// A condition as exposed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionView {
    /// Condition identity within the vault.
    pub id: cvault_core::ConditionId,
    /// The release requirement.
    pub condition: Condition,
    /// Whether it currently holds.
    pub met: bool,
    /// Who granted it, for approvals.
    pub granted_by: Option<ActorId>,
    /// Human description.
    pub description: String,
}

/// A vault as exposed to callers: everything except the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultView {
    /// Vault identity.
    pub id: VaultId,
    /// The issuer.
    pub owner: ActorId,
    /// The intended recipient, if any.
    pub beneficiary: Option<ActorId>,
    /// Ciphertext reference.
    pub ciphertext_ref: ContentRef,
    /// Current status.
    pub status: VaultStatus,
    /// Creation time.
    pub created_at: Timestamp,
    /// The conditions and their states.
    pub conditions: Vec<ConditionView>,
}

impl From<&Vault> for VaultView {
    fn from(vault: &Vault) -> Self {
        Self {
            id: vault.id,
            owner: vault.owner.clone(),
            beneficiary: vault.beneficiary.clone(),
            ciphertext_ref: vault.ciphertext_ref.clone(),
            status: vault.status,
            created_at: vault.created_at,
            conditions: vault
                .conditions
                .iter()
                .map(|slot| ConditionView {
                    id: slot.id,
                    condition: slot.condition.clone(),
                    met: slot.state.met,
                    granted_by: slot.state.granted_by.clone(),
                    description: slot.condition.describe(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminality() {
        assert!(!VaultStatus::Locked.is_terminal());
        assert!(!VaultStatus::Unlocked.is_terminal());
        assert!(VaultStatus::Revoked.is_terminal());
    }

    #[test]
    fn test_status_display_and_serde() {
        assert_eq!(VaultStatus::Locked.to_string(), "LOCKED");
        assert_eq!(VaultStatus::Unlocked.to_string(), "UNLOCKED");
        assert_eq!(VaultStatus::Revoked.to_string(), "REVOKED");
        let json = serde_json::to_string(&VaultStatus::Unlocked).unwrap();
        assert_eq!(json, "\"UNLOCKED\"");
    }

    #[test]
    fn test_key_material_rejects_empty() {
        assert!(KeyMaterial::new(Vec::new()).is_err());
    }

    #[test]
    fn test_key_material_hex_roundtrip() {
        let key = KeyMaterial::new(vec![0xde, 0xad, 0xbe, 0xef]).unwrap();
        assert_eq!(key.to_hex(), "deadbeef");
        assert_eq!(KeyMaterial::from_hex("deadbeef").unwrap(), key);
        assert_eq!(KeyMaterial::from_hex("DEADBEEF").unwrap(), key);
    }

    #[test]
    fn test_key_material_from_hex_rejects_malformed() {
        assert!(KeyMaterial::from_hex("").is_err());
        assert!(KeyMaterial::from_hex("abc").is_err());
        assert!(KeyMaterial::from_hex("zz").is_err());
    }

    #[test]
    fn test_key_material_debug_redacts() {
        let key = KeyMaterial::new(vec![1, 2, 3]).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("redacted"));
        assert!(!debug.contains("01"));
        assert!(!debug.contains('1'));
    }

    #[test]
    fn test_key_material_serde() {
        let key = KeyMaterial::new(vec![0xab, 0xcd]).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"abcd\"");
        let back: KeyMaterial = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    fn sample_vault() -> Vault {
        Vault {
            id: VaultId::new(),
            owner: ActorId::new("issuer"),
            beneficiary: Some(ActorId::new("student_a")),
            ciphertext_ref: ContentRef::from_bytes(b"ciphertext"),
            key: KeyMaterial::new(vec![1, 2, 3]).unwrap(),
            conditions: vec![ConditionSlot::new(Condition::Approval {
                required_approver: None,
            })],
            status: VaultStatus::Locked,
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn test_release_recipients() {
        let vault = sample_vault();
        assert!(vault.is_release_recipient(&ActorId::new("issuer")));
        assert!(vault.is_release_recipient(&ActorId::new("student_a")));
        assert!(!vault.is_release_recipient(&ActorId::new("stranger")));
    }

    #[test]
    fn test_threshold_subject_prefers_beneficiary() {
        let mut vault = sample_vault();
        assert_eq!(vault.threshold_subject(), SubjectId::new("student_a"));
        vault.beneficiary = None;
        assert_eq!(vault.threshold_subject(), SubjectId::new("issuer"));
    }

    #[test]
    fn test_view_carries_no_key() {
        let vault = sample_vault();
        let view = VaultView::from(&vault);
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains(&vault.key.to_hex()));
        assert_eq!(view.conditions.len(), 1);
        assert!(!view.conditions[0].met);
    }
}
