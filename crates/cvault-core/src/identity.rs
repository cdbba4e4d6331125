//! # Domain Identity Newtypes and the Actor Model
//!
//! Newtype wrappers for every identifier namespace in the ChronoVault
//! Stack — you cannot pass a `SubjectId` where a `VaultId` is expected.
//!
//! The actor model is deliberately minimal: an [`ActorId`] (opaque
//! username issued by the external identity oracle) plus a [`Role`].
//! Authorization decisions in the escrow and ledger crates are made from
//! these two values alone; no session token or login state ever reaches
//! the core.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an escrow vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultId(pub Uuid);

/// Unique identifier for a condition within a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionId(pub Uuid);

/// Identifier for a ledger subject (the person a record chain is about).
///
/// Subjects are named by the external identity oracle; the ledger treats
/// the value as opaque. Each subject owns an isolated hash chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectId(pub String);

/// Identifier for an acting party (owner, approver, requester, issuer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl VaultId {
    /// Generate a new random vault identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for VaultId {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionId {
    /// Generate a new random condition identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ConditionId {
    fn default() -> Self {
        Self::new()
    }
}

impl SubjectId {
    /// Wrap a subject name.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The subject name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ActorId {
    /// Wrap an actor name.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The actor name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VaultId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vault:{}", self.0)
    }
}

impl std::fmt::Display for ConditionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "condition:{}", self.0)
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "subject:{}", self.0)
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Roles ───────────────────────────────────────────────────────────

/// The role an actor holds, as asserted by the external identity oracle.
///
/// Roles gate who may issue ledger records, grant approvals, and revoke
/// or delete vaults. The core never verifies credentials — it trusts the
/// role the collaborator passed in and enforces policy on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Administrative actor: may revoke/delete any vault, append records.
    Admin,
    /// Teaching staff: may append records and grant approvals.
    Faculty,
    /// Credential subject: owns vaults, receives released keys.
    Student,
    /// Read-only third party checking a credential.
    Verifier,
}

impl Role {
    /// Whether this role may grant approval conditions.
    pub fn may_approve(&self) -> bool {
        matches!(self, Self::Admin | Self::Faculty)
    }

    /// Whether this role may append ledger records.
    pub fn may_issue_records(&self) -> bool {
        matches!(self, Self::Admin | Self::Faculty)
    }

    /// Whether this role carries administrative override powers.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Parse a role from its lowercase wire name.
    pub fn parse(s: &str) -> Result<Self, crate::CoreError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "faculty" => Ok(Self::Faculty),
            "student" => Ok(Self::Student),
            "verifier" => Ok(Self::Verifier),
            other => Err(crate::CoreError::Parse(format!("unknown role: {other:?}"))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Admin => "admin",
            Self::Faculty => "faculty",
            Self::Student => "student",
            Self::Verifier => "verifier",
        };
        f.write_str(s)
    }
}

// ─── Actor ───────────────────────────────────────────────────────────

/// An acting identity: who is calling, and in what role.
///
/// Passed explicitly into every state-changing operation. Constructed at
/// the service boundary from collaborator-supplied values; the core never
/// fabricates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting identity.
    pub id: ActorId,
    /// The role asserted for this call.
    pub role: Role,
}

impl Actor {
    /// Build an actor value from its parts.
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: ActorId::new(id),
            role,
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_id_display() {
        let id = VaultId::new();
        let s = id.to_string();
        assert!(s.starts_with("vault:"));
    }

    #[test]
    fn test_ids_are_distinct() {
        assert_ne!(VaultId::new(), VaultId::new());
        assert_ne!(ConditionId::new(), ConditionId::new());
    }

    #[test]
    fn test_role_parse_roundtrip() {
        for role in [Role::Admin, Role::Faculty, Role::Student, Role::Verifier] {
            assert_eq!(Role::parse(&role.to_string()).unwrap(), role);
        }
    }

    #[test]
    fn test_role_parse_case_insensitive() {
        assert_eq!(Role::parse("FACULTY").unwrap(), Role::Faculty);
        assert_eq!(Role::parse(" Admin ").unwrap(), Role::Admin);
    }

    #[test]
    fn test_role_parse_unknown() {
        assert!(Role::parse("professor").is_err());
        assert!(Role::parse("").is_err());
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.may_approve());
        assert!(Role::Faculty.may_approve());
        assert!(!Role::Student.may_approve());
        assert!(!Role::Verifier.may_approve());

        assert!(Role::Faculty.may_issue_records());
        assert!(!Role::Verifier.may_issue_records());

        assert!(Role::Admin.is_admin());
        assert!(!Role::Faculty.is_admin());
    }

    #[test]
    fn test_actor_display() {
        let actor = Actor::new("faculty_x", Role::Faculty);
        assert_eq!(actor.to_string(), "faculty_x (faculty)");
    }

    #[test]
    fn test_role_serde_wire_names() {
        let json = serde_json::to_string(&Role::Faculty).unwrap();
        assert_eq!(json, "\"faculty\"");
        let back: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(back, Role::Admin);
    }

    #[test]
    fn test_subject_id_serde_roundtrip() {
        let subject = SubjectId::new("student_42");
        let json = serde_json::to_string(&subject).unwrap();
        let parsed: SubjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, subject);
    }
}
