//! # Digest Helpers and Content References
//!
//! The single SHA-256 path for the stack, plus [`ContentRef`], the
//! content-addressed name of an externally stored ciphertext blob.
//!
//! ## Invariant
//!
//! Every hash in the system — ledger chain links and blob names alike —
//! is a lowercase 64-character hex SHA-256 digest. Parsing a
//! `ContentRef` validates that shape so malformed references are rejected
//! at the boundary rather than stored.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// Compute the lowercase hex SHA-256 digest of raw bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Whether a string is a well-formed lowercase 64-char hex digest.
pub fn is_hex_digest(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
}

/// A content-addressed reference to an externally stored blob.
///
/// The core never sees plaintext or ciphertext contents — only this
/// digest, which the blob-store collaborator computed over the stored
/// bytes. Retrieval re-verifies the digest (`cvault-store`), so a
/// `ContentRef` is self-authenticating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    /// Compute the reference naming the given bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(sha256_hex(data))
    }

    /// Parse a reference from its hex form, validating the shape.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let s = s.trim().to_ascii_lowercase();
        if !is_hex_digest(&s) {
            return Err(CoreError::Validation(format!(
                "content ref must be 64 hex chars, got {:?}",
                s
            )));
        }
        Ok(Self(s))
    }

    /// The digest as a hex string slice.
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Whether this reference names the given bytes.
    pub fn matches(&self, data: &[u8]) -> bool {
        sha256_hex(data) == self.0
    }
}

impl std::fmt::Display for ContentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_vector() {
        // sha256("") is a fixed constant.
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        assert_eq!(sha256_hex(b"transcript"), sha256_hex(b"transcript"));
        assert_ne!(sha256_hex(b"transcript"), sha256_hex(b"Transcript"));
    }

    #[test]
    fn test_content_ref_from_bytes_matches() {
        let data = b"ciphertext bytes";
        let cref = ContentRef::from_bytes(data);
        assert!(cref.matches(data));
        assert!(!cref.matches(b"other bytes"));
    }

    #[test]
    fn test_content_ref_parse_valid() {
        let hex = sha256_hex(b"x");
        let cref = ContentRef::parse(&hex).unwrap();
        assert_eq!(cref.as_hex(), hex);
    }

    #[test]
    fn test_content_ref_parse_normalizes_case() {
        let hex = sha256_hex(b"x").to_uppercase();
        let cref = ContentRef::parse(&hex).unwrap();
        assert_eq!(cref.as_hex(), hex.to_lowercase());
    }

    #[test]
    fn test_content_ref_parse_rejects_malformed() {
        assert!(ContentRef::parse("abc").is_err());
        assert!(ContentRef::parse(&"z".repeat(64)).is_err());
        assert!(ContentRef::parse("").is_err());
    }

    #[test]
    fn test_content_ref_display() {
        let cref = ContentRef::from_bytes(b"x");
        assert!(cref.to_string().starts_with("sha256:"));
        assert_eq!(cref.to_string().len(), 7 + 64);
    }

    #[test]
    fn test_content_ref_serde_transparent() {
        let cref = ContentRef::from_bytes(b"x");
        let json = serde_json::to_string(&cref).unwrap();
        assert_eq!(json, format!("\"{}\"", cref.as_hex()));
        let back: ContentRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cref);
    }
}
