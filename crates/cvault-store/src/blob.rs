//! # Content-Addressed Blob Store Contract
//!
//! ## Invariant
//!
//! A blob is named by the SHA-256 of its bytes. `get` re-verifies the
//! digest of whatever the backend returned against the requested
//! reference, so corruption and substitution both surface as
//! [`StorageError::Corrupt`] rather than as silently wrong ciphertext.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use cvault_core::ContentRef;

/// Errors from the storage collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No blob exists under the requested reference.
    #[error("blob not found: {0}")]
    NotFound(String),

    /// The backend returned bytes whose digest does not match the
    /// requested reference.
    #[error("blob corrupt: stored bytes do not match {0}")]
    Corrupt(String),

    /// A transient backend failure (timeout, connection reset). Eligible
    /// for bounded-backoff retry.
    #[error("transient storage failure: {0}")]
    Transient(String),

    /// A permanent backend failure. Never retried.
    #[error("storage failure: {0}")]
    Permanent(String),
}

impl StorageError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// A content-addressed blob store.
///
/// Implementations must be safe to call from concurrent request handlers.
pub trait BlobStore: Send + Sync {
    /// Store bytes, returning the reference that names them.
    ///
    /// Storing the same bytes twice returns the same reference.
    fn put(&self, data: &[u8]) -> Result<ContentRef, StorageError>;

    /// Retrieve the bytes named by `reference`, re-verifying the digest.
    fn get(&self, reference: &ContentRef) -> Result<Vec<u8>, StorageError>;

    /// Whether a blob exists under `reference`.
    fn contains(&self, reference: &ContentRef) -> bool;
}

/// An optional external notarization sink for chain digests.
///
/// The hash chain's tamper evidence is self-contained; notarization adds
/// an external anchor but is never load-bearing.
pub trait NotarySink: Send + Sync {
    /// Record a digest with the external notary.
    fn notarize(&self, digest_hex: &str) -> Result<(), StorageError>;
}

/// The default notary: accepts everything, anchors nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotary;

impl NotarySink for NullNotary {
    fn notarize(&self, _digest_hex: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

// ─── In-memory implementation ────────────────────────────────────────

/// In-process blob store keyed by content digest.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<ContentRef, Vec<u8>>>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, data: &[u8]) -> Result<ContentRef, StorageError> {
        let reference = ContentRef::from_bytes(data);
        self.blobs
            .write()
            .entry(reference.clone())
            .or_insert_with(|| data.to_vec());
        Ok(reference)
    }

    fn get(&self, reference: &ContentRef) -> Result<Vec<u8>, StorageError> {
        let data = self
            .blobs
            .read()
            .get(reference)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(reference.to_string()))?;
        if !reference.matches(&data) {
            return Err(StorageError::Corrupt(reference.to_string()));
        }
        Ok(data)
    }

    fn contains(&self, reference: &ContentRef) -> bool {
        self.blobs.read().contains_key(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_roundtrip() {
        let store = MemoryBlobStore::new();
        let reference = store.put(b"encrypted certificate bytes").unwrap();
        assert_eq!(store.get(&reference).unwrap(), b"encrypted certificate bytes");
        assert!(store.contains(&reference));
    }

    #[test]
    fn test_put_is_idempotent() {
        let store = MemoryBlobStore::new();
        let a = store.put(b"same bytes").unwrap();
        let b = store.put(b"same bytes").unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_unknown_reference() {
        let store = MemoryBlobStore::new();
        let reference = ContentRef::from_bytes(b"never stored");
        assert_eq!(
            store.get(&reference),
            Err(StorageError::NotFound(reference.to_string()))
        );
    }

    #[test]
    fn test_get_detects_corruption() {
        let store = MemoryBlobStore::new();
        let reference = store.put(b"original").unwrap();
        // Corrupt the stored bytes behind the store's back.
        store
            .blobs
            .write()
            .insert(reference.clone(), b"tampered".to_vec());
        assert_eq!(
            store.get(&reference),
            Err(StorageError::Corrupt(reference.to_string()))
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(StorageError::Transient("timeout".into()).is_transient());
        assert!(!StorageError::Permanent("disk gone".into()).is_transient());
        assert!(!StorageError::NotFound("x".into()).is_transient());
        assert!(!StorageError::Corrupt("x".into()).is_transient());
    }

    #[test]
    fn test_null_notary_accepts() {
        assert!(NullNotary.notarize("ab").is_ok());
    }
}
