//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Holds handles, not data: the domain crates
//! own their stores and locks.

use std::sync::Arc;

use cvault_audit::SharedAuditTrail;
use cvault_escrow::VaultManager;
use cvault_ledger::Ledger;
use cvault_store::{BlobStore, MemoryBlobStore, NotarySink, NullNotary, RetryPolicy};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The vault manager.
    pub manager: VaultManager,
    /// The hash-chain ledger.
    pub ledger: Ledger,
    /// The ciphertext blob collaborator.
    pub blobs: Arc<dyn BlobStore>,
    /// External notarization sink for chain anchors. Best-effort; chain
    /// integrity never depends on it.
    pub notary: Arc<dyn NotarySink>,
    /// The process-wide audit trail (also wired into manager + ledger).
    pub trail: SharedAuditTrail,
    /// Retry policy for blob-store I/O.
    pub retry: RetryPolicy,
}

impl AppState {
    /// Build a fully in-memory state: shared audit trail, ledger and
    /// manager wired to it, memory blob store. This is what the demo
    /// server and the tests run on; production swaps the blob store
    /// behind the same trait.
    pub fn in_memory() -> Self {
        let trail = SharedAuditTrail::new();
        let ledger = Ledger::new(Arc::new(trail.clone()));
        let manager = VaultManager::new(ledger.clone(), Arc::new(trail.clone()));
        Self {
            manager,
            ledger,
            blobs: Arc::new(MemoryBlobStore::new()),
            notary: Arc::new(NullNotary),
            trail,
            retry: RetryPolicy::standard(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("manager", &self.manager)
            .field("ledger", &self.ledger)
            .field("audit_entries", &self.trail.len())
            .finish()
    }
}
