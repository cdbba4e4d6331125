//! # cvault-store — External Storage Collaborators
//!
//! The core never sees plaintext and never implements a cipher; ciphertext
//! lives in an external content-addressed blob store that this crate
//! models with a narrow contract:
//!
//! - [`BlobStore`] — `put(bytes) -> ContentRef`, `get(&ContentRef) -> bytes`,
//!   with digest re-verification at retrieval.
//! - [`NotarySink`] — optional external notarization of chain digests; the
//!   ledger's integrity never depends on it.
//! - [`RetryPolicy`] / [`with_retries`] — bounded exponential backoff for
//!   transient storage failures. Authorization and validation failures are
//!   never routed through here.
//!
//! [`MemoryBlobStore`] is the in-process implementation used by tests and
//! the demo server; a production deployment substitutes its own behind the
//! same traits.

pub mod blob;
pub mod retry;

pub use blob::{BlobStore, MemoryBlobStore, NotarySink, NullNotary, StorageError};
pub use retry::{with_retries, RetryPolicy};
