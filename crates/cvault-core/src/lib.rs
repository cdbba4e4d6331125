//! # cvault-core — Foundational Types for the ChronoVault Stack
//!
//! This crate is the bedrock of the ChronoVault Stack. It defines the
//! type-system primitives every other crate builds on; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `VaultId`, `ConditionId`,
//!    `SubjectId`, `ActorId` — all newtypes. No bare strings or UUIDs for
//!    identifiers, so a subject can never be passed where a vault is expected.
//!
//! 2. **Explicit actor identity.** Every state-changing operation in the
//!    stack takes an [`Actor`] value supplied by the external identity
//!    oracle. The core holds no ambient session state.
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] enforces UTC with Z suffix and
//!    seconds precision, so chain preimages are deterministic byte-for-byte.
//!
//! 4. **One digest path.** All chain and content hashing flows through
//!    [`digest::sha256_hex`]; hex encoding and decoding live beside it.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cvault-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone` and implement
//!   `Serialize`/`Deserialize` — except key material, which never derives
//!   a revealing `Debug`.

pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use digest::{sha256_hex, ContentRef};
pub use error::CoreError;
pub use identity::{Actor, ActorId, ConditionId, Role, SubjectId, VaultId};
pub use temporal::Timestamp;
