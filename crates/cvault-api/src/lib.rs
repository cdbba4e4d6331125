//! # cvault-api — Axum Service Layer
//!
//! Exposes the Vault Manager, Ledger, drafting assistant, and audit
//! trail as an internal HTTP service boundary.
//!
//! ## Routes
//!
//! - `/v1/vaults/*` — vault lifecycle: create, inspect, evaluate,
//!   release, approve, revoke, delete
//! - `/v1/ledger/*` — record append, listing, aggregates, chain
//!   verification
//! - `/v1/draft` — condition drafting (advisory; output never binds to a
//!   vault without an explicit create call)
//! - `/v1/blobs/*` — ciphertext in and out of the content-addressed
//!   blob collaborator
//! - `/v1/audit` — audit trail queries (admin)
//! - `/health/*` — liveness/readiness probes (unauthenticated)
//!
//! ## Actor Identity
//!
//! There is no session state anywhere in the stack. The external
//! identity collaborator authenticates callers upstream and asserts
//! identity per request via `x-actor-id` / `x-actor-role` headers; the
//! [`extractors::ActorIdentity`] extractor turns those into the explicit
//! `Actor` value every domain operation takes.
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers — they validate, delegate to
//!   the domain crates, and map errors.
//! - All errors map to structured HTTP responses via [`AppError`].

pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use routes::app;
pub use state::AppState;
