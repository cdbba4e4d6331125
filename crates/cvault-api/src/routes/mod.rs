//! # Route Modules
//!
//! Each module defines an Axum Router for one API surface area;
//! [`app`] assembles them into the application.

pub mod audit;
pub mod blobs;
pub mod draft;
pub mod health;
pub mod ledger;
pub mod vaults;

use axum::Router;

use crate::state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(vaults::router())
        .merge(ledger::router())
        .merge(draft::router())
        .merge(blobs::router())
        .merge(audit::router())
        .merge(health::router())
        .with_state(state)
}
