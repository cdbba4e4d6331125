//! # Audit Routes
//!
//! - `GET /v1/audit?limit=` — the most recent audit entries (admin only)
//! - `GET /v1/audit/target/{target}` — entries for one vault or subject

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use cvault_audit::AuditEntry;

use crate::error::AppError;
use crate::extractors::ActorIdentity;
use crate::state::AppState;

/// Query parameters for the audit listing.
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    /// Maximum entries to return (newest last); defaults to 100.
    pub limit: Option<usize>,
}

/// Build the audit router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/audit", get(list_entries))
        .route("/v1/audit/target/{target}", get(entries_for_target))
}

fn require_admin(actor: &cvault_core::Actor) -> Result<(), AppError> {
    if !actor.role.is_admin() {
        return Err(AppError::Unauthorized(
            "audit trail queries require the admin role".into(),
        ));
    }
    Ok(())
}

async fn list_entries(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    require_admin(&actor)?;
    Ok(Json(state.trail.last_n(query.limit.unwrap_or(100))))
}

async fn entries_for_target(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(target): Path<String>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    require_admin(&actor)?;
    Ok(Json(state.trail.entries_for_target(&target)))
}
