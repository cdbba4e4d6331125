//! # Ledger Routes
//!
//! - `POST /v1/ledger/{subject}/records` — append a record (faculty/admin)
//! - `GET  /v1/ledger/{subject}/records` — list the subject's chain
//! - `GET  /v1/ledger/{subject}/aggregate?category=&kind=` — derived stat
//! - `GET  /v1/ledger/{subject}/verify` — walk and verify the chain

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use cvault_audit::{AuditAction, AuditEntry, AuditSink};
use cvault_core::SubjectId;
use cvault_ledger::{AggregateKind, ChainVerification, LedgerRecord};

use crate::error::AppError;
use crate::extractors::ActorIdentity;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request body for appending a record.
#[derive(Debug, Deserialize)]
pub struct AppendRecordRequest {
    /// Record category (e.g. "attendance", "grade").
    pub category: String,
    /// Recorded value.
    pub value: String,
}

/// Query parameters for the aggregate endpoint.
#[derive(Debug, Deserialize)]
pub struct AggregateQuery {
    /// Category to aggregate over.
    pub category: String,
    /// Aggregate kind; defaults to `latest`.
    pub kind: Option<String>,
}

/// Response from the aggregate endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct AggregateResponse {
    /// The subject queried.
    pub subject: SubjectId,
    /// The category aggregated.
    pub category: String,
    /// The aggregate kind applied.
    pub kind: AggregateKind,
    /// The computed value; null when no usable data exists.
    pub value: Option<f64>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the ledger router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/ledger/{subject}/records",
            get(list_records).post(append_record),
        )
        .route("/v1/ledger/{subject}/aggregate", get(aggregate))
        .route("/v1/ledger/{subject}/verify", get(verify_chain))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn append_record(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(subject): Path<String>,
    Json(req): Json<AppendRecordRequest>,
) -> Result<(StatusCode, Json<LedgerRecord>), AppError> {
    let subject = SubjectId::new(subject);
    let record = state
        .ledger
        .append(&subject, &req.category, &req.value, &actor)?;
    // Anchor the new tip with the external notary, best-effort: the
    // chain's own tamper evidence never depends on it.
    if let Err(err) = state.notary.notarize(&record.data_hash) {
        tracing::warn!(subject = %subject, error = %err, "notarization failed");
    }
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_records(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Json<Vec<LedgerRecord>> {
    Json(state.ledger.records(&SubjectId::new(subject)))
}

async fn aggregate(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    Query(query): Query<AggregateQuery>,
) -> Result<Json<AggregateResponse>, AppError> {
    let subject = SubjectId::new(subject);
    let kind = match query.kind.as_deref() {
        Some(raw) => AggregateKind::parse(raw)?,
        None => AggregateKind::Latest,
    };
    let value = state.ledger.aggregate(&subject, &query.category, kind);
    Ok(Json(AggregateResponse {
        subject,
        category: query.category,
        kind,
        value,
    }))
}

async fn verify_chain(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(subject): Path<String>,
) -> Json<ChainVerification> {
    let subject = SubjectId::new(subject);
    let verification = state.ledger.verify_chain(&subject);
    state.trail.record(AuditEntry::new(
        actor.id,
        AuditAction::ChainVerified,
        subject.to_string(),
        serde_json::json!({ "result": verification }),
    ));
    Json(verification)
}
