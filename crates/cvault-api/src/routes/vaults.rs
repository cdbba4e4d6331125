//! # Vault Routes
//!
//! - `POST   /v1/vaults` — create a vault (caller becomes owner)
//! - `GET    /v1/vaults` — vaults the caller owns or benefits from
//! - `GET    /v1/vaults/{id}` — key-free vault view
//! - `POST   /v1/vaults/{id}/evaluate` — re-evaluate conditions
//! - `POST   /v1/vaults/{id}/release` — release the escrowed key
//! - `POST   /v1/vaults/{id}/conditions/{cid}/approve` — grant approval
//! - `POST   /v1/vaults/{id}/revoke` — revoke (owner/admin)
//! - `DELETE /v1/vaults/{id}` — delete (owner/admin)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cvault_conditions::Condition;
use cvault_core::{ActorId, ConditionId, ContentRef, VaultId};
use cvault_escrow::{KeyMaterial, VaultSpec, VaultStatus, VaultView};

use crate::error::AppError;
use crate::extractors::ActorIdentity;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request body for vault creation.
#[derive(Debug, Deserialize)]
pub struct CreateVaultRequest {
    /// Intended recipient, if different from the owner.
    pub beneficiary: Option<String>,
    /// Content-addressed reference to the externally stored ciphertext.
    pub ciphertext_ref: String,
    /// The key to escrow, hex-encoded.
    pub key: String,
    /// Release conditions; at least one is required.
    pub conditions: Vec<Condition>,
}

/// Response from vault creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateVaultResponse {
    /// Identity of the new vault.
    pub vault_id: VaultId,
}

/// Response carrying a vault's current status.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// The status after the operation.
    pub status: VaultStatus,
}

/// Response from a successful key release.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReleaseResponse {
    /// The escrowed key, hex-encoded.
    pub key: KeyMaterial,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the vaults router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/vaults", post(create_vault).get(list_vaults))
        .route("/v1/vaults/{id}", get(get_vault).delete(delete_vault))
        .route("/v1/vaults/{id}/evaluate", post(evaluate_vault))
        .route("/v1/vaults/{id}/release", post(release_key))
        .route(
            "/v1/vaults/{id}/conditions/{cid}/approve",
            post(approve_condition),
        )
        .route("/v1/vaults/{id}/revoke", post(revoke_vault))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn create_vault(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Json(req): Json<CreateVaultRequest>,
) -> Result<(StatusCode, Json<CreateVaultResponse>), AppError> {
    let ciphertext_ref = ContentRef::parse(&req.ciphertext_ref)?;
    let key = KeyMaterial::from_hex(&req.key)?;
    let spec = VaultSpec {
        beneficiary: req.beneficiary.map(ActorId::new),
        ciphertext_ref,
        key,
        conditions: req.conditions,
    };
    let vault_id = state.manager.create(&actor, spec)?;
    Ok((StatusCode::CREATED, Json(CreateVaultResponse { vault_id })))
}

async fn list_vaults(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
) -> Json<Vec<VaultView>> {
    Json(state.manager.list_for(&actor.id))
}

async fn get_vault(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VaultView>, AppError> {
    Ok(Json(state.manager.get(VaultId(id))?))
}

async fn evaluate_vault(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    let status = state.manager.evaluate(VaultId(id))?;
    Ok(Json(StatusResponse { status }))
}

async fn release_key(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<ReleaseResponse>, AppError> {
    let key = state.manager.release_key(VaultId(id), &actor)?;
    Ok(Json(ReleaseResponse { key }))
}

async fn approve_condition(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path((id, cid)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state
        .manager
        .grant_approval(VaultId(id), ConditionId(cid), &actor)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn revoke_vault(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, AppError> {
    state.manager.revoke(VaultId(id), &actor)?;
    Ok(Json(StatusResponse {
        status: VaultStatus::Revoked,
    }))
}

async fn delete_vault(
    State(state): State<AppState>,
    ActorIdentity(actor): ActorIdentity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.manager.delete(VaultId(id), &actor)?;
    Ok(StatusCode::NO_CONTENT)
}
