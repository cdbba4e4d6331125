//! # Blob Routes
//!
//! Ciphertext in and out of the content-addressed blob collaborator.
//! The service never sees plaintext: clients encrypt before upload and
//! decrypt after download.
//!
//! - `POST /v1/blobs` — store bytes, returning their content reference
//! - `GET  /v1/blobs/{ref}` — retrieve bytes (digest re-verified)

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use cvault_core::ContentRef;
use cvault_store::with_retries;

use crate::error::AppError;
use crate::extractors::ActorIdentity;
use crate::state::AppState;

/// Response from a blob upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct PutBlobResponse {
    /// The content-addressed reference naming the stored bytes.
    pub content_ref: ContentRef,
}

/// Build the blobs router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/blobs", post(put_blob))
        .route("/v1/blobs/{content_ref}", get(get_blob))
}

async fn put_blob(
    State(state): State<AppState>,
    ActorIdentity(_actor): ActorIdentity,
    body: Bytes,
) -> Result<(StatusCode, Json<PutBlobResponse>), AppError> {
    if body.is_empty() {
        return Err(AppError::Validation("blob body must be non-empty".into()));
    }
    let content_ref = with_retries(&state.retry, || state.blobs.put(&body))?;
    Ok((StatusCode::CREATED, Json(PutBlobResponse { content_ref })))
}

async fn get_blob(
    State(state): State<AppState>,
    Path(content_ref): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let content_ref = ContentRef::parse(&content_ref)?;
    let data = with_retries(&state.retry, || state.blobs.get(&content_ref))?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        data,
    ))
}
