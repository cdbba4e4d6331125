//! # Drafting Route
//!
//! - `POST /v1/draft` — run the condition drafting assistant over free
//!   text.
//!
//! Advisory and lossy: the response is a list of candidate conditions
//! for a human to review; nothing here touches any vault. Binding a
//! draft requires an explicit `POST /v1/vaults` with the confirmed
//! conditions.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use cvault_conditions::{draft_conditions, DraftCondition};

use crate::error::AppError;
use crate::extractors::ActorIdentity;
use crate::state::AppState;

/// Request body for the drafting assistant.
#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    /// Free text describing desired release conditions.
    pub text: String,
}

/// Response from the drafting assistant.
#[derive(Debug, Serialize, Deserialize)]
pub struct DraftResponse {
    /// Candidate conditions; zero or more, best-effort.
    pub drafts: Vec<DraftCondition>,
}

/// Build the drafting router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/draft", post(draft))
}

async fn draft(
    State(_state): State<AppState>,
    ActorIdentity(_actor): ActorIdentity,
    Json(req): Json<DraftRequest>,
) -> Result<Json<DraftResponse>, AppError> {
    const MAX_TEXT: usize = 10_000;
    if req.text.len() > MAX_TEXT {
        return Err(AppError::Validation(format!(
            "draft text must not exceed {MAX_TEXT} bytes"
        )));
    }
    Ok(Json(DraftResponse {
        drafts: draft_conditions(&req.text),
    }))
}
