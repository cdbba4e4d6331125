//! # Application Error
//!
//! Maps the domain error taxonomy to structured HTTP responses. The
//! mapping is fixed: validation 422, authorization 403, absence 404,
//! premature release 409, terminal state 410, chain damage 500 (loud),
//! storage trouble 503.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use cvault_escrow::EscrowError;
use cvault_ledger::LedgerError;
use cvault_store::StorageError;

/// Application-level error type that maps to HTTP responses.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request validation failed; the caller must fix and resend.
    #[error("validation error: {0}")]
    Validation(String),

    /// Actor, role, or ownership mismatch.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Key requested before the vault unlocked; retry `evaluate` later.
    #[error("not unlocked: {0}")]
    NotUnlocked(String),

    /// The vault is revoked; the operation can never succeed.
    #[error("revoked: {0}")]
    AlreadyRevoked(String),

    /// A ledger chain failed verification. Fatal to trust in that
    /// subject's history; surfaced prominently and never auto-repaired.
    #[error("chain integrity error: {0}")]
    ChainIntegrity(String),

    /// The storage collaborator failed after bounded retries.
    #[error("storage unavailable: {0}")]
    Storage(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::NotUnlocked(_) => StatusCode::CONFLICT,
            Self::AlreadyRevoked(_) => StatusCode::GONE,
            Self::ChainIntegrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = serde_json::json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
            }
        });
        (status, axum::Json(body)).into_response()
    }
}

impl From<EscrowError> for AppError {
    fn from(err: EscrowError) -> Self {
        match err {
            EscrowError::Validation(msg) => Self::Validation(msg),
            EscrowError::Unauthorized(msg) => Self::Unauthorized(msg),
            EscrowError::NotFound(what) => Self::NotFound(what),
            EscrowError::NotUnlocked(id) => Self::NotUnlocked(id.to_string()),
            EscrowError::AlreadyRevoked(id) => Self::AlreadyRevoked(id.to_string()),
            EscrowError::ChainIntegrity(damage) => Self::ChainIntegrity(damage.to_string()),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(msg) => Self::Validation(msg),
            LedgerError::Unauthorized(msg) => Self::Unauthorized(msg),
            damage @ LedgerError::ChainIntegrity { .. } => Self::ChainIntegrity(damage.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => Self::NotFound(what),
            StorageError::Corrupt(what) => Self::ChainIntegrity(format!("blob corrupt: {what}")),
            StorageError::Transient(msg) | StorageError::Permanent(msg) => Self::Storage(msg),
        }
    }
}

impl From<cvault_core::CoreError> for AppError {
    fn from(err: cvault_core::CoreError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvault_core::VaultId;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::NotUnlocked("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::AlreadyRevoked("x".into()).status(), StatusCode::GONE);
        assert_eq!(
            AppError::ChainIntegrity("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::Storage("x".into()).status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_escrow_error_conversion() {
        let id = VaultId::new();
        assert!(matches!(
            AppError::from(EscrowError::NotUnlocked(id)),
            AppError::NotUnlocked(_)
        ));
        assert!(matches!(
            AppError::from(EscrowError::AlreadyRevoked(id)),
            AppError::AlreadyRevoked(_)
        ));
        assert!(matches!(
            AppError::from(EscrowError::Unauthorized("no".into())),
            AppError::Unauthorized(_)
        ));
    }

    #[test]
    fn test_storage_error_conversion() {
        assert!(matches!(
            AppError::from(StorageError::Transient("t".into())),
            AppError::Storage(_)
        ));
        assert!(matches!(
            AppError::from(StorageError::NotFound("n".into())),
            AppError::NotFound(_)
        ));
    }
}
