//! # Actor Identity Extractor
//!
//! Turns the identity headers asserted by the upstream auth collaborator
//! into the explicit [`Actor`] value every domain operation takes. The
//! service itself holds no session state — identity arrives per request
//! or not at all.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use cvault_core::{Actor, Role};

use crate::error::AppError;

/// Header carrying the acting identity's name.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the acting identity's role.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extractor for the per-request acting identity.
#[derive(Debug, Clone)]
pub struct ActorIdentity(pub Actor);

impl<S: Send + Sync> FromRequestParts<S> for ActorIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, ACTOR_ID_HEADER)?;
        if id.trim().is_empty() {
            return Err(AppError::Unauthorized(format!(
                "{ACTOR_ID_HEADER} must be non-empty"
            )));
        }
        let role = Role::parse(&header_value(parts, ACTOR_ROLE_HEADER)?)
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;
        Ok(Self(Actor::new(id.trim(), role)))
    }
}

fn header_value(parts: &Parts, name: &str) -> Result<String, AppError> {
    let value = parts
        .headers
        .get(name)
        .ok_or_else(|| AppError::Unauthorized(format!("missing {name} header")))?;
    value
        .to_str()
        .map(str::to_string)
        .map_err(|_| AppError::Unauthorized(format!("{name} header is not valid ASCII")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn test_app() -> Router {
        Router::new().route(
            "/whoami",
            get(|ActorIdentity(actor): ActorIdentity| async move { actor.to_string() }),
        )
    }

    #[tokio::test]
    async fn identity_headers_accepted() {
        let request = Request::builder()
            .uri("/whoami")
            .header(ACTOR_ID_HEADER, "faculty_x")
            .header(ACTOR_ROLE_HEADER, "faculty")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_identity_rejected() {
        let request = Request::builder()
            .uri("/whoami")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_role_rejected() {
        let request = Request::builder()
            .uri("/whoami")
            .header(ACTOR_ID_HEADER, "someone")
            .header(ACTOR_ROLE_HEADER, "professor")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn blank_actor_id_rejected() {
        let request = Request::builder()
            .uri("/whoami")
            .header(ACTOR_ID_HEADER, "  ")
            .header(ACTOR_ROLE_HEADER, "student")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
