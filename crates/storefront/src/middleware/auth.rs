//! Authentication extractors.
//!
//! Both read the client's `auth-storage` snapshot from the session.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use bizoe_core::{AuthState, User};
use serde_json::json;
use tower_sessions::Session;

use crate::models::session_keys;

/// Login page that protected pages redirect to.
pub const LOGIN_PATH: &str = "/auth/login";

/// Extractor that requires a signed-in user.
///
/// If the client is anonymous, page requests are redirected to the login page
/// with a `returnUrl` back to the requested path, and `/api/` requests get a
/// 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.first_name)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Error returned when authentication is required but the client is anonymous.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthRejection {
    /// Redirect to login page, then back to the given path.
    RedirectToLogin(String),
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl AuthRejection {
    fn for_path(parts: &Parts) -> Self {
        if parts.uri.path().starts_with("/api/") {
            return Self::Unauthorized;
        }
        let return_to = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path(), |pq| pq.as_str());
        Self::RedirectToLogin(return_to.to_string())
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(return_to) => Redirect::to(&format!(
                "{LOGIN_PATH}?returnUrl={}",
                urlencoding::encode(&return_to)
            ))
            .into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Please sign in to continue" })),
            )
                .into_response(),
        }
    }
}

async fn signed_in_user(parts: &Parts) -> Option<User> {
    let session = parts.extensions.get::<Session>()?;
    let state = session
        .get::<AuthState>(session_keys::AUTH)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to read auth snapshot"))
        .ok()
        .flatten()?;
    match state {
        AuthState::Authenticated { user, .. } => Some(user),
        AuthState::Anonymous => None,
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        signed_in_user(parts)
            .await
            .map(Self)
            .ok_or_else(|| AuthRejection::for_path(parts))
    }
}

/// Extractor that optionally gets the signed-in user.
///
/// Unlike `RequireAuth`, this does not reject anonymous clients.
pub struct OptionalAuth(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(signed_in_user(parts).await))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Request, header};

    use super::*;

    fn parts(uri: &str) -> Parts {
        Request::builder().uri(uri).body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_page_redirects_with_return_url() {
        let mut parts = parts("/checkout");
        let rejection = RequireAuth::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection, AuthRejection::RedirectToLogin("/checkout".to_string()));

        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login?returnUrl=%2Fcheckout"
        );
    }

    #[tokio::test]
    async fn test_api_gets_unauthorized() {
        let mut parts = parts("/api/auth/session");
        let rejection = RequireAuth::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection, AuthRejection::Unauthorized);
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_optional_auth_without_session() {
        let mut parts = parts("/");
        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(user.is_none());
    }
}
