//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Error responses are JSON: `{"error": "..."}`, plus `fields` for
//! validation failures and `issues` for a stale cart at checkout.

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bizoe_core::{CartError, ValidationErrors};
use serde::Serialize;
use thiserror::Error;

use crate::services::checkout::LineIssue;
use crate::services::{AuthError, CartServiceError, CheckoutError, ContactError, OrderError};
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Form input failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartServiceError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Order service failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Contact service failed.
    #[error("Contact error: {0}")]
    Contact(#[from] ContactError),

    /// Snapshot storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<ValidationErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<Vec<LineIssue>>,
}

impl ErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fields: None,
            issues: None,
        }
    }
}

const INTERNAL: &str = "Internal server error";
const UNAVAILABLE: &str = "Service temporarily unavailable, please try again";

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Cart(err) => cart_status(err),
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::NotAuthenticated => StatusCode::UNAUTHORIZED,
                AuthError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
                CheckoutError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::StaleCart(_) => StatusCode::CONFLICT,
                CheckoutError::Order(_) => StatusCode::SERVICE_UNAVAILABLE,
                CheckoutError::Cart(err) => cart_status(err),
            },
            Self::Order(_) | Self::Contact(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Don't expose internal error details to clients
    fn into_body(self, status: StatusCode) -> ErrorBody {
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            return ErrorBody::message(INTERNAL);
        }
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return ErrorBody::message(UNAVAILABLE);
        }

        match self {
            Self::Validation(errors) | Self::Checkout(CheckoutError::Invalid(errors)) => ErrorBody {
                error: "Please correct the highlighted fields".to_string(),
                fields: Some(errors),
                issues: None,
            },
            Self::Checkout(CheckoutError::StaleCart(issues)) => ErrorBody {
                error: "Some items in your cart have changed".to_string(),
                fields: None,
                issues: Some(issues),
            },
            Self::Checkout(CheckoutError::EmptyCart) => ErrorBody::message("Your cart is empty"),
            Self::Cart(err) | Self::Checkout(CheckoutError::Cart(err)) => {
                ErrorBody::message(err.to_string())
            }
            Self::Auth(AuthError::InvalidEmail(_)) => ErrorBody::message("Invalid email address"),
            Self::Auth(AuthError::NotAuthenticated) => {
                ErrorBody::message("Please sign in to continue")
            }
            Self::NotFound(what) => ErrorBody::message(format!("Not found: {what}")),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => ErrorBody::message(msg),
            other => ErrorBody::message(other.to_string()),
        }
    }
}

const fn cart_status(err: &CartServiceError) -> StatusCode {
    match err {
        CartServiceError::Cart(CartError::ItemNotFound(_))
        | CartServiceError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        CartServiceError::Cart(_) | CartServiceError::Promo(_) => StatusCode::BAD_REQUEST,
        CartServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(self.into_body(status))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "5")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use bizoe_core::{ProductId, PromoError};

    use super::*;
    use crate::services::checkout::LineProblem;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(CartServiceError::Promo(PromoError::Unknown("FREE".to_string())).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CartServiceError::Cart(CartError::ItemNotFound(ProductId::new(5))).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AuthError::Unavailable.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(CheckoutError::StaleCart(Vec::new()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.require("email", "");
        let (status, body) = body_json(errors.into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["fields"]["email"], "email is required");
        assert!(body.get("issues").is_none());
    }

    #[tokio::test]
    async fn test_stale_cart_body_lists_issues() {
        let issue = LineIssue {
            product_id: ProductId::new(1),
            name: "Sonic Mighty Revo".to_string(),
            problem: LineProblem::Discontinued,
        };
        let (status, body) = body_json(CheckoutError::StaleCart(vec![issue]).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["issues"][0]["product_id"], 1);
        assert_eq!(body["issues"][0]["problem"], "discontinued");
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (_, body) = body_json(AppError::Internal("pool exhausted".to_string())).await;
        assert_eq!(body["error"], INTERNAL);

        let (_, body) = body_json(AuthError::Unavailable.into()).await;
        assert_eq!(body["error"], UNAVAILABLE);
    }
}
