//! Authentication route handlers.
//!
//! Login and registration are served as JSON under `/api/auth/*`; the
//! `/auth/*` pages only describe the forms. A successful login rotates the
//! session id and records the user in the `auth-storage` snapshot.

use axum::{
    Json,
    extract::{Query, State},
};
use bizoe_core::{AuthState, User};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use super::Page;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::RequestLocale;
use crate::services::AuthStore;
use crate::services::auth::{
    AuthSession, LoginRequest, RegisterRequest, validate_login, validate_registration,
};
use crate::state::AppState;
use crate::storage::SessionSnapshotStore;

// =============================================================================
// Query Types
// =============================================================================

/// Where to send the client after signing in.
#[derive(Debug, Default, Deserialize)]
pub struct ReturnQuery {
    #[serde(rename = "returnUrl")]
    pub return_url: Option<String>,
}

impl ReturnQuery {
    /// The return path if it stays on this site, else the account page.
    #[must_use]
    pub fn redirect_to(&self) -> String {
        self.return_url
            .as_deref()
            .filter(|url| is_local_path(url))
            .unwrap_or("/account")
            .to_string()
    }
}

/// A path on this site. Browsers read `\` as `/`, so `/\host` is as
/// off-site as `//host`.
fn is_local_path(url: &str) -> bool {
    let mut chars = url.chars();
    chars.next() == Some('/')
        && !matches!(chars.next(), Some('/' | '\\'))
        && !url.chars().any(|c| c.is_control() || c.is_whitespace())
}

// =============================================================================
// Views
// =============================================================================

/// Auth state as seen by the client.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub authenticated: bool,
    pub user: Option<User>,
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

impl From<&AuthState> for SessionView {
    fn from(state: &AuthState) -> Self {
        Self {
            authenticated: state.is_authenticated(),
            user: state.user().cloned(),
            token: state.token().map(|t| t.as_str().to_string()),
            redirect_to: None,
        }
    }
}

/// Login or registration form page.
#[derive(Debug, Serialize)]
pub struct AuthFormView {
    pub form: &'static str,
    pub action: &'static str,
    pub redirect_to: String,
}

// =============================================================================
// Pages
// =============================================================================

/// Display the login page.
#[instrument(skip_all)]
pub async fn login_page(
    RequestLocale(locale): RequestLocale,
    Query(query): Query<ReturnQuery>,
) -> Json<Page<AuthFormView>> {
    Json(Page::new(
        locale,
        "會員登入 - BIZOE",
        AuthFormView {
            form: "login",
            action: "/api/auth/login",
            redirect_to: query.redirect_to(),
        },
    ))
}

/// Display the registration page.
#[instrument(skip_all)]
pub async fn register_page(
    RequestLocale(locale): RequestLocale,
    Query(query): Query<ReturnQuery>,
) -> Json<Page<AuthFormView>> {
    Json(Page::new(
        locale,
        "註冊帳戶 - BIZOE",
        AuthFormView {
            form: "register",
            action: "/api/auth/register",
            redirect_to: query.redirect_to(),
        },
    ))
}

// =============================================================================
// API
// =============================================================================

async fn start_session(
    session: Session,
    auth: AuthSession,
    query: &ReturnQuery,
) -> Result<Json<SessionView>> {
    let store = SessionSnapshotStore::new(session);
    store.rotate_id().await?;
    let state = AuthStore::new(&store).sign_in(auth).await?;

    if let Some(user) = state.user() {
        set_sentry_user(&user.id, Some(user.email.as_str()));
    }

    let mut view = SessionView::from(&state);
    view.redirect_to = Some(query.redirect_to());
    Ok(Json(view))
}

/// Sign in.
///
/// # Errors
///
/// Returns 422 with field errors for an invalid form and 503 if the auth
/// service is unavailable.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ReturnQuery>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionView>> {
    let email = validate_login(&request)?;
    let auth = state.auth().login(&email).await?;
    start_session(session, auth, &query).await
}

/// Create an account and sign in.
///
/// # Errors
///
/// Returns 422 with field errors for an invalid form and 503 if the auth
/// service is unavailable.
#[instrument(skip(state, session, request))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ReturnQuery>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<SessionView>> {
    let account = validate_registration(&request)?;
    let auth = state.auth().register(account).await?;
    start_session(session, auth, &query).await
}

/// Sign out. Clears the user and token together; the cart is kept.
///
/// # Errors
///
/// Returns 500 if the session cannot be written.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<SessionView>> {
    let store = SessionSnapshotStore::new(session);
    AuthStore::new(&store).sign_out().await?;
    clear_sentry_user();
    Ok(Json(SessionView::from(&AuthState::Anonymous)))
}

/// Current auth state.
///
/// # Errors
///
/// Returns 500 if the session cannot be read.
#[instrument(skip(session))]
pub async fn current(session: Session) -> Result<Json<SessionView>> {
    let store = SessionSnapshotStore::new(session);
    let state = AuthStore::new(&store).state().await?;
    Ok(Json(SessionView::from(&state)))
}
