//! Account route handlers.
//!
//! These routes require authentication.

use axum::{Json, extract::State};
use bizoe_core::{
    CurrencyCode, Money, Order, OrderItem, OrderNumber, OrderStatus, PaymentMethod,
    PaymentStatus, ProfileUpdate, SAVED_PAYMENT_METHODS, User,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Page;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{RequestLocale, RequireAuth};
use crate::services::AuthStore;
use crate::services::auth::{PasswordChange, validate_password_change, validate_profile_update};
use crate::state::AppState;
use crate::storage::SessionSnapshotStore;

/// Orders shown on the overview.
const RECENT_ORDERS: usize = 3;
/// Payment methods shown on the overview.
const OVERVIEW_PAYMENT_METHODS: usize = 2;

/// Order display data.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub number: OrderNumber,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub item_count: u32,
    pub items: Vec<OrderItem>,
    pub total: String,
    pub cancellable: bool,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            number: order.number.clone(),
            status: order.status,
            payment_status: order.payment_status,
            created_at: order.created_at,
            item_count: order.items.iter().map(|item| item.quantity).sum(),
            items: order.items.clone(),
            total: Money::new(order.total, CurrencyCode::USD).to_string(),
            cancellable: order.status.is_cancellable(),
        }
    }
}

/// Account overview payload.
#[derive(Debug, Serialize)]
pub struct AccountOverview {
    pub user: User,
    pub display_name: String,
    pub order_count: usize,
    pub recent_orders: Vec<OrderView>,
    pub payment_methods: Vec<PaymentMethod>,
}

/// Profile payload.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub user: User,
}

/// Order history payload.
#[derive(Debug, Serialize)]
pub struct OrderHistory {
    pub orders: Vec<OrderView>,
}

/// Saved payment methods payload.
#[derive(Debug, Serialize)]
pub struct PaymentMethods {
    pub payment_methods: Vec<PaymentMethod>,
}

/// Password change acknowledgement.
#[derive(Debug, Serialize)]
pub struct PasswordChanged {
    pub changed: bool,
}

/// Display account overview page.
///
/// # Errors
///
/// Returns 503 if the order service is unavailable.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Page<AccountOverview>>> {
    let orders = state.orders().orders_for(user.id).await?;

    Ok(Json(Page::new(
        locale,
        "我的帳戶 - BIZOE",
        AccountOverview {
            display_name: user.full_name(),
            order_count: orders.len(),
            recent_orders: orders.iter().take(RECENT_ORDERS).map(OrderView::from).collect(),
            payment_methods: SAVED_PAYMENT_METHODS
                .iter()
                .take(OVERVIEW_PAYMENT_METHODS)
                .copied()
                .collect(),
            user,
        },
    )))
}

/// Display the profile page.
#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn profile(
    RequestLocale(locale): RequestLocale,
    RequireAuth(user): RequireAuth,
) -> Json<Page<ProfileView>> {
    Json(Page::new(locale, "個人資料 - BIZOE", ProfileView { user }))
}

/// Update the profile.
///
/// # Errors
///
/// Returns 422 with field errors for an invalid edit and 503 if the auth
/// service is unavailable.
#[instrument(skip(state, session, user, update), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ProfileView>> {
    validate_profile_update(&update)?;
    let updated = state.auth().update_profile(&user, update).await?;

    let store = SessionSnapshotStore::new(session);
    AuthStore::new(&store).replace_user(updated.clone()).await?;

    add_breadcrumb("account", "Updated profile", None);
    Ok(Json(ProfileView { user: updated }))
}

/// Change the password.
///
/// # Errors
///
/// Returns 422 with field errors for an invalid form and 503 if the auth
/// service is unavailable.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(form): Json<PasswordChange>,
) -> Result<Json<PasswordChanged>> {
    validate_password_change(&form)?;
    state.auth().change_password(&user).await?;
    Ok(Json(PasswordChanged { changed: true }))
}

/// Display order history.
///
/// # Errors
///
/// Returns 503 if the order service is unavailable.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Page<OrderHistory>>> {
    let orders = state.orders().orders_for(user.id).await?;
    Ok(Json(Page::new(
        locale,
        "訂單記錄 - BIZOE",
        OrderHistory {
            orders: orders.iter().map(OrderView::from).collect(),
        },
    )))
}

/// Display saved payment methods.
#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn payment_methods(
    RequestLocale(locale): RequestLocale,
    RequireAuth(user): RequireAuth,
) -> Json<Page<PaymentMethods>> {
    Json(Page::new(
        locale,
        "付款方式 - BIZOE",
        PaymentMethods {
            payment_methods: SAVED_PAYMENT_METHODS.to_vec(),
        },
    ))
}
