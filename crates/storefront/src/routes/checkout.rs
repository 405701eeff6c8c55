//! Checkout route handlers.
//!
//! Both handlers require a signed-in user; anonymous page requests are sent to
//! `/auth/login?returnUrl=/checkout`.

use axum::{Json, extract::State, http::StatusCode};
use bizoe_core::{
    Address, CurrencyCode, Money, OrderNumber, OrderStatus, PaymentMethod, PaymentStatus,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Page;
use super::cart::{CartLineView, TotalsView};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{RequestLocale, RequireAuth};
use crate::services::checkout::{CheckoutSummary, LineIssue};
use crate::services::{Checkout, CheckoutRequest};
use crate::state::AppState;
use crate::storage::SessionSnapshotStore;

/// Checkout page payload.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub items: Vec<CartLineView>,
    pub totals: TotalsView,
    /// Lines that changed since they were added; placing the order fails
    /// until they are fixed.
    pub issues: Vec<LineIssue>,
    pub payment_methods: Vec<PaymentMethod>,
    pub shipping_address: Address,
}

impl CheckoutView {
    fn new(summary: CheckoutSummary, state: &AppState) -> Self {
        Self {
            items: summary.items.iter().map(CartLineView::from).collect(),
            totals: TotalsView::new(summary.totals, state.pricing()),
            issues: summary.issues,
            payment_methods: summary.payment_methods,
            shipping_address: summary.shipping_address,
        }
    }
}

/// Order confirmation.
#[derive(Debug, Serialize)]
pub struct OrderConfirmation {
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total: String,
    pub created_at: DateTime<Utc>,
}

/// Display the checkout page.
///
/// # Errors
///
/// Returns 400 if the cart is empty.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Page<CheckoutView>>> {
    let store = SessionSnapshotStore::new(session);
    let summary = Checkout::new(&store, state.catalog(), state.pricing(), state.orders())
        .summary(&user)
        .await?;

    Ok(Json(Page::new(
        locale,
        "結帳 - BIZOE",
        CheckoutView::new(summary, &state),
    )))
}

/// Place the order.
///
/// # Errors
///
/// Returns 400 for an empty cart, 422 with field errors for an invalid form,
/// 409 listing each stale line, and 503 if payment processing is unavailable.
#[instrument(skip(state, session, user, request), fields(user_id = %user.id))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<OrderConfirmation>)> {
    add_breadcrumb("checkout", "Placing order", None);

    let store = SessionSnapshotStore::new(session);
    let order = Checkout::new(&store, state.catalog(), state.pricing(), state.orders())
        .place_order(&user, request)
        .await?;

    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_number", order.number.as_str())]),
    );

    Ok((
        StatusCode::CREATED,
        Json(OrderConfirmation {
            total: Money::new(order.total, CurrencyCode::USD).to_string(),
            order_number: order.number,
            status: order.status,
            payment_status: order.payment_status,
            created_at: order.created_at,
        }),
    ))
}
