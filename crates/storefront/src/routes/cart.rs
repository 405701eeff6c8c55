//! Cart route handlers.
//!
//! The cart lives in the client's session under `cart-storage`. Every
//! mutation answers with the updated cart so the client can re-render
//! without a second request.

use axum::{
    Json,
    extract::{Path, State},
};
use bizoe_core::{CartItem, CartTotals, CurrencyCode, Money, PricingRules, ProductId, PromoCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use super::Page;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequestLocale;
use crate::services::{CartSnapshot, CartStore};
use crate::state::AppState;
use crate::storage::SessionSnapshotStore;

// =============================================================================
// Views
// =============================================================================

fn usd(amount: Decimal) -> String {
    Money::new(amount, CurrencyCode::USD).to_string()
}

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub price: Decimal,
    pub price_display: String,
    pub line_total: Decimal,
    pub line_total_display: String,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            image: item.image.clone(),
            quantity: item.quantity,
            price: item.price,
            price_display: usd(item.price),
            line_total: item.line_total(),
            line_total_display: usd(item.line_total()),
        }
    }
}

/// Applied promo code.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PromoView {
    pub code: PromoCode,
    pub percent: u32,
}

/// Order summary display data.
#[derive(Debug, Clone, Serialize)]
pub struct TotalsView {
    pub item_count: u32,
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub discount: String,
    pub total: String,
    pub free_shipping: bool,
    /// How much more to spend for free shipping, when not yet reached.
    pub free_shipping_remaining: Option<String>,
    pub promo: Option<PromoView>,
    pub amounts: CartTotals,
}

impl TotalsView {
    #[must_use]
    pub fn new(totals: CartTotals, rules: &PricingRules) -> Self {
        let remaining = rules.free_shipping_threshold - totals.subtotal;
        Self {
            item_count: totals.item_count,
            subtotal: usd(totals.subtotal),
            shipping: usd(totals.shipping),
            tax: usd(totals.tax),
            discount: usd(totals.discount),
            total: usd(totals.total),
            free_shipping: totals.free_shipping(),
            free_shipping_remaining: (!totals.empty && remaining > Decimal::ZERO)
                .then(|| usd(remaining)),
            promo: totals.promo.map(|code| PromoView {
                code,
                percent: code.percent(),
            }),
            amounts: totals,
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub empty: bool,
    pub items: Vec<CartLineView>,
    pub totals: TotalsView,
}

impl CartView {
    #[must_use]
    pub fn new(snapshot: &CartSnapshot, rules: &PricingRules) -> Self {
        let items = snapshot
            .cart
            .as_ref()
            .map(|cart| cart.items().iter().map(CartLineView::from).collect())
            .unwrap_or_default();
        Self {
            empty: snapshot.is_empty(),
            items,
            totals: TotalsView::new(snapshot.totals(rules), rules),
        }
    }
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

// =============================================================================
// Request Types
// =============================================================================

const fn default_quantity() -> u32 {
    1
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// Update quantity request. Zero or below removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// Promo code request.
#[derive(Debug, Deserialize)]
pub struct PromoRequest {
    #[serde(default)]
    pub code: String,
}

fn parse_product_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("product {raw}")))
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
///
/// # Errors
///
/// Returns 500 if the session cannot be read.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    session: Session,
) -> Result<Json<Page<CartView>>> {
    let store = SessionSnapshotStore::new(session);
    let snapshot = CartStore::new(&store, state.catalog()).snapshot().await?;
    Ok(Json(Page::new(
        locale,
        "購物車 - BIZOE",
        CartView::new(&snapshot, state.pricing()),
    )))
}

/// Get the cart item count (for the header badge).
///
/// # Errors
///
/// Returns 500 if the session cannot be read.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<Json<CartCount>> {
    let store = SessionSnapshotStore::new(session);
    let snapshot = CartStore::new(&store, state.catalog()).snapshot().await?;
    Ok(Json(CartCount {
        count: snapshot.item_count(),
    }))
}

/// Add a product to the cart.
///
/// # Errors
///
/// Returns 404 for unknown products and 400 for a zero quantity or an
/// out-of-stock product.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let store = SessionSnapshotStore::new(session);
    let snapshot = CartStore::new(&store, state.catalog())
        .add_item(request.product_id, request.quantity)
        .await?;

    let product_id = request.product_id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", &product_id)]));
    Ok(Json(CartView::new(&snapshot, state.pricing())))
}

/// Change a line's quantity.
///
/// # Errors
///
/// Returns 404 if the product is unknown or not in the cart.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<String>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let product_id = parse_product_id(&product_id)?;
    let store = SessionSnapshotStore::new(session);
    let snapshot = CartStore::new(&store, state.catalog())
        .update_quantity(product_id, request.quantity)
        .await?;
    Ok(Json(CartView::new(&snapshot, state.pricing())))
}

/// Remove a line.
///
/// # Errors
///
/// Returns 404 if the product is not in the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<String>,
) -> Result<Json<CartView>> {
    let product_id = parse_product_id(&product_id)?;
    let store = SessionSnapshotStore::new(session);
    let snapshot = CartStore::new(&store, state.catalog())
        .remove_item(product_id)
        .await?;

    let product_id = product_id.to_string();
    add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", &product_id)]));
    Ok(Json(CartView::new(&snapshot, state.pricing())))
}

/// Empty the cart.
///
/// # Errors
///
/// Returns 500 if the session cannot be written.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let store = SessionSnapshotStore::new(session);
    CartStore::new(&store, state.catalog()).clear().await?;
    Ok(Json(CartView::new(&CartSnapshot::default(), state.pricing())))
}

/// Apply a promo code.
///
/// # Errors
///
/// Returns 400 for a blank or unknown code; a previously applied code stays.
#[instrument(skip(state, session, request))]
pub async fn apply_promo(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<PromoRequest>,
) -> Result<Json<CartView>> {
    let store = SessionSnapshotStore::new(session);
    let snapshot = CartStore::new(&store, state.catalog())
        .apply_promo(&request.code)
        .await?;
    Ok(Json(CartView::new(&snapshot, state.pricing())))
}

/// Remove the applied promo code.
///
/// # Errors
///
/// Returns 500 if the session cannot be written.
#[instrument(skip(state, session))]
pub async fn remove_promo(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CartView>> {
    let store = SessionSnapshotStore::new(session);
    let snapshot = CartStore::new(&store, state.catalog()).remove_promo().await?;
    Ok(Json(CartView::new(&snapshot, state.pricing())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::new(&CartSnapshot::default(), &PricingRules::default());
        assert!(view.empty);
        assert!(view.items.is_empty());
        assert_eq!(view.totals.total, "$0.00");
        assert_eq!(view.totals.shipping, "$0.00");
        assert_eq!(view.totals.free_shipping_remaining, None);
    }

    #[test]
    fn test_totals_view_formats_amounts() {
        let rules = PricingRules::default();
        let totals = CartTotals {
            item_count: 2,
            subtotal: dec("59.98"),
            shipping: dec("9.99"),
            tax: dec("4.7984"),
            discount: Decimal::ZERO,
            total: dec("74.7684"),
            promo: None,
            empty: false,
        };
        let view = TotalsView::new(totals, &rules);
        assert_eq!(view.tax, "$4.80");
        assert_eq!(view.total, "$74.77");
        assert_eq!(view.free_shipping_remaining.as_deref(), Some("$40.02"));
        assert!(!view.free_shipping);
    }

    #[test]
    fn test_add_request_defaults_to_one() {
        let request: AddItemRequest = serde_json::from_str(r#"{"product_id": 5}"#).unwrap();
        assert_eq!(request.quantity, 1);
        assert_eq!(request.product_id, ProductId::new(5));
    }
}
