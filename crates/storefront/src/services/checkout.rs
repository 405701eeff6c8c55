//! Checkout: turn the client's cart into an order.
//!
//! The cart snapshot is client state, so every line is checked against the
//! catalog again before anything is charged. The order is priced from the
//! cart lines with the applied promo code, placed through the
//! [`OrderService`], and the cart is cleared once the order exists.

use bizoe_core::{
    Address, Cart, CartItem, CartTotals, Catalog, NewOrder, Order, OrderItem, PaymentMethod,
    PricingRules, ProductId, SAVED_PAYMENT_METHODS, User, ValidationErrors,
};
use bizoe_core::order::DEFAULT_COUNTRY;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use super::cart::{CartServiceError, CartStore};
use super::orders::{OrderError, OrderService};
use crate::storage::SnapshotStore;

/// Errors from checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("{0}")]
    Invalid(ValidationErrors),

    #[error("cart is out of date ({} line(s))", .0.len())]
    StaleCart(Vec<LineIssue>),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Cart(#[from] CartServiceError),
}

/// Checkout form.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub shipping: Address,
    #[serde(default = "same_as_shipping_default")]
    pub same_as_shipping: bool,
    #[serde(default)]
    pub billing: Option<Address>,
    #[serde(default)]
    pub payment_method: String,
}

const fn same_as_shipping_default() -> bool {
    true
}

/// Why a cart line can no longer be ordered as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum LineProblem {
    /// The product left the catalog.
    Discontinued,
    /// The catalog price differs from the captured price.
    PriceChanged { captured: Decimal, current: Decimal },
    /// Fewer units are available than the line asks for.
    InsufficientStock { requested: u32, available: u32 },
}

/// A cart line that failed re-validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineIssue {
    pub product_id: ProductId,
    pub name: String,
    #[serde(flatten)]
    pub problem: LineProblem,
}

/// Check every cart line against the current catalog.
#[must_use]
pub fn revalidate(cart: &Cart, catalog: &Catalog) -> Vec<LineIssue> {
    cart.items()
        .iter()
        .filter_map(|item| check_line(item, catalog))
        .collect()
}

fn check_line(item: &CartItem, catalog: &Catalog) -> Option<LineIssue> {
    let problem = match catalog.product(item.product_id) {
        None => LineProblem::Discontinued,
        Some(product) if product.price != item.price => LineProblem::PriceChanged {
            captured: item.price,
            current: product.price,
        },
        Some(product) if !product.is_available() || product.stock_quantity < item.quantity => {
            LineProblem::InsufficientStock {
                requested: item.quantity,
                available: if product.in_stock {
                    product.stock_quantity
                } else {
                    0
                },
            }
        }
        Some(_) => return None,
    };
    Some(LineIssue {
        product_id: item.product_id,
        name: item.name.clone(),
        problem,
    })
}

/// What the checkout page shows before the order is placed.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSummary {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
    pub issues: Vec<LineIssue>,
    pub payment_methods: Vec<PaymentMethod>,
    pub shipping_address: Address,
}

/// Checkout for one signed-in client.
pub struct Checkout<'a, S> {
    carts: CartStore<'a, S>,
    catalog: &'a Catalog,
    rules: &'a PricingRules,
    orders: &'a dyn OrderService,
}

impl<'a, S: SnapshotStore> Checkout<'a, S> {
    #[must_use]
    pub const fn new(
        store: &'a S,
        catalog: &'a Catalog,
        rules: &'a PricingRules,
        orders: &'a dyn OrderService,
    ) -> Self {
        Self {
            carts: CartStore::new(store, catalog),
            catalog,
            rules,
            orders,
        }
    }

    /// Cart lines, totals and any stale lines, with the shipping address
    /// prefilled from the profile.
    ///
    /// # Errors
    ///
    /// `EmptyCart` when there is nothing to buy, `Cart` on storage failure.
    pub async fn summary(&self, user: &User) -> Result<CheckoutSummary, CheckoutError> {
        let snapshot = self.carts.snapshot().await?;
        let cart = snapshot
            .cart
            .as_ref()
            .filter(|cart| !cart.is_empty())
            .ok_or(CheckoutError::EmptyCart)?;

        Ok(CheckoutSummary {
            items: cart.items().to_vec(),
            totals: snapshot.totals(self.rules),
            issues: revalidate(cart, self.catalog),
            payment_methods: SAVED_PAYMENT_METHODS.to_vec(),
            shipping_address: prefill(user),
        })
    }

    /// Validate the form, re-check the cart, charge and record the order,
    /// then clear the cart.
    ///
    /// # Errors
    ///
    /// `EmptyCart`, `Invalid` with field errors, `StaleCart` listing each
    /// line that changed, `Order` when payment fails, `Cart` on storage
    /// failure. The cart is left untouched on every error.
    #[instrument(skip(self, user, request), fields(user_id = %user.id))]
    pub async fn place_order(
        &self,
        user: &User,
        request: CheckoutRequest,
    ) -> Result<Order, CheckoutError> {
        let snapshot = self.carts.snapshot().await?;
        let cart = snapshot
            .cart
            .as_ref()
            .filter(|cart| !cart.is_empty())
            .ok_or(CheckoutError::EmptyCart)?;

        let (shipping_address, billing_address, payment_method) = validate_request(request)?;

        let issues = revalidate(cart, self.catalog);
        if !issues.is_empty() {
            tracing::warn!(issues = issues.len(), "Checkout rejected, cart is stale");
            return Err(CheckoutError::StaleCart(issues));
        }

        let order = self
            .orders
            .place_order(NewOrder {
                user_id: user.id,
                items: cart.items().iter().map(OrderItem::from).collect(),
                shipping_address,
                billing_address,
                payment_method: payment_method.id.to_string(),
                totals: snapshot.totals(self.rules),
            })
            .await?;

        self.carts.clear().await?;
        Ok(order)
    }
}

fn validate_request(
    request: CheckoutRequest,
) -> Result<(Address, Address, PaymentMethod), CheckoutError> {
    let mut errors = request.shipping.validate("shipping");

    let billing = if request.same_as_shipping {
        request.shipping.clone()
    } else if let Some(billing) = request.billing {
        errors.merge(billing.validate("billing"));
        billing
    } else {
        errors.add("billing", "billing address is required");
        Address::default()
    };

    let payment_method = PaymentMethod::find(request.payment_method.trim());
    if payment_method.is_none() {
        errors.add("payment_method", "choose a saved payment method");
    }

    errors.into_result().map_err(CheckoutError::Invalid)?;
    let payment_method =
        payment_method.ok_or_else(|| CheckoutError::Invalid(ValidationErrors::new()))?;
    Ok((request.shipping, billing, payment_method))
}

fn prefill(user: &User) -> Address {
    Address {
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.to_string(),
        phone: user.phone.clone().unwrap_or_default(),
        address: user.address.clone().unwrap_or_default(),
        country: DEFAULT_COUNTRY.to_string(),
        ..Address::default()
    }
}
