//! BIZOE Core - domain library for the BIZOE 3D store.
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no HTTP, no persistence. The storefront wires these into request handlers
//! and session-backed storage.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, money and statuses
//! - [`catalog`] - Products, categories and the listing query
//! - [`cart`] - The cart reducer
//! - [`pricing`] - Shipping, tax and promo code rules
//! - [`auth`] - Customer profile and the anonymous/authenticated state machine
//! - [`order`] - Orders, addresses and payment methods
//! - [`validation`] - Field-level form errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod pricing;
pub mod types;
pub mod validation;

pub use auth::{AuthState, AuthStateError, AuthToken, ProfileUpdate, User};
pub use cart::{Cart, CartError, CartItem, LOCAL_CART_ID};
pub use catalog::{Catalog, CatalogError, Category, Product, ProductQuery, SortOrder};
pub use order::{
    Address, NewOrder, Order, OrderItem, OrderNumber, PaymentMethod, PaymentMethodKind,
    SAVED_PAYMENT_METHODS,
};
pub use pricing::{CartTotals, PricingRules, PromoCode, PromoError};
pub use types::*;
pub use validation::ValidationErrors;
