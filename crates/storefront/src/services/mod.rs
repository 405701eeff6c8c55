//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Mock login/registration and the per-client auth store
//! - `cart` - Cart reducer over the client's snapshot
//! - `checkout` - Cart re-validation and order placement
//! - `orders` - Payment processing and order history
//! - `contact` - Contact form submissions

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod orders;

pub use auth::{AuthError, AuthService, AuthStore, MockAuthService};
pub use cart::{CartServiceError, CartSnapshot, CartStore};
pub use checkout::{Checkout, CheckoutError, CheckoutRequest};
pub use contact::{ContactError, ContactService, MockContactService};
pub use orders::{MockOrderService, OrderError, OrderService};
