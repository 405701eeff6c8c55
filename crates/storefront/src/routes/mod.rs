//! HTTP route handlers for storefront.
//!
//! Every handler answers JSON. Page payloads are wrapped in [`Page`], which
//! declares the locale and translation namespaces the client must load.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness
//! GET    /health/ready              - Readiness (catalog loaded)
//! GET    /                          - Home page
//!
//! # Products
//! GET    /products                  - Product listing (search, category, sort, price, stock)
//! GET    /products/{id}             - Product detail with related products
//! GET    /categories                - Categories with product counts
//!
//! # Cart
//! GET    /cart                      - Cart page
//! DELETE /cart                      - Clear cart
//! GET    /cart/count                - Cart count badge
//! POST   /cart/items                - Add to cart
//! PATCH  /cart/items/{product_id}   - Update quantity (zero removes)
//! DELETE /cart/items/{product_id}   - Remove item
//! POST   /cart/promo                - Apply promo code
//! DELETE /cart/promo                - Remove promo code
//!
//! # Checkout (requires auth)
//! GET    /checkout                  - Checkout summary
//! POST   /checkout                  - Place order
//!
//! # Auth
//! GET    /auth/login                - Login page
//! GET    /auth/register             - Register page
//! POST   /api/auth/login            - Login
//! POST   /api/auth/register         - Register
//! POST   /api/auth/logout           - Logout
//! GET    /api/auth/session          - Current auth state
//!
//! # Account (requires auth)
//! GET    /account                   - Account overview
//! GET    /account/profile           - Profile
//! PUT    /account/profile           - Update profile
//! POST   /account/password          - Change password
//! GET    /account/orders            - Order history
//! GET    /account/payment-methods   - Saved payment methods
//!
//! # Content
//! GET    /contact                   - Contact page
//! POST   /contact                   - Submit contact form
//! GET    /about, /faq, /terms, /privacy, /shipping, /returns,
//!        /promotions, /site-map     - Informational pages
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod contact;
pub mod home;
pub mod pages;
pub mod products;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::Serialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::i18n::{COMMON_NAMESPACES, Locale};
use crate::middleware::create_session_layer;
use crate::state::AppState;

/// Envelope for page payloads.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub locale: Locale,
    pub namespaces: &'static [&'static str],
    pub title: &'static str,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Page<T> {
    pub const fn new(locale: Locale, title: &'static str, data: T) -> Self {
        Self {
            locale,
            namespaces: COMMON_NAMESPACES,
            title,
            data,
        }
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/count", get(cart::count))
        .route("/items", post(cart::add))
        .route(
            "/items/{product_id}",
            patch(cart::update).delete(cart::remove),
        )
        .route("/promo", post(cart::apply_promo).delete(cart::remove_promo))
}

/// Create the auth page routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
}

/// Create the auth API routes router.
pub fn auth_api_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::current))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/profile", get(account::profile).put(account::update_profile))
        .route("/password", post(account::change_password))
        .route("/orders", get(account::orders))
        .route("/payment-methods", get(account::payment_methods))
}

/// Create the informational page routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/about", get(pages::about))
        .route("/faq", get(pages::faq))
        .route("/terms", get(pages::terms))
        .route("/privacy", get(pages::privacy))
        .route("/shipping", get(pages::shipping))
        .route("/returns", get(pages::returns))
        .route("/promotions", get(pages::promotions))
        .route("/site-map", get(pages::site_map))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .nest("/products", product_routes())
        .route("/categories", get(products::categories))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout
        .route("/checkout", get(checkout::show).post(checkout::place_order))
        // Auth
        .nest("/auth", auth_routes())
        .nest("/api/auth", auth_api_routes())
        // Account routes
        .nest("/account", account_routes())
        // Content
        .route("/contact", get(contact::page).post(contact::submit))
        .merge(page_routes())
}

/// Build the storefront application: routes, health checks, sessions and
/// request tracing.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .fallback(not_found)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness check: the catalog has products to sell.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if state.catalog().products().is_empty() {
        (StatusCode::SERVICE_UNAVAILABLE, "catalog empty")
    } else {
        (StatusCode::OK, "ok")
    }
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("Not found: {}", uri.path()) })),
    )
}
