//! Integration tests for the BIZOE storefront.
//!
//! The tests drive the full router in-process with
//! `tower::ServiceExt::oneshot`; no server or network is needed. A
//! [`TestApp`] plays one browser: it keeps the session cookie from each
//! response and sends it with the next request.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bizoe-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_catalog` - Products, categories, pages and locale
//! - `storefront_cart` - Cart reducer and promo codes over HTTP
//! - `storefront_auth` - Login, registration, logout and account access
//! - `storefront_checkout` - Order placement

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use bizoe_storefront::config::{MockLatencyConfig, StorefrontConfig};
use bizoe_storefront::content::load_catalog;
use bizoe_storefront::routes;
use bizoe_storefront::services::{MockAuthService, MockContactService, MockOrderService};
use bizoe_storefront::state::{AppState, Services};
use serde_json::{Value, json};
use tower::ServiceExt;

/// A response with its body parsed as JSON (or kept as a string).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// One client talking to an in-process storefront.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
    pub auth: Arc<MockAuthService>,
    pub orders: Arc<MockOrderService>,
    pub contact: Arc<MockContactService>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// A storefront with the bundled catalog and zero-latency mock services.
    ///
    /// # Panics
    ///
    /// Panics if the bundled catalog does not parse.
    #[must_use]
    pub fn new() -> Self {
        let mut config = StorefrontConfig::local();
        config.latency = MockLatencyConfig::none();

        let auth = Arc::new(MockAuthService::new(&config.latency));
        let orders = Arc::new(MockOrderService::new(config.latency.checkout));
        let contact = Arc::new(MockContactService::new(config.latency.contact));
        let services = Services {
            auth: auth.clone(),
            orders: orders.clone(),
            contact: contact.clone(),
        };

        let catalog = load_catalog().expect("Failed to load bundled catalog");
        let state = AppState::with_services(config, catalog, services);

        Self {
            router: routes::app(state),
            cookie: None,
            auth,
            orders,
            contact,
        }
    }

    /// A second client on the same storefront, without this client's
    /// session.
    #[must_use]
    pub fn new_client(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
            auth: self.auth.clone(),
            orders: self.orders.clone(),
            contact: self.contact.clone(),
        }
    }

    /// Send a request, carrying and updating the session cookie.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn request(
        &mut self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(header::HeaderName, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        for (name, value) in headers {
            builder = builder.header(name, *value);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(pair) = set_cookie.split(';').next() {
                self.cookie = Some(pair.to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, &[]).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), &[]).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body), &[]).await
    }

    pub async fn patch(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(body), &[]).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None, &[]).await
    }

    /// Register and sign in a valid account.
    ///
    /// # Panics
    ///
    /// Panics if registration is rejected.
    pub async fn sign_up(&mut self, email: &str) -> TestResponse {
        let response = self
            .post(
                "/api/auth/register",
                json!({
                    "first_name": "Mei",
                    "last_name": "Lin",
                    "email": email,
                    "phone": "+886 912-345-678",
                    "password": "Printer3D",
                    "confirm_password": "Printer3D",
                    "agree_to_terms": true,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response
    }

    /// Add a product to the cart.
    ///
    /// # Panics
    ///
    /// Panics if the product cannot be added.
    pub async fn add_to_cart(&mut self, product_id: i32, quantity: u32) -> TestResponse {
        let response = self
            .post(
                "/cart/items",
                json!({ "product_id": product_id, "quantity": quantity }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response
    }
}

/// A complete, valid shipping address.
#[must_use]
pub fn shipping_address() -> Value {
    json!({
        "first_name": "Mei",
        "last_name": "Lin",
        "email": "mei@example.com",
        "phone": "0912345678",
        "address": "No. 7, Section 1, Zhongxiao E. Rd.",
        "city": "Taipei",
        "state": "Taipei",
        "zip_code": "100",
        "country": "TW",
    })
}
