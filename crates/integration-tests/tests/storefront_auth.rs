//! Integration tests for authentication and account access.

use axum::http::StatusCode;
use bizoe_integration_tests::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_starts_anonymous() {
    let mut app = TestApp::new();
    let response = app.get("/api/auth/session").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["authenticated"], false);
    assert!(response.body["user"].is_null());
    assert!(response.body["token"].is_null());
}

#[tokio::test]
async fn test_login_any_credentials() {
    let mut app = TestApp::new();
    let response = app
        .post(
            "/api/auth/login?returnUrl=%2Fcheckout",
            json!({ "email": "Maker@Example.com", "password": "whatever" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["authenticated"], true);
    assert_eq!(response.body["user"]["email"], "maker@example.com");
    assert!(response.body["token"].as_str().unwrap().starts_with("mock-"));
    assert_eq!(response.body["redirect_to"], "/checkout");

    let session = app.get("/api/auth/session").await;
    assert_eq!(session.body["authenticated"], true);
    assert_eq!(session.body["token"], response.body["token"]);
}

#[tokio::test]
async fn test_login_validation() {
    let mut app = TestApp::new();
    let response = app
        .post(
            "/api/auth/login",
            json!({ "email": "not-an-email", "password": "123" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["fields"]["email"].is_string());
    assert!(response.body["fields"]["password"].is_string());
    assert_eq!(app.get("/api/auth/session").await.body["authenticated"], false);
}

#[tokio::test]
async fn test_off_site_return_url_is_replaced() {
    let mut app = TestApp::new();
    for target in ["%2F%5Cevil.example", "%2F%2Fevil.example", "https%3A%2F%2Fevil.example"] {
        let response = app.get(&format!("/auth/login?returnUrl={target}")).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["redirect_to"], "/account", "{target}");
    }

    let response = app.get("/auth/login?returnUrl=%2Fcart").await;
    assert_eq!(response.body["redirect_to"], "/cart");
}

#[tokio::test]
async fn test_missing_password_is_a_field_error() {
    let mut app = TestApp::new();
    let response = app
        .post("/api/auth/login", json!({ "email": "a@b.co" }))
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["fields"]["password"], "password is required");
    assert!(response.body["fields"].get("email").is_none());
}

#[tokio::test]
async fn test_registration_validation() {
    let mut app = TestApp::new();
    let response = app
        .post(
            "/api/auth/register",
            json!({
                "first_name": "Mei",
                "last_name": "",
                "email": "mei@example.com",
                "phone": "123",
                "password": "weakpass",
                "confirm_password": "different",
                "agree_to_terms": false,
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = response.body["fields"].as_object().unwrap();
    for field in [
        "last_name",
        "phone",
        "password",
        "confirm_password",
        "agree_to_terms",
    ] {
        assert!(fields.contains_key(field), "missing error for {field}");
    }
    assert!(!fields.contains_key("first_name"));
}

#[tokio::test]
async fn test_registered_profile_survives_relogin() {
    let mut app = TestApp::new();
    app.sign_up("mei@example.com").await;
    app.post("/api/auth/logout", json!({})).await;

    let response = app
        .post(
            "/api/auth/login",
            json!({ "email": "mei@example.com", "password": "Printer3D" }),
        )
        .await;
    assert_eq!(response.body["user"]["first_name"], "Mei");
    assert_eq!(response.body["user"]["phone"], "+886 912-345-678");
}

#[tokio::test]
async fn test_logout_clears_auth_and_protects_account() {
    let mut app = TestApp::new();
    app.sign_up("mei@example.com").await;
    assert_eq!(app.get("/account").await.status, StatusCode::OK);

    let response = app.post("/api/auth/logout", json!({})).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["authenticated"], false);
    assert!(response.body["user"].is_null());
    assert!(response.body["token"].is_null());

    let response = app.get("/account").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        response.location(),
        Some("/auth/login?returnUrl=%2Faccount")
    );
}

#[tokio::test]
async fn test_logout_keeps_cart() {
    let mut app = TestApp::new();
    app.sign_up("mei@example.com").await;
    app.add_to_cart(5, 2).await;
    app.post("/api/auth/logout", json!({})).await;
    assert_eq!(app.get("/cart/count").await.body["count"], 2);
}

#[tokio::test]
async fn test_auth_service_outage() {
    let mut app = TestApp::new();
    app.auth.set_available(false);

    let response = app
        .post(
            "/api/auth/login",
            json!({ "email": "mei@example.com", "password": "Printer3D" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(app.get("/api/auth/session").await.body["authenticated"], false);
}

// ============================================================================
// Account
// ============================================================================

#[tokio::test]
async fn test_account_pages_require_sign_in() {
    let mut app = TestApp::new();
    for path in [
        "/account",
        "/account/profile",
        "/account/orders",
        "/account/payment-methods",
    ] {
        let response = app.get(path).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{path}");
        assert!(
            response
                .location()
                .unwrap()
                .starts_with("/auth/login?returnUrl="),
            "{path}"
        );
    }
}

#[tokio::test]
async fn test_profile_update() {
    let mut app = TestApp::new();
    app.sign_up("mei@example.com").await;

    let response = app
        .put(
            "/account/profile",
            json!({ "first_name": "May", "address": "No. 7, Taipei" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["first_name"], "May");
    assert_eq!(response.body["user"]["last_name"], "Lin");

    let session = app.get("/api/auth/session").await;
    assert_eq!(session.body["user"]["first_name"], "May");
    assert_eq!(session.body["user"]["address"], "No. 7, Taipei");

    let response = app.put("/account/profile", json!({ "first_name": " " })).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_password_change() {
    let mut app = TestApp::new();
    app.sign_up("mei@example.com").await;

    let response = app
        .post(
            "/account/password",
            json!({
                "current_password": "Printer3D",
                "new_password": "Resin2024",
                "confirm_password": "Resin2024",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["changed"], true);

    let response = app
        .post(
            "/account/password",
            json!({
                "current_password": "Printer3D",
                "new_password": "Resin2024",
                "confirm_password": "Resin2025",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["fields"]["confirm_password"].is_string());
}

#[tokio::test]
async fn test_payment_methods() {
    let mut app = TestApp::new();
    app.sign_up("mei@example.com").await;

    let response = app.get("/account/payment-methods").await;
    let methods = response.body["payment_methods"].as_array().unwrap();
    assert_eq!(methods.len(), 4);
    assert_eq!(methods[0]["id"], "visa_4242");

    let overview = app.get("/account").await;
    assert_eq!(overview.body["payment_methods"].as_array().unwrap().len(), 2);
    assert_eq!(overview.body["display_name"], "Mei Lin");
}
