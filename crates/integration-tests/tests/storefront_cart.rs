//! Integration tests for the cart over HTTP.

use axum::http::StatusCode;
use bizoe_integration_tests::TestApp;
use serde_json::json;

const REVO: i32 = 1;
const RESIN: i32 = 5;

#[tokio::test]
async fn test_empty_cart() {
    let mut app = TestApp::new();
    let response = app.get("/cart").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["empty"], true);
    assert_eq!(response.body["totals"]["total"], "$0.00");
    assert_eq!(response.body["totals"]["shipping"], "$0.00");
    assert_eq!(app.get("/cart/count").await.body["count"], 0);
}

#[tokio::test]
async fn test_reference_totals() {
    let mut app = TestApp::new();
    app.add_to_cart(RESIN, 1).await;
    app.add_to_cart(RESIN, 1).await;
    let response = app.add_to_cart(REVO, 1).await;

    let items = response.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let resin = items.iter().find(|i| i["product_id"] == RESIN).unwrap();
    assert_eq!(resin["quantity"], 2);

    let totals = &response.body["totals"];
    assert_eq!(totals["subtotal"], "$959.97");
    assert_eq!(totals["shipping"], "$0.00");
    assert_eq!(totals["tax"], "$76.80");
    assert_eq!(totals["total"], "$1,036.77");
    assert_eq!(totals["free_shipping"], true);

    assert_eq!(app.get("/cart/count").await.body["count"], 3);
}

#[tokio::test]
async fn test_flat_shipping_below_threshold() {
    let mut app = TestApp::new();
    let response = app.add_to_cart(RESIN, 1).await;

    let totals = &response.body["totals"];
    assert_eq!(totals["shipping"], "$9.99");
    assert_eq!(totals["free_shipping"], false);
    assert_eq!(totals["free_shipping_remaining"], "$70.01");
}

#[tokio::test]
async fn test_update_and_remove() {
    let mut app = TestApp::new();
    app.add_to_cart(RESIN, 2).await;
    app.add_to_cart(REVO, 1).await;

    let response = app.patch("/cart/items/5", json!({ "quantity": 4 })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["totals"]["item_count"], 5);

    let response = app.patch("/cart/items/5", json!({ "quantity": 0 })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["items"].as_array().unwrap().len(), 1);

    let response = app.delete("/cart/items/1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["empty"], true);

    let response = app.delete("/cart/items/1").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quantity_is_clamped_to_stock() {
    let mut app = TestApp::new();
    // Formlabs Form 3+ has 5 units.
    let response = app.add_to_cart(3, 9).await;
    assert_eq!(response.body["items"][0]["quantity"], 5);

    let response = app.patch("/cart/items/3", json!({ "quantity": 50 })).await;
    assert_eq!(response.body["items"][0]["quantity"], 5);
}

#[tokio::test]
async fn test_rejected_adds() {
    let mut app = TestApp::new();

    let response = app
        .post("/cart/items", json!({ "product_id": 999, "quantity": 1 }))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .post("/cart/items", json!({ "product_id": RESIN, "quantity": 0 }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());

    assert_eq!(app.get("/cart/count").await.body["count"], 0);
}

#[tokio::test]
async fn test_promo_codes() {
    let mut app = TestApp::new();
    app.add_to_cart(RESIN, 2).await;
    app.add_to_cart(REVO, 1).await;

    let response = app.post("/cart/promo", json!({ "code": " welcome10 " })).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["totals"]["promo"]["code"], "WELCOME10");
    assert_eq!(response.body["totals"]["discount"], "$96.00");
    assert_eq!(response.body["totals"]["total"], "$940.77");

    // An unknown code is rejected and the applied one stays.
    let response = app.post("/cart/promo", json!({ "code": "FREESTUFF" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let cart = app.get("/cart").await;
    assert_eq!(cart.body["totals"]["promo"]["code"], "WELCOME10");

    let response = app.delete("/cart/promo").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["totals"]["promo"].is_null());
    assert_eq!(response.body["totals"]["discount"], "$0.00");
}

#[tokio::test]
async fn test_clear_cart() {
    let mut app = TestApp::new();
    app.add_to_cart(RESIN, 2).await;
    app.post("/cart/promo", json!({ "code": "SAVE15" })).await;

    let response = app.delete("/cart").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["empty"], true);

    let cart = app.get("/cart").await;
    assert_eq!(cart.body["empty"], true);
    assert!(cart.body["totals"]["promo"].is_null());
}

#[tokio::test]
async fn test_clients_do_not_share_carts() {
    let mut alice = TestApp::new();
    let mut bob = alice.new_client();

    alice.add_to_cart(RESIN, 2).await;
    assert_eq!(bob.get("/cart/count").await.body["count"], 0);

    bob.add_to_cart(REVO, 1).await;
    assert_eq!(alice.get("/cart/count").await.body["count"], 2);
    assert_eq!(bob.get("/cart/count").await.body["count"], 1);
}
