//! Integration tests for the admin back office.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (`fm-cli migrate && fm-cli seed`)
//! - The admin server running (cargo run -p fraz-modern-admin)
//! - The storefront server running, for the order tests

#![allow(clippy::expect_used, clippy::unwrap_used)]

use fraz_modern_integration_tests::{
    admin_base_url, admin_session, json_body, session_client, shopper_session,
    storefront_base_url,
};
use reqwest::StatusCode;
use serde_json::json;

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and seeded database"]
async fn test_api_requires_admin_session() {
    let resp = session_client()
        .get(format!("{}/api/products", admin_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server and seeded database"]
async fn test_shopper_cannot_log_in() {
    let resp = session_client()
        .post(format!("{}/api/auth/login", admin_base_url()))
        .json(&json!({"email": "user@test.com", "password": "user1234"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running admin server and seeded database"]
async fn test_me_and_logout() {
    let client = admin_session().await;
    let base = admin_base_url();

    let me = client.get(format!("{base}/api/auth/me")).send().await.unwrap();
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(json_body(me).await["isAdmin"], true);

    let out = client.post(format!("{base}/api/auth/logout")).send().await.unwrap();
    assert!(out.status().is_success());

    let me = client.get(format!("{base}/api/auth/me")).send().await.unwrap();
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Catalog management
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and seeded database"]
async fn test_product_lifecycle() {
    let client = admin_session().await;
    let base = admin_base_url();
    let sku = format!("IT-{}", uuid::Uuid::new_v4().simple());

    let resp = client
        .post(format!("{base}/api/products"))
        .json(&json!({"name": "Integration Lamp", "price": "19.99", "sku": sku, "stock": 4}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(resp).await;
    let id = created["id"].as_i64().unwrap();

    let resp = client
        .put(format!("{base}/api/products/{id}"))
        .json(&json!({"price": "24.50"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["price"], "24.50");

    let resp = client
        .post(format!("{base}/api/products"))
        .json(&json!({"name": "Copy", "price": "1.00", "sku": sku}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .delete(format!("{base}/api/products/{id}"))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let resp = client
        .get(format!("{base}/api/products/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let activity = json_body(client.get(format!("{base}/api/activity")).send().await.unwrap()).await;
    assert!(
        activity
            .as_array()
            .unwrap()
            .iter()
            .any(|a| a["entityType"] == "product" && a["entityId"] == id)
    );
}

#[tokio::test]
#[ignore = "Requires running admin server and seeded database"]
async fn test_negative_price_is_rejected() {
    let client = admin_session().await;
    let resp = client
        .post(format!("{}/api/products", admin_base_url()))
        .json(&json!({"name": "Bad", "price": "-1", "sku": "NEG-1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running admin server and seeded database"]
async fn test_price_beyond_money_column_is_rejected() {
    let client = admin_session().await;
    for (price, sku) in [("1000000000", "BIG-1"), ("9.999", "FINE-1")] {
        let resp = client
            .post(format!("{}/api/products", admin_base_url()))
            .json(&json!({"name": "Odd", "price": price, "sku": sku}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin and storefront servers and seeded database"]
async fn test_status_update_and_analytics() {
    let (shopper, _) = shopper_session().await;
    let store = storefront_base_url();
    let products = json_body(
        shopper
            .get(format!("{store}/api/products?limit=1"))
            .send()
            .await
            .unwrap(),
    )
    .await;
    let product_id = products["products"][0]["id"].as_i64().unwrap();
    shopper
        .post(format!("{store}/api/cart"))
        .json(&json!({"productId": product_id}))
        .send()
        .await
        .unwrap();
    let placed = json_body(
        shopper
            .post(format!("{store}/api/orders"))
            .json(&json!({}))
            .send()
            .await
            .unwrap(),
    )
    .await;
    let order_id = placed["order"]["id"].as_i64().unwrap();

    let admin = admin_session().await;
    let base = admin_base_url();

    let resp = admin
        .put(format!("{base}/api/orders/{order_id}"))
        .json(&json!({"status": "teleported"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = admin
        .put(format!("{base}/api/orders/{order_id}"))
        .json(&json!({"status": "shipped", "trackingNumber": "1Z999"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = json_body(resp).await;
    assert_eq!(updated["status"], "shipped");
    assert_eq!(updated["trackingNumber"], "1Z999");

    let analytics = json_body(admin.get(format!("{base}/api/analytics")).send().await.unwrap()).await;
    assert!(analytics["totalOrders"].as_i64().unwrap() >= 1);
    assert!(analytics["trend"]["labels"].is_array());
}

// ============================================================================
// Exports
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and seeded database"]
async fn test_product_export_is_csv() {
    let client = admin_session().await;
    let resp = client
        .get(format!("{}/api/export/products", admin_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    let body = resp.text().await.unwrap();
    assert!(body.starts_with("id,name,sku,description,price,stock,createdAt"));
}
