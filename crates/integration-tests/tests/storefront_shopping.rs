//! Integration tests for the shopper journey.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (`fm-cli migrate && fm-cli seed`)
//! - The storefront server running (cargo run -p fraz-modern-storefront)

#![allow(clippy::expect_used, clippy::unwrap_used)]

use fraz_modern_integration_tests::{
    json_body, session_client, shopper_session, storefront_base_url, unique_email,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

/// Id of the first active product in the catalog.
async fn first_product_id() -> i64 {
    let resp = session_client()
        .get(format!("{}/api/products?limit=1", storefront_base_url()))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    body["products"][0]["id"].as_i64().expect("Catalog is empty")
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_product_listing_is_paged() {
    let resp = session_client()
        .get(format!("{}/api/products?page=1&limit=3", storefront_base_url()))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    let products = body["products"].as_array().unwrap();
    assert!(products.len() <= 3);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 3);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_unknown_product_is_not_found() {
    let resp = session_client()
        .get(format!("{}/api/products/999999", storefront_base_url()))
        .send()
        .await
        .expect("Failed to fetch product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_categories_carry_counts() {
    let resp = session_client()
        .get(format!("{}/api/categories", storefront_base_url()))
        .send()
        .await
        .expect("Failed to list categories");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    let categories = body.as_array().unwrap();
    assert!(!categories.is_empty());
    assert!(categories.iter().all(|c| c.get("productCount").is_some()));
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_duplicate_registration_conflicts() {
    let client = session_client();
    let base = storefront_base_url();
    let email = unique_email("dupe");
    let body = json!({"email": email, "password": "correct-horse"});

    let first = client
        .post(format!("{base}/api/auth/register"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client
        .post(format!("{base}/api/auth/register"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_profile_requires_session() {
    let resp = session_client()
        .get(format!("{}/api/auth/profile", storefront_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let (client, email) = shopper_session().await;
    let resp = client
        .get(format!("{}/api/auth/profile", storefront_base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["email"], Value::String(email));
}

// ============================================================================
// Cart & Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_cart_merges_repeat_adds() {
    let (client, _) = shopper_session().await;
    let base = storefront_base_url();
    let product_id = first_product_id().await;

    for _ in 0..2 {
        let resp = client
            .post(format!("{base}/api/cart"))
            .json(&json!({"productId": product_id, "quantity": 1}))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
    }

    let cart = json_body(client.get(format!("{base}/api/cart")).send().await.unwrap()).await;
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(cart["itemCount"], 2);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_order_empties_the_cart() {
    let (client, _) = shopper_session().await;
    let base = storefront_base_url();
    let product_id = first_product_id().await;

    client
        .post(format!("{base}/api/cart"))
        .json(&json!({"productId": product_id, "quantity": 3}))
        .send()
        .await
        .unwrap();

    let resp = client
        .post(format!("{base}/api/orders"))
        .json(&json!({
            "shippingAddress": {
                "fullName": "Test Shopper",
                "streetAddress": "1 Main St",
                "city": "Springfield",
                "state": "IL",
                "zipCode": "62701",
                "country": "US"
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let placed = json_body(resp).await;
    assert_eq!(placed["success"], true);
    assert_eq!(placed["order"]["status"], "pending");
    assert_eq!(placed["order"]["items"][0]["quantity"], 3);

    let cart = json_body(client.get(format!("{base}/api/cart")).send().await.unwrap()).await;
    assert!(cart["items"].as_array().unwrap().is_empty());

    let history = json_body(client.get(format!("{base}/api/orders")).send().await.unwrap()).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_order_with_empty_cart_is_rejected() {
    let (client, _) = shopper_session().await;
    let resp = client
        .post(format!("{}/api/orders", storefront_base_url()))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Newsletter
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_newsletter_subscribe_twice() {
    let client = session_client();
    let base = storefront_base_url();
    let email = unique_email("news");

    let first = client
        .post(format!("{base}/api/newsletter"))
        .json(&json!({"email": email}))
        .send()
        .await
        .unwrap();
    assert!(first.status().is_success());

    let second = client
        .post(format!("{base}/api/newsletter"))
        .json(&json!({"email": email}))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_newsletter_requires_dotted_domain() {
    let resp = session_client()
        .post(format!("{}/api/newsletter", storefront_base_url()))
        .json(&json!({"email": "reader@localhost"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert_eq!(body["error"], "Invalid email format");
}

// ============================================================================
// Coupons
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and seeded database"]
async fn test_coupon_subtotal_out_of_range() {
    let client = session_client();
    let base = storefront_base_url();

    for subtotal in ["-5", "79228162514264337593543950335"] {
        let resp = client
            .get(format!(
                "{base}/api/coupons/validate?code=SAVE10&subtotal={subtotal}"
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = json_body(resp).await;
        assert_eq!(body["error"], "Invalid subtotal");
    }
}
