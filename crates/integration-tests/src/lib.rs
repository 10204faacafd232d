//! Integration tests for FrazModern.
//!
//! The tests drive running servers over HTTP, so they are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare a seeded database
//! fm-cli migrate && fm-cli seed
//!
//! # Start both servers, then
//! cargo test -p fraz-modern-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - Storefront address (default: `http://localhost:3000`)
//! - `ADMIN_BASE_URL` - Admin address (default: `http://localhost:3001`)
//! - `ADMIN_EMAIL`, `ADMIN_PASSWORD` - Seeded administrator credentials

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL of the storefront API.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL of the admin API.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A client that keeps session cookies between requests.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// An email address no other test run has used.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// Register a fresh shopper and log them in.
///
/// Returns the client holding the session and the new user's email.
pub async fn shopper_session() -> (Client, String) {
    let client = session_client();
    let base = storefront_base_url();
    let email = unique_email("shopper");

    let resp = client
        .post(format!("{base}/api/auth/register"))
        .json(&json!({"email": email, "password": "correct-horse", "name": "Test Shopper"}))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"email": email, "password": "correct-horse"}))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);

    (client, email)
}

/// Log in to the back office with the seeded administrator.
pub async fn admin_session() -> Client {
    let client = session_client();
    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@ecommerce.com".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

    let resp = client
        .post(format!("{}/api/auth/login", admin_base_url()))
        .json(&json!({"email": email, "password": password}))
        .send()
        .await
        .expect("Failed to log in to admin");
    assert_eq!(resp.status(), StatusCode::OK);

    client
}

/// Read a JSON body, failing the test on anything else.
pub async fn json_body(resp: reqwest::Response) -> Value {
    resp.json().await.expect("Response was not JSON")
}
