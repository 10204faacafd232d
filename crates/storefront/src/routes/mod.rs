//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /api/auth/register              - Create an account
//! POST   /api/auth/login                 - Start a session
//! POST   /api/auth/logout                - End the session
//! GET    /api/auth/profile               - Current profile (auth)
//! PUT    /api/auth/profile               - Update profile, JSON or multipart (auth)
//!
//! # Catalog
//! GET    /api/products                   - Filtered, paged product listing
//! GET    /api/products/search            - Search and suggestions
//! GET    /api/products/{id}              - Product detail
//! GET    /api/products/{id}/reviews      - Reviews of a product
//! POST   /api/products/{id}/reviews      - Review a product (auth)
//! GET    /api/categories                 - Categories with product counts
//! GET    /api/categories/{id}            - Category with products
//!
//! # Shopper collections (auth)
//! GET|POST|PUT|DELETE /api/cart
//! GET|POST|DELETE     /api/wishlist
//! GET|POST            /api/recently-viewed
//!
//! # Checkout (auth)
//! GET    /api/orders                     - Order history
//! POST   /api/orders                     - Place an order from the cart
//! GET    /api/orders/{id}                - One order
//! GET    /api/coupons/validate           - Check a coupon code
//! POST   /api/checkout/payment-intent    - Create a payment intent
//!
//! # Newsletter
//! POST   /api/newsletter                 - Subscribe
//! DELETE /api/newsletter                 - Unsubscribe
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod coupons;
pub mod newsletter;
pub mod orders;
pub mod products;
pub mod recently_viewed;
pub mod wishlist;

use std::future::Future;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use serde::Serialize;

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::services::uploads::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Room for the multipart framing and text fields around an upload.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// `{"success": true}` acknowledgement body.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    #[must_use]
    pub const fn new() -> Self {
        Self { success: true }
    }
}

impl Default for Success {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a side effect after the response is decided.
///
/// Failures are logged and otherwise ignored.
pub fn send_in_background<F, E>(what: &'static str, fut: F)
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: std::fmt::Display,
{
    tokio::spawn(async move {
        if let Err(e) = fut.await {
            tracing::warn!(error = %e, "Failed to send {what} email");
        }
    });
}

/// Registration and login, behind the strict limiter.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
        .route(
            "/profile",
            get(auth::profile)
                .put(auth::update_profile)
                .layer(DefaultBodyLimit::max(
                    MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES,
                )),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/search", get(products::search))
        .route("/{id}", get(products::show))
        .route(
            "/{id}/reviews",
            get(products::reviews).post(products::create_review),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{id}", get(categories::show))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show))
}

/// Everything under `/api` except the auth routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .route(
            "/cart",
            get(cart::show)
                .post(cart::add)
                .put(cart::update)
                .delete(cart::remove),
        )
        .route(
            "/wishlist",
            get(wishlist::show)
                .post(wishlist::add)
                .delete(wishlist::remove),
        )
        .route(
            "/recently-viewed",
            get(recently_viewed::index).post(recently_viewed::record),
        )
        .nest("/orders", order_routes())
        .route("/coupons/validate", get(coupons::validate))
        .route(
            "/checkout/payment-intent",
            post(checkout::create_payment_intent),
        )
        .route(
            "/newsletter",
            post(newsletter::subscribe).delete(newsletter::unsubscribe),
        )
        .layer(api_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api", api_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_body() {
        assert_eq!(
            serde_json::to_value(Success::new()).unwrap(),
            serde_json::json!({ "success": true })
        );
    }
}
