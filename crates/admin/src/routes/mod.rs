//! HTTP route handlers for the back-office JSON API.
//!
//! Everything except login requires an administrator session.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /api/auth/login                     - Start an admin session
//! POST   /api/auth/logout                    - End the session
//! GET    /api/auth/me                        - The signed-in administrator
//!
//! # Catalog
//! GET    /api/products                       - All products, paged
//! POST   /api/products                       - Create a product
//! GET    /api/products/{id}                  - Product detail
//! PUT    /api/products/{id}                  - Partial update
//! DELETE /api/products/{id}                  - Delete a product
//! POST   /api/products/{id}/images           - Add a gallery image
//! DELETE /api/products/{id}/images/{imageId} - Remove a gallery image
//! POST   /api/categories                     - Create a category
//! PUT    /api/categories/{id}                - Rename or describe
//! DELETE /api/categories/{id}                - Delete a category
//! POST   /api/upload                         - Upload an image
//!
//! # Sales
//! GET    /api/orders                         - All orders, `?userId=` filter
//! GET    /api/orders/{id}                    - One order
//! PUT    /api/orders/{id}                    - Status and tracking
//! GET    /api/coupons                        - All coupons
//! POST   /api/coupons                        - Create a coupon
//! PUT    /api/coupons/{id}                   - Partial update
//! DELETE /api/coupons/{id}                   - Delete a coupon
//!
//! # Customers
//! GET    /api/users                          - All users
//! GET    /api/users/{id}                     - User with statistics
//! PUT    /api/users/{id}                     - Grant or revoke admin
//! DELETE /api/users/{id}                     - Delete a user and their data
//! GET    /api/newsletter                     - Active subscribers
//! DELETE /api/newsletter/{id}                - Remove a subscriber
//! POST   /api/newsletter/send                - Send a campaign
//!
//! # Reporting
//! GET    /api/analytics                      - Dashboard figures
//! GET    /api/activity                       - Latest admin actions
//! GET    /api/export/{orders|products|users} - CSV downloads
//! ```

pub mod activity;
pub mod analytics;
pub mod auth;
pub mod categories;
pub mod coupons;
pub mod export;
pub mod newsletter;
pub mod orders;
pub mod products;
pub mod upload;
pub mod users;

use axum::Router;

use fraz_modern_storefront::models::CurrentUser;

use crate::db::ActivityRepository;
use crate::models::Activity;
use crate::state::AppState;

pub use fraz_modern_storefront::routes::{Success, send_in_background};

/// Add an entry to the audit trail.
///
/// The action already happened, so a failure is logged and not returned.
pub async fn record_activity(state: &AppState, admin: &CurrentUser, activity: Activity) {
    if let Err(e) = ActivityRepository::new(state.pool())
        .record(admin.id, &activity)
        .await
    {
        tracing::warn!(
            error = %e,
            action = %activity.action,
            admin_id = %admin.id,
            "Failed to record activity"
        );
    }
}

/// Everything under `/api` except the auth routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(products::router())
        .merge(categories::router())
        .merge(orders::router())
        .merge(coupons::router())
        .merge(users::router())
        .merge(newsletter::router())
        .merge(analytics::router())
        .merge(activity::router())
        .merge(export::router())
        .merge(upload::router())
}

/// Create all routes for the back office.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::router())
        .nest("/api", api_routes())
}
