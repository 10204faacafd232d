//! Back-office queries over the shared `shop` schema.
//!
//! Catalog, order, coupon, user and newsletter repositories come from
//! `fraz_modern_storefront::db`. This module adds what only the back office
//! needs:
//!
//! - `activity` - The `activity_log` audit trail
//! - `analytics` - Sales totals, best seller and monthly sales
//! - `accounts` - User statistics and the account deletion cascade
//! - `exports` - Rows for the CSV exports

pub mod accounts;
pub mod activity;
pub mod analytics;
pub mod exports;

pub use accounts::AccountRepository;
pub use activity::ActivityRepository;
pub use analytics::AnalyticsRepository;
pub use exports::ExportRepository;
pub use fraz_modern_storefront::db::{RepositoryError, create_pool};
