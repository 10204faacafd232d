//! Response and request types specific to the back office.
//!
//! Catalog, order, coupon and user types are shared with the storefront and
//! live in `fraz_modern_storefront::models`.

pub mod activity;
pub mod analytics;
pub mod user;

pub use activity::{Activity, ActivityEntry};
pub use analytics::{Analytics, BestSeller, SalesTrend};
pub use user::{AdminFlagUpdate, UserDetail, UserListItem};
