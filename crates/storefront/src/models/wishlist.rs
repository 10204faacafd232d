//! Wishlist and recently viewed models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fraz_modern_core::{ProductId, WishlistId, WishlistItemId};

use super::ProductSummary;

/// A user's wishlist.
#[derive(Debug, Clone, Serialize)]
pub struct Wishlist {
    pub id: WishlistId,
    pub items: Vec<WishlistItem>,
}

/// A saved product, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
    pub product: ProductSummary,
}

/// A product the user looked at recently.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyViewedItem {
    pub viewed_at: DateTime<Utc>,
    pub product: ProductSummary,
}
