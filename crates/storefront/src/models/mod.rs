//! Domain models for the storefront and back-office APIs.
//!
//! Types here are what handlers serialize (camelCase JSON) and what request
//! bodies deserialize into. Database row types stay private to `crate::db`.

pub mod cart;
pub mod catalog;
pub mod catalog_input;
pub mod coupon;
pub mod newsletter;
pub mod order;
pub mod session;
pub mod user;
pub mod wishlist;

pub use cart::{Cart, CartLine};
pub use catalog::{
    Category, CategoryDetail, CategoryRef, CategoryWithCount, Product, ProductDetail,
    ProductImage, ProductListQuery, ProductSort, ProductSummary, Review, ReviewAuthor,
    SortOrder,
};
pub use catalog_input::{
    CategoryFields, CategoryInput, ProductFields, ProductImageInput, ProductInput, ProductPatch,
};
pub use coupon::{Coupon, CouponInput, CouponPatch, NewCoupon, normalize_code};
pub use newsletter::Subscriber;
pub use order::{NewOrder, Order, OrderItem, OrderUpdate, OrderWithUser, ShippingAddress};
pub use session::{CurrentUser, session_keys};
pub use user::{Profile, User, UserRef};
pub use wishlist::{RecentlyViewedItem, Wishlist, WishlistItem};

use serde::Serialize;

/// Pagination block returned with paged listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    /// Build the block for `total` rows, `pages = ceil(total / limit)`.
    #[must_use]
    pub const fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_rounds_pages_up() {
        assert_eq!(Pagination::new(1, 20, 0).pages, 0);
        assert_eq!(Pagination::new(1, 20, 20).pages, 1);
        assert_eq!(Pagination::new(2, 20, 21).pages, 2);
        assert_eq!(Pagination::new(1, 3, 10).pages, 4);
    }
}
