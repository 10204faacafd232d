//! Catalog domain models: categories, products, images and reviews.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fraz_modern_core::{CategoryId, ProductId, ProductImageId, ReviewId, UserId};

/// Default page size for product listings.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A product category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category with the number of active products in it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub category: Category,
    pub product_count: i64,
}

/// A category with its newest active products.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
    pub product_count: i64,
}

/// Category reference nested in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// A product row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub sku: String,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    /// Comma separated.
    pub tags: Option<String>,
    pub is_active: bool,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product enriched with category, rating and primary image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<CategoryRef>,
    /// Average review rating, one decimal place.
    pub rating: Option<Decimal>,
    pub review_count: i64,
    /// Primary gallery image, falling back to `imageUrl`.
    pub primary_image: Option<String>,
}

/// Everything the product page shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub summary: ProductSummary,
    pub images: Vec<ProductImage>,
}

/// A gallery image of a product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    pub url: String,
    pub alt_text: Option<String>,
    pub is_primary: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// A product review.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub user: ReviewAuthor,
}

/// The public face of a reviewer.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewAuthor {
    pub id: UserId,
    pub name: Option<String>,
}

/// Column a product listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    Price,
    #[default]
    CreatedAt,
    Views,
    Name,
    /// Number of reviews.
    Rating,
}

impl ProductSort {
    /// Parse the `sortBy` parameter. Unknown values sort by creation time.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("price") => Self::Price,
            Some("views") => Self::Views,
            Some("name") => Self::Name,
            Some("rating") => Self::Rating,
            _ => Self::CreatedAt,
        }
    }

    /// SQL expression to order by.
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Price => "p.price",
            Self::CreatedAt => "p.created_at",
            Self::Views => "p.views",
            Self::Name => "p.name",
            Self::Rating => "review_count",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse the `sortOrder` parameter. Anything but `asc` is descending.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    /// SQL keyword.
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Query parameters of the product listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub in_stock: Option<String>,
}

impl ProductListQuery {
    /// Requested page, at least 1.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Requested page size, clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Trimmed search term, if any.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Whether only products with stock should be listed.
    #[must_use]
    pub fn in_stock_only(&self) -> bool {
        self.in_stock
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    #[must_use]
    pub fn sort(&self) -> ProductSort {
        ProductSort::from_param(self.sort_by.as_deref())
    }

    #[must_use]
    pub fn order(&self) -> SortOrder {
        SortOrder::from_param(self.sort_order.as_deref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_from_param() {
        assert_eq!(ProductSort::from_param(Some("price")), ProductSort::Price);
        assert_eq!(ProductSort::from_param(Some("rating")), ProductSort::Rating);
        assert_eq!(
            ProductSort::from_param(Some("price; DROP TABLE")),
            ProductSort::CreatedAt
        );
        assert_eq!(ProductSort::from_param(None), ProductSort::CreatedAt);
    }

    #[test]
    fn test_sort_order_defaults_to_desc() {
        assert_eq!(SortOrder::from_param(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::from_param(Some("up")), SortOrder::Desc);
        assert_eq!(SortOrder::from_param(None).sql(), "DESC");
    }

    #[test]
    fn test_list_query_limits() {
        let query = ProductListQuery {
            page: Some(0),
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), MAX_PAGE_SIZE);
        assert_eq!(ProductListQuery::default().limit(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_list_query_deserializes_camel_case() {
        let query: ProductListQuery = serde_json::from_value(serde_json::json!({
            "categoryId": 3,
            "minPrice": "10.50",
            "inStock": "true",
            "search": "  lamp "
        }))
        .unwrap();
        assert_eq!(query.category_id, Some(CategoryId::new(3)));
        assert_eq!(query.min_price, Some("10.50".parse().unwrap()));
        assert!(query.in_stock_only());
        assert_eq!(query.search_term(), Some("lamp"));
    }
}
