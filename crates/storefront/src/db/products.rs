//! Product repository: listings, search, detail and back-office writes.

use rust_decimal::Decimal;
use sqlx::PgPool;

use fraz_modern_core::{CategoryId, ProductId, ProductImageId};

use super::{RepositoryError, conflict_on_unique, contains_pattern, page_offset};
use crate::models::{
    CategoryRef, Product, ProductDetail, ProductFields, ProductImage, ProductImageInput,
    ProductListQuery, ProductSort, ProductSummary, SortOrder,
};

const PRODUCT_COLUMNS: &str = "id, name, description, price, image_url, sku, stock, category_id, \
                               tags, is_active, views, created_at, updated_at";

/// Product columns plus category, rating aggregate and primary image.
const SUMMARY_SELECT: &str = r"
    SELECT p.id, p.name, p.description, p.price, p.image_url, p.sku, p.stock,
           p.category_id, p.tags, p.is_active, p.views, p.created_at, p.updated_at,
           c.name AS category_name, c.slug AS category_slug,
           rs.rating, rs.review_count,
           COALESCE(pi.url, p.image_url) AS primary_image
    FROM shop.product p
    LEFT JOIN shop.category c ON c.id = p.category_id
    LEFT JOIN LATERAL (
        SELECT ROUND(AVG(r.rating)::numeric, 1) AS rating, COUNT(*) AS review_count
        FROM shop.review r
        WHERE r.product_id = p.id
    ) rs ON TRUE
    LEFT JOIN LATERAL (
        SELECT i.url
        FROM shop.product_image i
        WHERE i.product_id = p.id AND i.is_primary
        ORDER BY i.sort_order, i.id
        LIMIT 1
    ) pi ON TRUE
";

/// Listing filter; `$1..$6` in this order.
const LIST_FILTER: &str = r"
    WHERE ($1 OR p.is_active)
      AND ($2::text IS NULL OR p.name ILIKE $2 OR p.description ILIKE $2 OR p.tags ILIKE $2)
      AND ($3::int IS NULL OR p.category_id = $3)
      AND ($4::numeric IS NULL OR p.price >= $4)
      AND ($5::numeric IS NULL OR p.price <= $5)
      AND (NOT $6 OR p.stock > 0)
";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    #[sqlx(flatten)]
    product: Product,
    category_name: Option<String>,
    category_slug: Option<String>,
    rating: Option<Decimal>,
    review_count: i64,
    primary_image: Option<String>,
}

impl From<SummaryRow> for ProductSummary {
    fn from(row: SummaryRow) -> Self {
        let category = match (row.product.category_id, row.category_name, row.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(CategoryRef { id, name, slug }),
            _ => None,
        };
        Self {
            product: row.product,
            category,
            rating: row.rating,
            review_count: row.review_count,
            primary_image: row.primary_image,
        }
    }
}

/// Parsed listing filter.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Include inactive products (back-office only).
    pub include_inactive: bool,
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: bool,
    pub sort: ProductSort,
    pub order: SortOrder,
    pub page: i64,
    pub limit: i64,
}

impl ProductFilter {
    /// Filter for the public listing.
    #[must_use]
    pub fn from_query(query: &ProductListQuery) -> Self {
        Self {
            include_inactive: false,
            search: query.search_term().map(ToString::to_string),
            category_id: query.category_id,
            min_price: query.min_price,
            max_price: query.max_price,
            in_stock: query.in_stock_only(),
            sort: query.sort(),
            order: query.order(),
            page: query.page(),
            limit: query.limit(),
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of product summaries and the total matching count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
    ) -> Result<(Vec<ProductSummary>, i64), RepositoryError> {
        let pattern = filter.search.as_deref().map(contains_pattern);
        let order = filter.order.sql();

        let rows = sqlx::query_as::<_, SummaryRow>(&format!(
            "{SUMMARY_SELECT} {LIST_FILTER} ORDER BY {sort} {order}, p.id {order} LIMIT $7 OFFSET $8",
            sort = filter.sort.sql(),
        ))
        .bind(filter.include_inactive)
        .bind(&pattern)
        .bind(filter.category_id)
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(filter.in_stock)
        .bind(filter.limit)
        .bind(page_offset(filter.page, filter.limit))
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM shop.product p {LIST_FILTER}"
        ))
        .bind(filter.include_inactive)
        .bind(&pattern)
        .bind(filter.category_id)
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(filter.in_stock)
        .fetch_one(self.pool)
        .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Get a product row by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Get an active product row by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.get(id).await?.filter(|p| p.is_active))
    }

    /// Get a product summary by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_summary(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductSummary>, RepositoryError> {
        let row = sqlx::query_as::<_, SummaryRow>(&format!("{SUMMARY_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Summaries for a set of products, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_summaries(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, SummaryRow>(&format!(
            "{SUMMARY_SELECT} WHERE p.id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Product page data: summary plus gallery.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail(&self, id: ProductId) -> Result<Option<ProductDetail>, RepositoryError> {
        let Some(summary) = self.get_summary(id).await? else {
            return Ok(None);
        };
        let images = self.images(id).await?;
        Ok(Some(ProductDetail { summary, images }))
    }

    /// Gallery images of a product, primary first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn images(&self, id: ProductId) -> Result<Vec<ProductImage>, RepositoryError> {
        let images = sqlx::query_as::<_, ProductImage>(
            r"
            SELECT id, product_id, url, alt_text, is_primary, sort_order, created_at
            FROM shop.product_image
            WHERE product_id = $1
            ORDER BY is_primary DESC, sort_order, id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(images)
    }

    /// Most viewed active products matching a search term (for suggestions).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn suggest(&self, term: &str, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM shop.product
            WHERE is_active
              AND (name ILIKE $1 OR description ILIKE $1 OR tags ILIKE $1)
            ORDER BY views DESC, id
            LIMIT $2
            "
        ))
        .bind(contains_pattern(term))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Active products matching a search term, most viewed then newest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        term: &str,
        limit: i64,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, SummaryRow>(&format!(
            r"
            {SUMMARY_SELECT}
            WHERE p.is_active
              AND (p.name ILIKE $1 OR p.description ILIKE $1 OR p.tags ILIKE $1)
            ORDER BY p.views DESC, p.created_at DESC
            LIMIT $2
            "
        ))
        .bind(contains_pattern(term))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Count all products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.product")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the SKU is taken.
    pub async fn create(&self, fields: &ProductFields) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            INSERT INTO shop.product
                (name, description, price, image_url, sku, stock, category_id, tags, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.price)
        .bind(&fields.image_url)
        .bind(&fields.sku)
        .bind(fields.stock)
        .bind(fields.category_id)
        .bind(&fields.tags)
        .bind(fields.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "SKU"))
    }

    /// Create a product or overwrite the one with the same SKU.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_sku(&self, fields: &ProductFields) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r"
            INSERT INTO shop.product
                (name, description, price, image_url, sku, stock, category_id, tags, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (sku) DO UPDATE
            SET name = EXCLUDED.name,
                description = EXCLUDED.description,
                price = EXCLUDED.price,
                image_url = EXCLUDED.image_url,
                stock = EXCLUDED.stock,
                category_id = EXCLUDED.category_id,
                tags = EXCLUDED.tags,
                is_active = EXCLUDED.is_active,
                updated_at = NOW()
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.price)
        .bind(&fields.image_url)
        .bind(&fields.sku)
        .bind(fields.stock)
        .bind(fields.category_id)
        .bind(&fields.tags)
        .bind(fields.is_active)
        .fetch_one(self.pool)
        .await?;
        Ok(product)
    }

    /// Overwrite a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if the SKU is taken.
    pub async fn update(
        &self,
        id: ProductId,
        fields: &ProductFields,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            UPDATE shop.product
            SET name = $2, description = $3, price = $4, image_url = $5, sku = $6,
                stock = $7, category_id = $8, tags = $9, is_active = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.price)
        .bind(&fields.image_url)
        .bind(&fields.sku)
        .bind(fields.stock)
        .bind(fields.category_id)
        .bind(&fields.tags)
        .bind(fields.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "SKU"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// Past order lines keep their snapshot and lose the product link.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            "DELETE FROM shop.product WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Add a gallery image. A primary image demotes the current one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn add_image(
        &self,
        id: ProductId,
        input: &ProductImageInput,
    ) -> Result<ProductImage, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM shop.product WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(RepositoryError::NotFound);
        }

        if input.is_primary {
            sqlx::query("UPDATE shop.product_image SET is_primary = FALSE WHERE product_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        let image = sqlx::query_as::<_, ProductImage>(
            r"
            INSERT INTO shop.product_image (product_id, url, alt_text, is_primary, sort_order)
            VALUES ($1, $2, $3, $4,
                    (SELECT COALESCE(MAX(sort_order) + 1, 0)
                     FROM shop.product_image WHERE product_id = $1))
            RETURNING id, product_id, url, alt_text, is_primary, sort_order, created_at
            ",
        )
        .bind(id)
        .bind(&input.url)
        .bind(&input.alt_text)
        .bind(input.is_primary)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(image)
    }

    /// Remove a gallery image of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the image doesn't belong to the product.
    pub async fn delete_image(
        &self,
        id: ProductId,
        image_id: ProductImageId,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM shop.product_image WHERE id = $1 AND product_id = $2")
                .bind(image_id)
                .bind(id)
                .execute(self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
