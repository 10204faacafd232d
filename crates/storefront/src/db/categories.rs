//! Category repository.

use sqlx::PgPool;

use fraz_modern_core::CategoryId;

use super::{RepositoryError, conflict_on_unique};
use crate::models::{Category, CategoryFields, CategoryWithCount, Product};

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories by name, with their active product counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryWithCount>(
            r"
            SELECT c.id, c.name, c.slug, c.description, c.image_url, c.created_at, c.updated_at,
                   COUNT(p.id) FILTER (WHERE p.is_active) AS product_count
            FROM shop.category c
            LEFT JOIN shop.product p ON p.category_id = c.id
            GROUP BY c.id
            ORDER BY c.name
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name, slug, description, image_url, created_at, updated_at
            FROM shop.category WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(category)
    }

    /// Newest active products of a category and the category's active product count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_products(
        &self,
        id: CategoryId,
        limit: i64,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, price, image_url, sku, stock, category_id, tags,
                   is_active, views, created_at, updated_at
            FROM shop.product
            WHERE category_id = $1 AND is_active
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM shop.product WHERE category_id = $1 AND is_active",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok((products, count))
    }

    /// Categories whose name contains the pattern.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, pattern: &str, limit: i64) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name, slug, description, image_url, created_at, updated_at
            FROM shop.category
            WHERE name ILIKE $1
            ORDER BY name
            LIMIT $2
            ",
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(categories)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name or slug is taken.
    pub async fn create(&self, fields: &CategoryFields) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            INSERT INTO shop.category (name, slug, description, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, slug, description, image_url, created_at, updated_at
            ",
        )
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(&fields.description)
        .bind(&fields.image_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "category name or slug"))
    }

    /// Create a category or update the one with the same slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_by_slug(&self, fields: &CategoryFields) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r"
            INSERT INTO shop.category (name, slug, description, image_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO UPDATE
            SET name = EXCLUDED.name,
                description = EXCLUDED.description,
                image_url = EXCLUDED.image_url,
                updated_at = NOW()
            RETURNING id, name, slug, description, image_url, created_at, updated_at
            ",
        )
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(&fields.description)
        .bind(&fields.image_url)
        .fetch_one(self.pool)
        .await?;
        Ok(category)
    }

    /// Overwrite a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Conflict` if the name or slug is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        fields: &CategoryFields,
    ) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            UPDATE shop.category
            SET name = $2, slug = $3, description = $4, image_url = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, slug, description, image_url, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(&fields.description)
        .bind(&fields.image_url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "category name or slug"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category. Its products are kept without a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn delete(&self, id: CategoryId) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            DELETE FROM shop.category WHERE id = $1
            RETURNING id, name, slug, description, image_url, created_at, updated_at
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
