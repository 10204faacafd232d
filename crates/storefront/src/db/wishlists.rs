//! Wishlist repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use fraz_modern_core::{ProductId, UserId, WishlistId, WishlistItemId};

use super::{ProductRepository, RepositoryError, conflict_on_unique};
use crate::models::{Wishlist, WishlistItem};

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: WishlistItemId,
    product_id: ProductId,
    created_at: DateTime<Utc>,
}

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's wishlist ID, if they have one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(&self, user_id: UserId) -> Result<Option<WishlistId>, RepositoryError> {
        let id = sqlx::query_scalar("SELECT id FROM shop.wishlist WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(id)
    }

    /// The user's wishlist ID, creating the wishlist if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<WishlistId, RepositoryError> {
        let id = sqlx::query_scalar(
            r"
            INSERT INTO shop.wishlist (user_id) VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// The user's wishlist with product summaries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_wishlist(&self, user_id: UserId) -> Result<Wishlist, RepositoryError> {
        let id = self.get_or_create(user_id).await?;
        let rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT id, product_id, created_at
            FROM shop.wishlist_item
            WHERE wishlist_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<ProductId> = rows.iter().map(|r| r.product_id).collect();
        let mut summaries: HashMap<ProductId, _> = ProductRepository::new(self.pool)
            .get_summaries(&ids)
            .await?
            .into_iter()
            .map(|s| (s.product.id, s))
            .collect();

        let items = rows
            .into_iter()
            .filter_map(|row| {
                summaries.remove(&row.product_id).map(|product| WishlistItem {
                    id: row.id,
                    product_id: row.product_id,
                    created_at: row.created_at,
                    product,
                })
            })
            .collect();

        Ok(Wishlist { id, items })
    }

    /// Save a product to the user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is already saved.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistItemId, RepositoryError> {
        let wishlist_id = self.get_or_create(user_id).await?;
        sqlx::query_scalar(
            r"
            INSERT INTO shop.wishlist_item (wishlist_id, product_id)
            VALUES ($1, $2)
            RETURNING id
            ",
        )
        .bind(wishlist_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "wishlist item"))
    }

    /// Remove a product from a wishlist. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        wishlist_id: WishlistId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM shop.wishlist_item WHERE wishlist_id = $1 AND product_id = $2")
                .bind(wishlist_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
