//! Recently viewed products repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use fraz_modern_core::{ProductId, UserId};

use super::{ProductRepository, RepositoryError};
use crate::models::RecentlyViewedItem;

/// How many entries the storefront shows.
pub const RECENTLY_VIEWED_SHOWN: i64 = 10;

/// How many entries are kept per user.
pub const RECENTLY_VIEWED_KEPT: i64 = 50;

#[derive(Debug, sqlx::FromRow)]
struct ViewRow {
    product_id: ProductId,
    viewed_at: DateTime<Utc>,
}

/// Repository for the per-user view history.
pub struct RecentlyViewedRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RecentlyViewedRepository<'a> {
    /// Create a new recently viewed repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's most recent views with product summaries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<RecentlyViewedItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, ViewRow>(
            r"
            SELECT product_id, viewed_at
            FROM shop.recently_viewed
            WHERE user_id = $1
            ORDER BY viewed_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(user_id)
        .bind(RECENTLY_VIEWED_SHOWN)
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<ProductId> = rows.iter().map(|r| r.product_id).collect();
        let mut summaries: HashMap<ProductId, _> = ProductRepository::new(self.pool)
            .get_summaries(&ids)
            .await?
            .into_iter()
            .map(|s| (s.product.id, s))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                summaries
                    .remove(&row.product_id)
                    .map(|product| RecentlyViewedItem {
                        viewed_at: row.viewed_at,
                        product,
                    })
            })
            .collect())
    }

    /// Record a view: bump the history entry, count the product view and
    /// drop entries beyond the kept window.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn record(&self, user_id: UserId, product_id: ProductId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO shop.recently_viewed (user_id, product_id, viewed_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, product_id) DO UPDATE SET viewed_at = EXCLUDED.viewed_at
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE shop.product SET views = views + 1 WHERE id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r"
            DELETE FROM shop.recently_viewed
            WHERE user_id = $1
              AND id NOT IN (
                  SELECT id FROM shop.recently_viewed
                  WHERE user_id = $1
                  ORDER BY viewed_at DESC, id DESC
                  LIMIT $2
              )
            ",
        )
        .bind(user_id)
        .bind(RECENTLY_VIEWED_KEPT)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
