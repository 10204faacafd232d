//! Account statistics and the account deletion cascade.

use sqlx::PgPool;

use fraz_modern_core::UserId;
use fraz_modern_storefront::db::RepositoryError;
use fraz_modern_storefront::models::User;

/// Rows owned by a user, deleted in this order before the user row.
const OWNED_ROWS: &[&str] = &[
    "DELETE FROM shop.review WHERE user_id = $1",
    "DELETE FROM shop.order WHERE user_id = $1",
    "DELETE FROM shop.cart_item WHERE cart_id IN (SELECT id FROM shop.cart WHERE user_id = $1)",
    "DELETE FROM shop.cart WHERE user_id = $1",
    "DELETE FROM shop.wishlist_item \
     WHERE wishlist_id IN (SELECT id FROM shop.wishlist WHERE user_id = $1)",
    "DELETE FROM shop.wishlist WHERE user_id = $1",
    "DELETE FROM shop.recently_viewed WHERE user_id = $1",
    "DELETE FROM shop.activity_log WHERE user_id = $1",
];

/// Repository for back-office account management.
pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Number of orders and reviews a user has.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn counts(&self, id: UserId) -> Result<(i64, i64), RepositoryError> {
        let counts: (i64, i64) = sqlx::query_as(
            r"
            SELECT (SELECT COUNT(*) FROM shop.order WHERE user_id = $1),
                   (SELECT COUNT(*) FROM shop.review WHERE user_id = $1)
            ",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;
        Ok(counts)
    }

    /// Delete a user and everything they own in one transaction.
    ///
    /// Order items go with their orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn delete_cascade(&self, id: UserId) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<UserId> =
            sqlx::query_scalar("SELECT id FROM shop.user WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(RepositoryError::NotFound);
        }

        for statement in OWNED_ROWS {
            sqlx::query(statement).bind(id).execute(&mut *tx).await?;
        }

        let user = sqlx::query_as::<_, User>(
            r"
            DELETE FROM shop.user WHERE id = $1
            RETURNING id, email, name, avatar, is_admin, created_at, updated_at
            ",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }
}
