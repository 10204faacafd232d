//! Cart repository.
//!
//! Every user has at most one cart; it is created on first use.

use sqlx::PgPool;

use fraz_modern_core::{CartId, CartItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Cart, CartLine, Product};

const LINE_SELECT: &str = r"
    SELECT ci.id AS line_id, ci.quantity,
           p.id, p.name, p.description, p.price, p.image_url, p.sku, p.stock,
           p.category_id, p.tags, p.is_active, p.views, p.created_at, p.updated_at
    FROM shop.cart_item ci
    JOIN shop.product p ON p.id = ci.product_id
";

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    line_id: CartItemId,
    quantity: i32,
    #[sqlx(flatten)]
    product: Product,
}

impl From<LineRow> for CartLine {
    fn from(row: LineRow) -> Self {
        Self {
            id: row.line_id,
            quantity: row.quantity,
            product: row.product,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's cart ID, creating the cart if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<CartId, RepositoryError> {
        let id: CartId = sqlx::query_scalar(
            r"
            INSERT INTO shop.cart AS c (user_id) VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = c.updated_at
            RETURNING id
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// The user's cart with every line, created if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_cart(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let id = self.get_or_create(user_id).await?;
        let rows = sqlx::query_as::<_, LineRow>(&format!(
            "{LINE_SELECT} WHERE ci.cart_id = $1 ORDER BY ci.created_at, ci.id"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(Cart::new(id, rows.into_iter().map(Into::into).collect()))
    }

    /// A line of the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_line(
        &self,
        user_id: UserId,
        item_id: CartItemId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, LineRow>(&format!(
            r"{LINE_SELECT}
            JOIN shop.cart c ON c.id = ci.cart_id
            WHERE ci.id = $1 AND c.user_id = $2"
        ))
        .bind(item_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Add a product to the user's cart, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartLine, RepositoryError> {
        let cart_id = self.get_or_create(user_id).await?;

        let item_id: CartItemId = sqlx::query_scalar(
            r"
            INSERT INTO shop.cart_item AS ci (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = ci.quantity + EXCLUDED.quantity
            RETURNING id
            ",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        self.get_line(user_id, item_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Set the quantity of a line of the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in the user's cart.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<CartLine, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.cart_item ci SET quantity = $3
            FROM shop.cart c
            WHERE ci.cart_id = c.id AND ci.id = $1 AND c.user_id = $2
            ",
        )
        .bind(item_id)
        .bind(user_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_line(user_id, item_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Remove a line from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in the user's cart.
    pub async fn remove(&self, user_id: UserId, item_id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM shop.cart_item ci
            USING shop.cart c
            WHERE ci.cart_id = c.id AND ci.id = $1 AND c.user_id = $2
            ",
        )
        .bind(item_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
