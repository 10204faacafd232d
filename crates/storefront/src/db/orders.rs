//! Order repository, including the checkout transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use thiserror::Error;

use fraz_modern_core::{
    CartItemId, CouponId, CouponRejection, Email, LineItem, OrderId, OrderStatus, ProductId,
    UserId, round_money, subtotal,
};

use super::{RepositoryError, coupons};
use crate::models::{
    NewOrder, Order, OrderItem, OrderUpdate, OrderWithUser, ShippingAddress, UserRef,
    normalize_code,
};

const ORDER_COLUMNS: &str = "o.id, o.user_id, o.status, o.subtotal, o.discount, o.total, \
                             o.coupon_id, o.shipping_address, o.tracking_number, \
                             o.tracking_status, o.created_at, o.updated_at";

/// An order after a back-office update.
#[derive(Debug, Clone)]
pub struct UpdatedOrder {
    /// Status the update replaced.
    pub previous_status: OrderStatus,
    pub order: OrderWithUser,
}

impl UpdatedOrder {
    /// The new status, if this update changed it.
    #[must_use]
    pub fn status_change(&self) -> Option<OrderStatus> {
        let current = self.order.order.status;
        (current != self.previous_status).then_some(current)
    }
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    status: OrderStatus,
    subtotal: Decimal,
    discount: Decimal,
    total: Decimal,
    coupon_id: Option<CouponId>,
    shipping_address: Option<Json<ShippingAddress>>,
    tracking_number: Option<String>,
    tracking_status: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            status: self.status,
            subtotal: self.subtotal,
            discount: self.discount,
            total: self.total,
            coupon_id: self.coupon_id,
            shipping_address: self.shipping_address.map(|Json(address)| address),
            tracking_number: self.tracking_number,
            tracking_status: self.tracking_status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderUserRow {
    #[sqlx(flatten)]
    order: OrderRow,
    user_email: Email,
    user_name: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: CartItemId,
    product_id: ProductId,
    quantity: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct LockedProduct {
    id: ProductId,
    name: String,
    price: Decimal,
}

/// Why an order could not be placed.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("No items selected")]
    NoItemsSelected,

    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    #[error("Invalid coupon code")]
    UnknownCoupon,

    #[error("{0}")]
    Coupon(#[from] CouponRejection),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for PlaceOrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Turn cart lines into an order.
    ///
    /// Runs in one transaction: the selected products and the coupon are
    /// locked, names and prices are captured on the order items, the coupon's
    /// use is counted and the ordered lines leave the cart.
    ///
    /// # Errors
    ///
    /// Returns a `PlaceOrderError` naming the first check that failed.
    pub async fn place(&self, user_id: UserId, request: &NewOrder) -> Result<Order, PlaceOrderError> {
        let mut tx = self.pool.begin().await?;

        let cart_lines = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT ci.id, ci.product_id, ci.quantity
            FROM shop.cart_item ci
            JOIN shop.cart c ON c.id = ci.cart_id
            WHERE c.user_id = $1
            ORDER BY ci.id
            ",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        if cart_lines.is_empty() {
            return Err(PlaceOrderError::EmptyCart);
        }

        let selected: Vec<CartLineRow> = match request.cart_item_ids.as_deref() {
            Some(ids) if !ids.is_empty() => cart_lines
                .into_iter()
                .filter(|line| ids.contains(&line.id))
                .collect(),
            _ => cart_lines,
        };
        if selected.is_empty() {
            return Err(PlaceOrderError::NoItemsSelected);
        }

        let product_ids: Vec<ProductId> = selected.iter().map(|l| l.product_id).collect();
        let products: HashMap<ProductId, LockedProduct> = sqlx::query_as::<_, LockedProduct>(
            "SELECT id, name, price FROM shop.product WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&product_ids)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

        let mut snapshots = Vec::with_capacity(selected.len());
        for line in &selected {
            let product = products
                .get(&line.product_id)
                .ok_or(PlaceOrderError::ProductNotFound(line.product_id))?;
            snapshots.push((product, line.quantity));
        }

        let lines: Vec<LineItem> = snapshots
            .iter()
            .map(|(product, quantity)| LineItem {
                unit_price: product.price,
                quantity: *quantity,
            })
            .collect();
        let order_subtotal = subtotal(&lines);

        let (coupon_id, discount) = match request
            .coupon_code
            .as_deref()
            .map(normalize_code)
            .filter(|c| !c.is_empty())
        {
            Some(code) => {
                let coupon = coupons::lock_by_code(&mut tx, &code)
                    .await?
                    .ok_or(PlaceOrderError::UnknownCoupon)?;
                let discount = coupon.terms().check_order(Utc::now(), order_subtotal)?;
                coupons::record_use(&mut tx, coupon.id).await?;
                (Some(coupon.id), discount)
            }
            None => (None, Decimal::ZERO),
        };
        let total = round_money(order_subtotal - discount);

        let order = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO shop.order AS o
                (user_id, status, subtotal, discount, total, coupon_id, shipping_address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(OrderStatus::Pending)
        .bind(order_subtotal)
        .bind(discount)
        .bind(total)
        .bind(coupon_id)
        .bind(request.shipping_address.clone().map(Json))
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(snapshots.len());
        for (product, quantity) in snapshots {
            let item = sqlx::query_as::<_, OrderItem>(
                r"
                INSERT INTO shop.order_item (order_id, product_id, product_name, quantity, price)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, order_id, product_id, product_name, quantity, price
                ",
            )
            .bind(order.id)
            .bind(product.id)
            .bind(&product.name)
            .bind(quantity)
            .bind(product.price)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        let consumed: Vec<CartItemId> = selected.iter().map(|l| l.id).collect();
        sqlx::query("DELETE FROM shop.cart_item WHERE id = ANY($1)")
            .bind(&consumed)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(order.into_order(items))
    }

    /// A user's orders with items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM shop.order o
            WHERE o.user_id = $1
            ORDER BY o.created_at DESC, o.id DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        self.attach_items(rows).await
    }

    /// One of a user's orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order o WHERE o.id = $1 AND o.user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(self.attach_items(row.into_iter().collect()).await?.pop())
    }

    /// All orders (or one customer's), newest first, with items and customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_with_users(
        &self,
        user_id: Option<UserId>,
    ) -> Result<Vec<OrderWithUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderUserRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}, u.email AS user_email, u.name AS user_name
            FROM shop.order o
            JOIN shop.user u ON u.id = o.user_id
            WHERE ($1::int IS NULL OR o.user_id = $1)
            ORDER BY o.created_at DESC, o.id DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        self.attach_items_with_users(rows).await
    }

    /// Recent orders of a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn recent_for_user(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM shop.order o
            WHERE o.user_id = $1
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $2
            "
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        self.attach_items(rows).await
    }

    /// An order with items and customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_with_user(&self, id: OrderId) -> Result<Option<OrderWithUser>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderUserRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}, u.email AS user_email, u.name AS user_name
            FROM shop.order o
            JOIN shop.user u ON u.id = o.user_id
            WHERE o.id = $1
            "
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(self
            .attach_items_with_users(row.into_iter().collect())
            .await?
            .pop())
    }

    /// Apply back-office changes. Any status may replace any other.
    ///
    /// The row is locked while it is read and written, so the returned
    /// previous status is the one this update actually replaced.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update(
        &self,
        id: OrderId,
        update: &OrderUpdate,
    ) -> Result<UpdatedOrder, RepositoryError> {
        let previous_status = sqlx::query_scalar::<_, OrderStatus>(
            r"
            WITH previous AS (
                SELECT id, status FROM shop.order WHERE id = $1 FOR UPDATE
            )
            UPDATE shop.order o
            SET status = COALESCE($2, o.status),
                tracking_number = COALESCE($3, o.tracking_number),
                tracking_status = COALESCE($4, o.tracking_status),
                updated_at = NOW()
            FROM previous
            WHERE o.id = previous.id
            RETURNING previous.status
            ",
        )
        .bind(id)
        .bind(update.status)
        .bind(&update.tracking_number)
        .bind(&update.tracking_status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let order = self.get_with_user(id).await?.ok_or(RepositoryError::NotFound)?;
        Ok(UpdatedOrder {
            previous_status,
            order,
        })
    }

    async fn items_for(&self, ids: &[OrderId]) -> Result<HashMap<OrderId, Vec<OrderItem>>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, product_name, quantity, price
            FROM shop.order_item
            WHERE order_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in items {
            grouped.entry(item.order_id).or_default().push(item);
        }
        Ok(grouped)
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<OrderId> = rows.iter().map(|r| r.id).collect();
        let mut items = self.items_for(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_order(order_items)
            })
            .collect())
    }

    async fn attach_items_with_users(
        &self,
        rows: Vec<OrderUserRow>,
    ) -> Result<Vec<OrderWithUser>, RepositoryError> {
        let ids: Vec<OrderId> = rows.iter().map(|r| r.order.id).collect();
        let mut items = self.items_for(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let user = UserRef {
                    id: row.order.user_id,
                    email: row.user_email,
                    name: row.user_name,
                };
                let order_items = items.remove(&row.order.id).unwrap_or_default();
                OrderWithUser {
                    order: row.order.into_order(order_items),
                    user,
                }
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_place_order_error_messages() {
        assert_eq!(PlaceOrderError::EmptyCart.to_string(), "Cart is empty");
        assert_eq!(
            PlaceOrderError::ProductNotFound(ProductId::new(42)).to_string(),
            "Product 42 not found"
        );
        assert_eq!(
            PlaceOrderError::from(CouponRejection::UsageLimitReached).to_string(),
            "Coupon usage limit reached"
        );
    }

    fn updated(previous_status: OrderStatus, current: OrderStatus) -> UpdatedOrder {
        let now = Utc::now();
        UpdatedOrder {
            previous_status,
            order: OrderWithUser {
                order: Order {
                    id: OrderId::new(9),
                    user_id: UserId::new(3),
                    status: current,
                    subtotal: Decimal::ONE_HUNDRED,
                    discount: Decimal::ZERO,
                    total: Decimal::ONE_HUNDRED,
                    coupon_id: None,
                    shipping_address: None,
                    tracking_number: None,
                    tracking_status: None,
                    created_at: now,
                    updated_at: now,
                    items: Vec::new(),
                },
                user: UserRef {
                    id: UserId::new(3),
                    email: Email::parse("shopper@example.com").unwrap(),
                    name: None,
                },
            },
        }
    }

    #[test]
    fn test_status_change_against_replaced_status() {
        assert_eq!(
            updated(OrderStatus::Processing, OrderStatus::Shipped).status_change(),
            Some(OrderStatus::Shipped)
        );
        // A concurrent update already moved the order on; nothing to announce.
        assert_eq!(
            updated(OrderStatus::Shipped, OrderStatus::Shipped).status_change(),
            None
        );
    }
}
