//! Aggregates behind the dashboard.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use fraz_modern_core::OrderStatus;
use fraz_modern_storefront::db::RepositoryError;

use crate::models::BestSeller;

/// Order count and sales of one status.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StatusTotals {
    pub status: OrderStatus,
    pub orders: i64,
    pub sales: Decimal,
}

/// Sales of one status in one calendar month (UTC).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MonthlySales {
    /// First day of the month.
    pub month: NaiveDate,
    pub status: OrderStatus,
    pub sales: Decimal,
}

/// Repository for dashboard aggregates.
pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsRepository<'a> {
    /// Create a new analytics repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Order count and summed totals per status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn status_totals(&self) -> Result<Vec<StatusTotals>, RepositoryError> {
        let rows = sqlx::query_as::<_, StatusTotals>(
            r"
            SELECT status, COUNT(*) AS orders, COALESCE(SUM(total), 0) AS sales
            FROM shop.order
            GROUP BY status
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Summed totals per month and status for orders placed on or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn monthly_sales(&self, since: NaiveDate) -> Result<Vec<MonthlySales>, RepositoryError> {
        let rows = sqlx::query_as::<_, MonthlySales>(
            r"
            SELECT date_trunc('month', created_at AT TIME ZONE 'UTC')::date AS month,
                   status,
                   COALESCE(SUM(total), 0) AS sales
            FROM shop.order
            WHERE created_at >= ($1::date)::timestamp AT TIME ZONE 'UTC'
            GROUP BY 1, 2
            ORDER BY 1
            ",
        )
        .bind(since)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// The product with the most units sold across orders in `statuses`.
    ///
    /// Order lines whose product was deleted are not counted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn best_seller(
        &self,
        statuses: &[OrderStatus],
    ) -> Result<Option<BestSeller>, RepositoryError> {
        let statuses: Vec<&str> = statuses.iter().map(OrderStatus::as_str).collect();
        let row: Option<(String, i64)> = sqlx::query_as(
            r"
            SELECT COALESCE(p.name, MAX(oi.product_name)) AS name,
                   SUM(oi.quantity)::bigint AS sold
            FROM shop.order_item oi
            JOIN shop.order o ON o.id = oi.order_id
            LEFT JOIN shop.product p ON p.id = oi.product_id
            WHERE oi.product_id IS NOT NULL AND o.status::text = ANY($1)
            GROUP BY oi.product_id, p.name
            ORDER BY sold DESC, oi.product_id
            LIMIT 1
            ",
        )
        .bind(&statuses)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(|(name, sold)| BestSeller { name, sold }))
    }
}
