//! Rows for the CSV exports.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use fraz_modern_core::ProductId;
use fraz_modern_storefront::db::RepositoryError;

/// Product columns of the product export.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductExportRow {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

/// Repository for export queries not covered by the shared repositories.
pub struct ExportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ExportRepository<'a> {
    /// Create a new export repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every product, active or not, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn products(&self) -> Result<Vec<ProductExportRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductExportRow>(
            r"
            SELECT id, name, sku, description, price, stock, created_at
            FROM shop.product
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
