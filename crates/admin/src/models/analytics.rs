//! Dashboard analytics.

use rust_decimal::Decimal;
use serde::Serialize;

/// Store-wide numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    /// Sum of the totals of every order that was not cancelled.
    pub total_sales: Decimal,
    pub total_orders: i64,
    pub total_users: i64,
    pub total_products: i64,
    pub best_seller: Option<BestSeller>,
    pub trend: SalesTrend,
}

/// The product with the most units sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BestSeller {
    pub name: String,
    pub sold: i64,
}

/// Monthly sales, oldest month first. `labels[i]` names `sales[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SalesTrend {
    pub labels: Vec<String>,
    pub sales: Vec<Decimal>,
}
