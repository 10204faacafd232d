//! Dashboard figures.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use tracing::instrument;

use fraz_modern_storefront::db::{ProductRepository, UserRepository};

use crate::db::AnalyticsRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::Analytics;
use crate::services::analytics::{
    TREND_MONTHS, sale_statuses, sales_and_orders, sales_trend, trend_months,
};
use crate::state::AppState;

/// Build the analytics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/analytics", get(show))
}

/// Sales, counts, best seller and the monthly trend.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Analytics>> {
    let today = Utc::now().date_naive();
    let since = trend_months(today, TREND_MONTHS)
        .first()
        .copied()
        .unwrap_or(today);
    let statuses = sale_statuses();

    let analytics = AnalyticsRepository::new(state.pool());
    let users = UserRepository::new(state.pool());
    let products = ProductRepository::new(state.pool());
    let (totals, monthly, best_seller, total_users, total_products) = tokio::try_join!(
        analytics.status_totals(),
        analytics.monthly_sales(since),
        analytics.best_seller(&statuses),
        users.count(),
        products.count(),
    )?;

    let (total_sales, total_orders) = sales_and_orders(&totals);
    Ok(Json(Analytics {
        total_sales,
        total_orders,
        total_users,
        total_products,
        best_seller,
        trend: sales_trend(today, &monthly),
    }))
}
