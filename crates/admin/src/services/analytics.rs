//! Dashboard figures.
//!
//! Cancelled orders never count towards sales. Months are calendar months in
//! UTC.

use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

use fraz_modern_core::OrderStatus;

use crate::db::analytics::{MonthlySales, StatusTotals};
use crate::models::SalesTrend;

/// Months shown in the sales trend, the current one included.
pub const TREND_MONTHS: u32 = 6;

/// Statuses whose orders count as sales.
#[must_use]
pub fn sale_statuses() -> Vec<OrderStatus> {
    OrderStatus::ALL
        .into_iter()
        .filter(OrderStatus::counts_as_sale)
        .collect()
}

/// Total sales and total order count from per-status totals.
#[must_use]
pub fn sales_and_orders(totals: &[StatusTotals]) -> (Decimal, i64) {
    let sales = totals
        .iter()
        .filter(|t| t.status.counts_as_sale())
        .map(|t| t.sales)
        .sum();
    let orders = totals.iter().map(|t| t.orders).sum();
    (sales, orders)
}

/// First day of each of the `count` months ending with `today`'s, oldest first.
#[must_use]
pub fn trend_months(today: NaiveDate, count: u32) -> Vec<NaiveDate> {
    let Some(current) = today.with_day(1) else {
        return Vec::new();
    };
    (0..count)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .collect()
}

/// Monthly sales for the trend window ending with `today`'s month.
///
/// Months without sales show zero; rows outside the window are ignored.
#[must_use]
pub fn sales_trend(today: NaiveDate, monthly: &[MonthlySales]) -> SalesTrend {
    let mut by_month: HashMap<NaiveDate, Decimal> = HashMap::new();
    for row in monthly.iter().filter(|row| row.status.counts_as_sale()) {
        *by_month.entry(row.month).or_default() += row.sales;
    }

    let months = trend_months(today, TREND_MONTHS);
    SalesTrend {
        labels: months.iter().map(|m| m.format("%b %y").to_string()).collect(),
        sales: months
            .iter()
            .map(|m| by_month.get(m).copied().unwrap_or_default())
            .collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_trend_months_cross_year_boundary() {
        let months = trend_months(date(2025, 2, 17), 6);
        assert_eq!(
            months,
            vec![
                date(2024, 9, 1),
                date(2024, 10, 1),
                date(2024, 11, 1),
                date(2024, 12, 1),
                date(2025, 1, 1),
                date(2025, 2, 1),
            ]
        );
    }

    #[test]
    fn test_trend_months_from_month_end() {
        let months = trend_months(date(2025, 3, 31), 2);
        assert_eq!(months, vec![date(2025, 2, 1), date(2025, 3, 1)]);
    }

    #[test]
    fn test_sales_trend_buckets_and_labels() {
        let monthly = vec![
            MonthlySales {
                month: date(2025, 1, 1),
                status: OrderStatus::Delivered,
                sales: dec("100.50"),
            },
            MonthlySales {
                month: date(2025, 1, 1),
                status: OrderStatus::Pending,
                sales: dec("20.00"),
            },
            MonthlySales {
                month: date(2025, 1, 1),
                status: OrderStatus::Cancelled,
                sales: dec("999.00"),
            },
            MonthlySales {
                month: date(2024, 11, 1),
                status: OrderStatus::Shipped,
                sales: dec("15.25"),
            },
            // Outside the window.
            MonthlySales {
                month: date(2024, 6, 1),
                status: OrderStatus::Delivered,
                sales: dec("1.00"),
            },
        ];

        let trend = sales_trend(date(2025, 1, 9), &monthly);
        assert_eq!(
            trend.labels,
            vec!["Aug 24", "Sep 24", "Oct 24", "Nov 24", "Dec 24", "Jan 25"]
        );
        assert_eq!(
            trend.sales,
            vec![
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::ZERO,
                dec("15.25"),
                Decimal::ZERO,
                dec("120.50"),
            ]
        );
    }

    #[test]
    fn test_sales_and_orders_skip_cancelled_sales() {
        let totals = vec![
            StatusTotals {
                status: OrderStatus::Pending,
                orders: 2,
                sales: dec("40.00"),
            },
            StatusTotals {
                status: OrderStatus::Cancelled,
                orders: 1,
                sales: dec("500.00"),
            },
            StatusTotals {
                status: OrderStatus::Delivered,
                orders: 3,
                sales: dec("60.10"),
            },
        ];
        assert_eq!(sales_and_orders(&totals), (dec("100.10"), 6));
        assert_eq!(sales_and_orders(&[]), (Decimal::ZERO, 0));
    }

    #[test]
    fn test_sale_statuses_exclude_cancelled() {
        let statuses = sale_statuses();
        assert_eq!(statuses.len(), 4);
        assert!(!statuses.contains(&OrderStatus::Cancelled));
    }
}
