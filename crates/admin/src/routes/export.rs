//! CSV downloads.

use axum::{
    Router,
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::instrument;

use fraz_modern_storefront::db::{OrderRepository, UserRepository};
use fraz_modern_storefront::models::OrderWithUser;

use crate::db::ExportRepository;
use crate::db::exports::ProductExportRow;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::services::CsvWriter;
use crate::state::AppState;

/// Build the export router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/export/orders", get(orders))
        .route("/export/products", get(products))
        .route("/export/users", get(users))
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

fn download(file_name: &str, body: String) -> Response {
    (
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// Orders as CSV. `items` holds the lines as a JSON array.
#[must_use]
pub fn orders_csv(orders: &[OrderWithUser]) -> String {
    let mut csv = CsvWriter::with_header(&["id", "user", "total", "status", "createdAt", "items"]);
    for OrderWithUser { order, user } in orders {
        let items = order
            .items
            .iter()
            .map(|item| {
                json!({
                    "name": item.product_name,
                    "quantity": item.quantity,
                    "price": item.price,
                })
            })
            .collect::<Vec<_>>();
        csv.record(&[
            order.id.to_string(),
            user.email.to_string(),
            order.total.to_string(),
            order.status.to_string(),
            timestamp(order.created_at),
            serde_json::Value::Array(items).to_string(),
        ]);
    }
    csv.finish()
}

/// Products as CSV.
#[must_use]
pub fn products_csv(products: &[ProductExportRow]) -> String {
    let mut csv = CsvWriter::with_header(&[
        "id",
        "name",
        "sku",
        "description",
        "price",
        "stock",
        "createdAt",
    ]);
    for product in products {
        csv.record(&[
            product.id.to_string(),
            product.name.clone(),
            product.sku.clone(),
            product.description.clone().unwrap_or_default(),
            product.price.to_string(),
            product.stock.to_string(),
            timestamp(product.created_at),
        ]);
    }
    csv.finish()
}

/// Every order.
#[instrument(skip(state, _admin))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Response> {
    let orders = OrderRepository::new(state.pool())
        .list_with_users(None)
        .await?;
    Ok(download("orders.csv", orders_csv(&orders)))
}

/// Every product, inactive ones included.
#[instrument(skip(state, _admin))]
pub async fn products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Response> {
    let products = ExportRepository::new(state.pool()).products().await?;
    Ok(download("products.csv", products_csv(&products)))
}

/// Every account.
#[instrument(skip(state, _admin))]
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Response> {
    let users = UserRepository::new(state.pool()).list().await?;

    let mut csv = CsvWriter::with_header(&["id", "email", "name", "isAdmin", "createdAt"]);
    for user in &users {
        csv.record(&[
            user.id.to_string(),
            user.email.to_string(),
            user.name.clone().unwrap_or_default(),
            user.is_admin.to_string(),
            timestamp(user.created_at),
        ]);
    }
    Ok(download("users.csv", csv.finish()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use fraz_modern_core::{Email, OrderId, OrderItemId, OrderStatus, ProductId, UserId};
    use fraz_modern_storefront::models::{Order, OrderItem, UserRef};

    use super::*;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_orders_csv_embeds_items_as_json() {
        let order = Order {
            id: OrderId::new(12),
            user_id: UserId::new(3),
            status: OrderStatus::Shipped,
            subtotal: "59.80".parse().unwrap(),
            discount: "0".parse().unwrap(),
            total: "59.80".parse().unwrap(),
            coupon_id: None,
            shipping_address: None,
            tracking_number: None,
            tracking_status: None,
            created_at: created(),
            updated_at: created(),
            items: vec![OrderItem {
                id: OrderItemId::new(1),
                order_id: OrderId::new(12),
                product_id: Some(ProductId::new(5)),
                product_name: "Desk Lamp".to_string(),
                quantity: 2,
                price: "29.90".parse().unwrap(),
            }],
        };
        let user = UserRef {
            id: UserId::new(3),
            email: Email::parse("jane@example.com").unwrap(),
            name: None,
        };

        let csv = orders_csv(&[OrderWithUser { order, user }]);
        let mut lines = csv.split("\r\n");
        assert_eq!(lines.next(), Some("id,user,total,status,createdAt,items"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("12,jane@example.com,59.80,shipped,2025-03-04T10:30:00+00:00,\"["));
        assert!(row.contains("\"\"name\"\":\"\"Desk Lamp\"\""));
        assert!(row.contains("\"\"quantity\"\":2"));
    }

    #[test]
    fn test_products_csv_quotes_descriptions() {
        let rows = vec![ProductExportRow {
            id: ProductId::new(1),
            name: "Oak Chair".to_string(),
            sku: "CHAIR001".to_string(),
            description: Some("Solid oak, \"mid-century\" style".to_string()),
            price: "149.00".parse().unwrap(),
            stock: 7,
            created_at: created(),
        }];

        let csv = products_csv(&rows);
        assert_eq!(
            csv,
            "id,name,sku,description,price,stock,createdAt\r\n\
             1,Oak Chair,CHAIR001,\"Solid oak, \"\"mid-century\"\" style\",149.00,7,\
             2025-03-04T10:30:00+00:00\r\n"
        );
    }
}
