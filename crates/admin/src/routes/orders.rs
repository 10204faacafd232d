//! Order fulfilment.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use fraz_modern_core::{OrderId, OrderStatus, UserId};
use fraz_modern_storefront::db::OrderRepository;
use fraz_modern_storefront::models::{OrderUpdate, OrderWithUser};

use super::{record_activity, send_in_background};
use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::middleware::RequireAdmin;
use crate::models::Activity;
use crate::state::AppState;

const ORDER_NOT_FOUND: &str = "Order not found";

/// Build the order router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index))
        .route("/orders/{id}", get(show).put(update))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub user_id: Option<UserId>,
}

/// Request body for an order update. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderChanges {
    pub status: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_status: Option<String>,
}

impl OrderChanges {
    /// Parse into a repository update.
    ///
    /// # Errors
    ///
    /// Returns the message to show the admin.
    pub fn parse(self) -> std::result::Result<OrderUpdate, String> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<OrderStatus>)
            .transpose()
            .map_err(|_| {
                let allowed = OrderStatus::ALL
                    .iter()
                    .map(OrderStatus::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Invalid status. Must be one of: {allowed}")
            })?;
        let update = OrderUpdate {
            status,
            tracking_number: self.tracking_number,
            tracking_status: self.tracking_status,
        };
        if update.is_empty() {
            return Err("Missing status".to_string());
        }
        Ok(update)
    }
}

/// All orders newest first, optionally one customer's.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    QueryParams(query): QueryParams<OrderListQuery>,
) -> Result<Json<Vec<OrderWithUser>>> {
    let orders = OrderRepository::new(state.pool())
        .list_with_users(query.user_id)
        .await?;
    Ok(Json(orders))
}

/// One order with items and customer.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    PathParam(id): PathParam<OrderId>,
) -> Result<Json<OrderWithUser>> {
    OrderRepository::new(state.pool())
        .get_with_user(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(ORDER_NOT_FOUND.to_string()))
}

/// Set the status or tracking details.
///
/// Any status may follow any other. The customer is emailed when the status
/// changes.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(id): PathParam<OrderId>,
    JsonBody(body): JsonBody<OrderChanges>,
) -> Result<Json<OrderWithUser>> {
    let changes = body.parse().map_err(AppError::BadRequest)?;

    let updated = OrderRepository::new(state.pool())
        .update(id, &changes)
        .await
        .map_err(AppError::missing(ORDER_NOT_FOUND))?;

    if let Some(status) = updated.status_change() {
        tracing::info!(
            order_id = %id,
            from = %updated.previous_status,
            to = %status,
            "Order status changed"
        );
        if let Some(email_service) = state.email().cloned() {
            let to = updated.order.user.email.to_string();
            let name = updated.order.user.name.clone();
            let order = updated.order.order.clone();
            send_in_background("order status", async move {
                email_service
                    .send_order_status(&to, name.as_deref(), &order, status)
                    .await
            });
        }
    }

    let updated = updated.order;
    let status = updated.order.status;
    record_activity(
        &state,
        &admin,
        Activity::new("order", "update")
            .entity(id.as_i32())
            .details(format!("Order #{id} is {status}")),
    )
    .await;

    Ok(Json(updated))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_changes_are_rejected() {
        assert_eq!(OrderChanges::default().parse().unwrap_err(), "Missing status");
    }

    #[test]
    fn test_status_is_parsed() {
        let update = OrderChanges {
            status: Some("shipped".to_string()),
            ..Default::default()
        }
        .parse()
        .unwrap();
        assert_eq!(update.status, Some(OrderStatus::Shipped));
    }

    #[test]
    fn test_tracking_without_status() {
        let update = OrderChanges {
            tracking_number: Some("1Z999".to_string()),
            ..Default::default()
        }
        .parse()
        .unwrap();
        assert!(update.status.is_none());
        assert_eq!(update.tracking_number.as_deref(), Some("1Z999"));
    }

    #[test]
    fn test_unknown_status() {
        let err = OrderChanges {
            status: Some("lost".to_string()),
            ..Default::default()
        }
        .parse()
        .unwrap_err();
        assert!(err.starts_with("Invalid status"));
        assert!(err.contains("delivered"));
    }
}
