//! Order route handlers for shoppers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::instrument;

use fraz_modern_core::OrderId;

use super::send_in_background;
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParam};
use crate::middleware::RequireAuth;
use crate::models::{NewOrder, Order};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OrderPlaced {
    pub success: bool,
    pub order: Order,
    pub message: &'static str,
}

/// The user's orders, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(orders))
}

/// One of the user's orders.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathParam(id): PathParam<OrderId>,
) -> Result<Json<Order>> {
    OrderRepository::new(state.pool())
        .get_for_user(user.id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

/// Place an order from the cart.
///
/// The confirmation email goes out after the transaction commits; a failed
/// send does not fail the order.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(mut body): JsonBody<NewOrder>,
) -> Result<impl IntoResponse> {
    body.shipping_address = body
        .shipping_address
        .as_ref()
        .and_then(|address| address.normalized());

    let order = OrderRepository::new(state.pool())
        .place(user.id, &body)
        .await?;

    tracing::info!(
        order_id = %order.id,
        total = %order.total,
        items = order.items.len(),
        "Order placed"
    );

    if let Some(email_service) = state.email().cloned() {
        let to = user.email.to_string();
        let name = user.name.clone();
        let placed = order.clone();
        send_in_background("order confirmation", async move {
            email_service
                .send_order_confirmation(&to, name.as_deref(), &placed)
                .await
        });
    }

    Ok((
        StatusCode::CREATED,
        Json(OrderPlaced {
            success: true,
            order,
            message: "Order created successfully",
        }),
    ))
}
