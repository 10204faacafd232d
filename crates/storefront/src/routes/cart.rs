//! Cart route handlers.
//!
//! The cart lives in the database, one per user, and is created on first
//! access. Lines are priced at the current product price.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tracing::instrument;

use fraz_modern_core::{CartItemId, ProductId};

use super::Success;
use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::middleware::RequireAuth;
use crate::models::{Cart, CartLine};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartLine {
    pub cart_item_id: CartItemId,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveCartLine {
    pub cart_item_id: CartItemId,
}

fn line_not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("Cart item not found".to_string()),
        other => other.into(),
    }
}

/// The user's cart, created if needed.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Cart>> {
    let cart = CartRepository::new(state.pool()).get_cart(user.id).await?;
    Ok(Json(cart))
}

/// Add a product, merging with an existing line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(body): JsonBody<AddToCart>,
) -> Result<impl IntoResponse> {
    if body.quantity < 1 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    if ProductRepository::new(state.pool())
        .get_active(body.product_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let line = CartRepository::new(state.pool())
        .add(user.id, body.product_id, body.quantity)
        .await?;

    tracing::debug!(line_id = %line.id, quantity = line.quantity, "Cart line saved");
    Ok((StatusCode::CREATED, Json(line)))
}

/// Set a line's quantity. Zero removes the line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(body): JsonBody<UpdateCartLine>,
) -> Result<Json<Option<CartLine>>> {
    if body.quantity < 0 {
        return Err(AppError::BadRequest(
            "Quantity cannot be negative".to_string(),
        ));
    }

    let repo = CartRepository::new(state.pool());
    if body.quantity == 0 {
        repo.remove(user.id, body.cart_item_id)
            .await
            .map_err(line_not_found)?;
        return Ok(Json(None));
    }

    let line = repo
        .set_quantity(user.id, body.cart_item_id, body.quantity)
        .await
        .map_err(line_not_found)?;
    Ok(Json(Some(line)))
}

/// Remove a line from the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(body): JsonBody<RemoveCartLine>,
) -> Result<Json<Success>> {
    CartRepository::new(state.pool())
        .remove(user.id, body.cart_item_id)
        .await
        .map_err(line_not_found)?;
    Ok(Json(Success::new()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_defaults_quantity_to_one() {
        let body: AddToCart = serde_json::from_str(r#"{"productId": 7}"#).unwrap();
        assert_eq!(body.product_id, ProductId::new(7));
        assert_eq!(body.quantity, 1);
    }

    #[test]
    fn test_missing_line_maps_to_not_found() {
        let err = line_not_found(RepositoryError::NotFound);
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Cart item not found"));
    }
}
