//! Wishlist route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use fraz_modern_core::{ProductId, WishlistItemId};

use super::Success;
use crate::db::{ProductRepository, RepositoryError, WishlistRepository};
use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::middleware::RequireAuth;
use crate::models::Wishlist;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistProduct {
    pub product_id: ProductId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedToWishlist {
    pub id: WishlistItemId,
    pub product_id: ProductId,
}

/// The user's wishlist, created if needed.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Wishlist>> {
    let wishlist = WishlistRepository::new(state.pool())
        .get_wishlist(user.id)
        .await?;
    Ok(Json(wishlist))
}

/// Save a product to the wishlist.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(body): JsonBody<WishlistProduct>,
) -> Result<impl IntoResponse> {
    if ProductRepository::new(state.pool())
        .get(body.product_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let id = WishlistRepository::new(state.pool())
        .add(user.id, body.product_id)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::BadRequest("Product already in wishlist".to_string())
            }
            other => other.into(),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(AddedToWishlist {
            id,
            product_id: body.product_id,
        }),
    ))
}

/// Remove a product from the wishlist.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(body): JsonBody<WishlistProduct>,
) -> Result<Json<Success>> {
    let repo = WishlistRepository::new(state.pool());
    let wishlist_id = repo
        .find(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Wishlist not found".to_string()))?;

    if !repo.remove(wishlist_id, body.product_id).await? {
        return Err(AppError::NotFound("Product not in wishlist".to_string()));
    }
    Ok(Json(Success::new()))
}
