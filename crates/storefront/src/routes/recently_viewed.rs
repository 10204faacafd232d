//! Recently viewed products.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use fraz_modern_core::ProductId;

use super::Success;
use crate::db::{ProductRepository, RecentlyViewedRepository};
use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::middleware::RequireAuth;
use crate::models::RecentlyViewedItem;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewedProduct {
    pub product_id: ProductId,
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<RecentlyViewedItem>>> {
    let items = RecentlyViewedRepository::new(state.pool())
        .list(user.id)
        .await?;
    Ok(Json(items))
}

/// Record a product view and bump its view counter.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn record(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(body): JsonBody<ViewedProduct>,
) -> Result<Json<Success>> {
    if ProductRepository::new(state.pool())
        .get(body.product_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    RecentlyViewedRepository::new(state.pool())
        .record(user.id, body.product_id)
        .await?;
    Ok(Json(Success::new()))
}
