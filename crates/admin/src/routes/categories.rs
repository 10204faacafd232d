//! Category management. Listing is the storefront's.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{post, put},
};
use tracing::instrument;

use fraz_modern_core::CategoryId;
use fraz_modern_storefront::db::CategoryRepository;
use fraz_modern_storefront::models::{Category, CategoryInput};

use super::{Success, record_activity};
use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParam};
use crate::middleware::RequireAdmin;
use crate::models::Activity;
use crate::state::AppState;

const CATEGORY_NOT_FOUND: &str = "Category not found";

/// Build the category router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", post(create))
        .route("/categories/{id}", put(update).delete(destroy))
}

/// Create a category. The slug comes from the name.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    JsonBody(body): JsonBody<CategoryInput>,
) -> Result<impl IntoResponse> {
    let fields = body.validate().map_err(AppError::BadRequest)?;
    let category = CategoryRepository::new(state.pool()).create(&fields).await?;

    record_activity(
        &state,
        &admin,
        Activity::new("category", "create")
            .entity(category.id.as_i32())
            .details(format!("Created category {}", category.name)),
    )
    .await;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Change some fields of a category.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(id): PathParam<CategoryId>,
    JsonBody(body): JsonBody<CategoryInput>,
) -> Result<Json<Category>> {
    let categories = CategoryRepository::new(state.pool());
    let current = categories
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(CATEGORY_NOT_FOUND.to_string()))?;
    let fields = body.apply(&current).map_err(AppError::BadRequest)?;
    let category = categories
        .update(id, &fields)
        .await
        .map_err(AppError::missing(CATEGORY_NOT_FOUND))?;

    record_activity(
        &state,
        &admin,
        Activity::new("category", "update")
            .entity(id.as_i32())
            .details(format!("Updated category {}", category.name)),
    )
    .await;

    Ok(Json(category))
}

/// Delete a category. Its products stay, uncategorised.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(id): PathParam<CategoryId>,
) -> Result<Json<Success>> {
    let category = CategoryRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(AppError::missing(CATEGORY_NOT_FOUND))?;

    record_activity(
        &state,
        &admin,
        Activity::new("category", "delete")
            .entity(id.as_i32())
            .details(format!("Deleted category {}", category.name)),
    )
    .await;

    Ok(Json(Success::new()))
}
