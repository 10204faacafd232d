//! Category route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use fraz_modern_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::{AppError, Result};
use crate::extract::PathParam;
use crate::models::{CategoryDetail, CategoryWithCount};
use crate::state::AppState;

/// Products shown on a category page.
const CATEGORY_PAGE_PRODUCTS: i64 = 20;

/// All categories ordered by name, with active product counts.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<CategoryWithCount>>> {
    let categories = CategoryRepository::new(state.pool())
        .list_with_counts()
        .await?;
    Ok(Json(categories))
}

/// A category with its newest active products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<CategoryId>,
) -> Result<Json<CategoryDetail>> {
    let repo = CategoryRepository::new(state.pool());
    let category = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
    let (products, product_count) = repo.active_products(id, CATEGORY_PAGE_PRODUCTS).await?;

    Ok(Json(CategoryDetail {
        category,
        products,
        product_count,
    }))
}
