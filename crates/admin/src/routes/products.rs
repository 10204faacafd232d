//! Product management, inactive products included.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use tracing::instrument;

use fraz_modern_core::{ProductId, ProductImageId};
use fraz_modern_storefront::db::ProductRepository;
use fraz_modern_storefront::db::products::ProductFilter;
use fraz_modern_storefront::models::{
    Pagination, Product, ProductDetail, ProductImage, ProductImageInput, ProductInput,
    ProductListQuery,
};
use fraz_modern_storefront::routes::products::ProductPage;

use super::{Success, record_activity};
use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParam, QueryParams};
use crate::middleware::RequireAdmin;
use crate::models::Activity;
use crate::state::AppState;

/// Build the product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/{id}", get(show).put(update).delete(destroy))
        .route("/products/{id}/images", post(add_image))
        .route("/products/{id}/images/{image_id}", delete(remove_image))
}

const PRODUCT_NOT_FOUND: &str = "Product not found";

fn not_found() -> AppError {
    AppError::NotFound(PRODUCT_NOT_FOUND.to_string())
}

/// Paged listing of every product.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    QueryParams(query): QueryParams<ProductListQuery>,
) -> Result<Json<ProductPage>> {
    let filter = ProductFilter {
        include_inactive: true,
        ..ProductFilter::from_query(&query)
    };
    let (products, total) = ProductRepository::new(state.pool()).list(&filter).await?;

    Ok(Json(ProductPage {
        products,
        pagination: Pagination::new(filter.page, filter.limit, total),
    }))
}

/// Product detail with gallery.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    PathParam(id): PathParam<ProductId>,
) -> Result<Json<ProductDetail>> {
    ProductRepository::new(state.pool())
        .get_detail(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Create a product.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    JsonBody(body): JsonBody<ProductInput>,
) -> Result<impl IntoResponse> {
    let fields = body.validate().map_err(AppError::BadRequest)?;
    let product = ProductRepository::new(state.pool()).create(&fields).await?;

    tracing::info!(product_id = %product.id, sku = %product.sku, "Product created");
    record_activity(
        &state,
        &admin,
        Activity::new("product", "create")
            .entity(product.id.as_i32())
            .details(format!("Created product {}", product.name)),
    )
    .await;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Change some fields of a product.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(id): PathParam<ProductId>,
    JsonBody(body): JsonBody<ProductInput>,
) -> Result<Json<Product>> {
    let products = ProductRepository::new(state.pool());
    let current = products.get(id).await?.ok_or_else(not_found)?;
    let fields = body.apply(&current).map_err(AppError::BadRequest)?;
    let product = products.update(id, &fields).await?;

    record_activity(
        &state,
        &admin,
        Activity::new("product", "update")
            .entity(id.as_i32())
            .details(format!("Updated product {}", product.name)),
    )
    .await;

    Ok(Json(product))
}

/// Delete a product. Order history keeps its snapshot.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(id): PathParam<ProductId>,
) -> Result<Json<Success>> {
    let product = ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(AppError::missing(PRODUCT_NOT_FOUND))?;

    tracing::info!(product_id = %id, "Product deleted");
    record_activity(
        &state,
        &admin,
        Activity::new("product", "delete")
            .entity(id.as_i32())
            .details(format!("Deleted product {}", product.name)),
    )
    .await;

    Ok(Json(Success::new()))
}

/// Add a gallery image.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn add_image(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(id): PathParam<ProductId>,
    JsonBody(body): JsonBody<ProductImageInput>,
) -> Result<impl IntoResponse> {
    if body.url.trim().is_empty() {
        return Err(AppError::BadRequest("Image URL is required".to_string()));
    }
    let image: ProductImage = ProductRepository::new(state.pool())
        .add_image(id, &body)
        .await
        .map_err(AppError::missing(PRODUCT_NOT_FOUND))?;

    record_activity(
        &state,
        &admin,
        Activity::new("product", "add_image")
            .entity(id.as_i32())
            .details(format!("Added image {}", image.url)),
    )
    .await;

    Ok((StatusCode::CREATED, Json(image)))
}

/// Remove a gallery image.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn remove_image(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam((id, image_id)): PathParam<(ProductId, ProductImageId)>,
) -> Result<Json<Success>> {
    ProductRepository::new(state.pool())
        .delete_image(id, image_id)
        .await
        .map_err(AppError::missing("Image not found"))?;

    record_activity(
        &state,
        &admin,
        Activity::new("product", "remove_image").entity(id.as_i32()),
    )
    .await;

    Ok(Json(Success::new()))
}
