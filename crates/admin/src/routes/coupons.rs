//! Coupon management.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use tracing::instrument;

use fraz_modern_core::CouponId;
use fraz_modern_storefront::db::CouponRepository;
use fraz_modern_storefront::models::{Coupon, CouponInput, CouponPatch};

use super::{Success, record_activity};
use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParam};
use crate::middleware::RequireAdmin;
use crate::models::Activity;
use crate::state::AppState;

const COUPON_NOT_FOUND: &str = "Coupon not found";

/// Build the coupon router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/coupons", get(index).post(create))
        .route("/coupons/{id}", put(update).delete(destroy))
}

/// Every coupon, newest first.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Coupon>>> {
    Ok(Json(CouponRepository::new(state.pool()).list().await?))
}

/// Create a coupon. Codes are stored upper-case.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    JsonBody(body): JsonBody<CouponInput>,
) -> Result<impl IntoResponse> {
    let coupon = body.validate().map_err(AppError::BadRequest)?;
    let coupon = CouponRepository::new(state.pool()).create(&coupon).await?;

    tracing::info!(coupon_id = %coupon.id, code = %coupon.code, "Coupon created");
    record_activity(
        &state,
        &admin,
        Activity::new("coupon", "create")
            .entity(coupon.id.as_i32())
            .details(format!("Created coupon {}", coupon.code)),
    )
    .await;

    Ok((StatusCode::CREATED, Json(coupon)))
}

/// Change some fields of a coupon, e.g. `{"isActive": false}`.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(id): PathParam<CouponId>,
    JsonBody(body): JsonBody<CouponPatch>,
) -> Result<Json<Coupon>> {
    let coupons = CouponRepository::new(state.pool());
    let current = coupons
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(COUPON_NOT_FOUND.to_string()))?;
    let changes = body.apply(&current).map_err(AppError::BadRequest)?;
    let coupon = coupons
        .update(id, &changes)
        .await
        .map_err(AppError::missing(COUPON_NOT_FOUND))?;

    record_activity(
        &state,
        &admin,
        Activity::new("coupon", "update")
            .entity(id.as_i32())
            .details(format!("Updated coupon {}", coupon.code)),
    )
    .await;

    Ok(Json(coupon))
}

/// Delete a coupon.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(id): PathParam<CouponId>,
) -> Result<Json<Success>> {
    let coupon = CouponRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(AppError::missing(COUPON_NOT_FOUND))?;

    record_activity(
        &state,
        &admin,
        Activity::new("coupon", "delete")
            .entity(id.as_i32())
            .details(format!("Deleted coupon {}", coupon.code)),
    )
    .await;

    Ok(Json(Success::new()))
}
