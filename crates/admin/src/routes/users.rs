//! Customer and administrator accounts.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde::Serialize;
use tracing::instrument;

use fraz_modern_core::UserId;
use fraz_modern_storefront::db::{OrderRepository, UserRepository};
use fraz_modern_storefront::models::User;

use super::record_activity;
use crate::db::AccountRepository;
use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParam};
use crate::middleware::RequireAdmin;
use crate::models::{Activity, AdminFlagUpdate, UserDetail, UserListItem};
use crate::state::AppState;

const USER_NOT_FOUND: &str = "User not found";

/// Orders shown on the user detail page.
const RECENT_ORDERS: i64 = 5;

/// Build the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(index))
        .route("/users/{id}", get(show).put(update).delete(destroy))
}

#[derive(Debug, Serialize)]
pub struct UserDeleted {
    pub message: &'static str,
    pub user: User,
}

/// Every account, newest first.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<UserListItem>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// An account with its order and review counts and latest orders.
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    PathParam(id): PathParam<UserId>,
) -> Result<Json<UserDetail>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))?;

    let (order_count, review_count) = AccountRepository::new(state.pool()).counts(id).await?;
    let recent_orders = OrderRepository::new(state.pool())
        .recent_for_user(id, RECENT_ORDERS)
        .await?;

    Ok(Json(UserDetail {
        user,
        order_count,
        review_count,
        recent_orders,
    }))
}

/// Grant or revoke back-office access.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(id): PathParam<UserId>,
    JsonBody(body): JsonBody<AdminFlagUpdate>,
) -> Result<Json<User>> {
    let Some(is_admin) = body.is_admin else {
        return Err(AppError::BadRequest("isAdmin is required".to_string()));
    };
    if id == admin.id && !is_admin {
        return Err(AppError::BadRequest(
            "You cannot remove your own admin access".to_string(),
        ));
    }

    let user = UserRepository::new(state.pool())
        .set_admin(id, is_admin)
        .await
        .map_err(AppError::missing(USER_NOT_FOUND))?;

    tracing::info!(user_id = %id, is_admin, "Admin flag changed");
    let verb = if is_admin { "grant_admin" } else { "revoke_admin" };
    record_activity(
        &state,
        &admin,
        Activity::new("user", verb)
            .entity(id.as_i32())
            .details(user.email.to_string()),
    )
    .await;

    Ok(Json(user))
}

/// Delete an account and everything it owns.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(id): PathParam<UserId>,
) -> Result<Json<UserDeleted>> {
    if id == admin.id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    let user = AccountRepository::new(state.pool())
        .delete_cascade(id)
        .await
        .map_err(AppError::missing(USER_NOT_FOUND))?;

    tracing::info!(user_id = %id, "User deleted");
    record_activity(
        &state,
        &admin,
        Activity::new("user", "delete")
            .entity(id.as_i32())
            .details(format!("Deleted user {}", user.email)),
    )
    .await;

    Ok(Json(UserDeleted {
        message: "User deleted successfully",
        user,
    }))
}
