//! Administrator sign-in.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_sessions::Session;
use tracing::instrument;

use fraz_modern_storefront::db::UserRepository;
use fraz_modern_storefront::error::{clear_sentry_user, set_sentry_user};
use fraz_modern_storefront::routes::auth::{LoggedInUser, LoginRequest};
use fraz_modern_storefront::services::AuthService;

use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::middleware::{RequireAdmin, auth_rate_limiter, clear_current_admin, set_current_admin};
use crate::state::AppState;

/// Build the auth router. Login sits behind the strict limiter.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .layer(auth_rate_limiter())
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Sign in. Only administrators get a session.
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoggedInUser>> {
    let user = AuthService::new(state.pool())
        .login_admin(&body.email, &body.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "Admin login refused"))?;

    set_current_admin(&session, &user.to_current_user())
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "Admin logged in");

    Ok(Json(user.into()))
}

/// Sign out.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_admin(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The signed-in administrator, as currently stored.
///
/// An account deleted or demoted since login no longer passes.
#[instrument(skip(state, admin), fields(user_id = %admin.id))]
pub async fn me(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<LoggedInUser>> {
    UserRepository::new(state.pool())
        .get_by_id(admin.id)
        .await?
        .filter(|user| user.is_admin)
        .map(|user| Json(user.into()))
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}
