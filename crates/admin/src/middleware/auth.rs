//! Authentication extractors for the back office.
//!
//! The signed-in administrator lives in the admin session under
//! [`session_keys::CURRENT_ADMIN`]. It is only ever written after a login
//! that checked the admin flag.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use tower_sessions::Session;

use fraz_modern_storefront::db::UserRepository;
use fraz_modern_storefront::models::{CurrentUser, User, session_keys};

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires a signed-in administrator.
///
/// The account is re-read on every request. Deleted accounts get a 401 and
/// revoked administrators a 403; either way the session is flushed.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(unauthenticated)?;
        let remembered = session
            .get::<CurrentUser>(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or_else(unauthenticated)?;

        let state = AppState::from_ref(state);
        let account = UserRepository::new(state.pool())
            .get_by_id(remembered.id)
            .await?;

        match admin_identity(account) {
            Ok(admin) => Ok(Self(admin)),
            Err(e) => {
                tracing::warn!(user_id = %remembered.id, "Admin session no longer valid");
                if let Err(flush) = session.flush().await {
                    tracing::warn!(error = %flush, "Failed to flush stale admin session");
                }
                Err(e)
            }
        }
    }
}

fn unauthenticated() -> AppError {
    AppError::Unauthorized("Authentication required".to_string())
}

/// The administrator to hand to handlers, checked against the account row.
fn admin_identity(account: Option<User>) -> Result<CurrentUser, AppError> {
    match account {
        None => Err(unauthenticated()),
        Some(user) if !user.is_admin => {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
        Some(user) => Ok(user.to_current_user()),
    }
}

/// Store the signed-in administrator, rotating the session ID first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Forget the signed-in administrator (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use chrono::Utc;

    fn account(is_admin: bool) -> User {
        User {
            id: 1.into(),
            email: fraz_modern_core::Email::parse("admin@example.com").unwrap(),
            name: Some("Admin".to_string()),
            avatar: None,
            is_admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_missing_session_is_unauthorized_json() {
        let response = unauthenticated().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Authentication required");
    }

    #[test]
    fn test_deleted_admin_is_unauthorized() {
        let err = admin_identity(None).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_revoked_admin_is_forbidden() {
        let err = admin_identity(Some(account(false))).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.public_message(), "Admin access required");
    }

    #[test]
    fn test_current_admin_passes() {
        let admin = admin_identity(Some(account(true))).unwrap();
        assert!(admin.is_admin);
        assert_eq!(admin.id, 1.into());
    }
}
