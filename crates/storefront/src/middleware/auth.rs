//! Authentication extractors.
//!
//! The signed-in shopper lives in the session under
//! [`session_keys::CURRENT_USER`]; handlers never trust a user ID sent by the
//! client.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{CurrentUser, User, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in shopper.
///
/// The session only remembers who signed in. Every request re-reads the
/// account, so a deleted account loses access at once and its session is
/// flushed.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
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
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(unauthenticated)?;

        let state = AppState::from_ref(state);
        let account = UserRepository::new(state.pool())
            .get_by_id(remembered.id)
            .await?;

        match refreshed(account) {
            Some(user) => Ok(Self(user)),
            None => {
                tracing::info!(user_id = %remembered.id, "Session user no longer exists");
                if let Err(e) = session.flush().await {
                    tracing::warn!(error = %e, "Failed to flush stale session");
                }
                Err(unauthenticated())
            }
        }
    }
}

fn unauthenticated() -> AppError {
    AppError::Unauthorized("Authentication required".to_string())
}

/// The identity to hand to handlers, taken from the current account row.
fn refreshed(account: Option<User>) -> Option<CurrentUser> {
    account.as_ref().map(User::to_current_user)
}

/// Store the signed-in shopper, rotating the session ID first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Forget the signed-in shopper (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use chrono::Utc;

    fn account(name: &str) -> User {
        User {
            id: 7.into(),
            email: fraz_modern_core::Email::parse("shopper@example.com").unwrap(),
            name: Some(name.to_string()),
            avatar: None,
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_unauthenticated_is_json_401() {
        let response = unauthenticated().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Authentication required");
    }

    #[test]
    fn test_deleted_account_is_signed_out() {
        assert!(refreshed(None).is_none());
    }

    #[test]
    fn test_identity_follows_account_row() {
        let user = refreshed(Some(account("Renamed Shopper"))).unwrap();
        assert_eq!(user.id, 7.into());
        assert_eq!(user.name.as_deref(), Some("Renamed Shopper"));
        assert!(!user.is_admin);
    }
}
