//! Account route handlers: registration, login, logout and profile.

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use fraz_modern_core::{Email, UserId};

use super::send_in_background;
use crate::db::RepositoryError;
use crate::db::users::{ProfileChanges, UserRepository};
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::extract::JsonBody;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{Profile, User, session_keys};
use crate::services::auth::{AuthError, AuthService, hash_password, validate_password};
use crate::services::uploads::ImageUpload;
use crate::state::AppState;

// =============================================================================
// Request and Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Fields accepted by a profile update, JSON or multipart.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: UserId,
    pub email: Email,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedInUser {
    pub id: UserId,
    pub email: Email,
    pub name: Option<String>,
    pub is_admin: bool,
}

impl From<User> for LoggedInUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_admin: user.is_admin,
        }
    }
}

async fn start_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(session, &user.to_current_user())
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an account and sign it in.
#[instrument(skip(state, session, body))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let (Some(email), Some(password)) = (body.email.as_deref(), body.password.as_deref()) else {
        return Err(AppError::BadRequest("Missing email or password".to_string()));
    };

    let user = AuthService::new(state.pool())
        .register(email, password, body.name.as_deref())
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    start_session(&session, &user).await?;

    if let Some(email_service) = state.email().cloned() {
        let to = user.email.to_string();
        let name = user.name.clone();
        send_in_background("welcome", async move {
            email_service.send_welcome_email(&to, name.as_deref()).await
        });
    }

    Ok((
        StatusCode::CREATED,
        Json(RegisteredUser {
            id: user.id,
            email: user.email,
            name: user.name,
        }),
    ))
}

/// Sign in with email and password.
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoggedInUser>> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    start_session(&session, &user).await?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(user.into()))
}

/// Sign out.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The signed-in user's profile.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Profile>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(user.into()))
}

/// Update name, email, password or avatar.
///
/// Accepts a JSON body or a multipart form with the same text fields plus an
/// `avatar` file.
#[instrument(skip(state, session, current, request), fields(user_id = %current.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    request: Request,
) -> Result<Json<Profile>> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let (fields, avatar) = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        read_profile_form(multipart).await?
    } else {
        let JsonBody(fields) = JsonBody::<ProfileUpdate>::from_request(request, &state).await?;
        (fields, None)
    };

    let name = fields.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let email = fields
        .email
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .map(Email::parse)
        .transpose()
        .map_err(AuthError::from)?;
    let password_hash = match fields.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => {
            validate_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };
    let avatar_url = match avatar {
        Some(upload) => Some(state.uploads().save_avatar(&upload).await?),
        None => None,
    };

    let changes = ProfileChanges {
        name,
        email: email.as_ref(),
        password_hash: password_hash.as_deref(),
        avatar: avatar_url.as_deref(),
    };
    if changes.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    let updated = UserRepository::new(state.pool())
        .update_profile(current.id, &changes)
        .await;
    let user = match updated {
        Ok(user) => user,
        Err(e) => {
            if let Some(url) = avatar_url.as_deref() {
                discard_avatar(&state, url).await;
            }
            return Err(match e {
                RepositoryError::Conflict(_) => {
                    AppError::BadRequest("Email already in use".to_string())
                }
                other => other.into(),
            });
        }
    };

    session
        .insert(session_keys::CURRENT_USER, user.to_current_user())
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    tracing::info!("Profile updated");
    Ok(Json(user.into()))
}

/// Delete an avatar written for an update that did not go through.
async fn discard_avatar(state: &AppState, url: &str) {
    if let Err(e) = state.uploads().remove(url).await {
        tracing::warn!(error = %e, file = %url, "Failed to remove unused avatar");
    }
}

async fn read_profile_form(
    mut multipart: Multipart,
) -> Result<(ProfileUpdate, Option<ImageUpload>)> {
    let mut fields = ProfileUpdate::default();
    let mut avatar = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "avatar" {
            let file_name = field.file_name().unwrap_or("avatar").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            if !bytes.is_empty() {
                avatar = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        match name.as_str() {
            "name" => fields.name = Some(value),
            "email" => fields.email = Some(value),
            "password" => fields.password = Some(value),
            _ => {}
        }
    }

    Ok((fields, avatar))
}
