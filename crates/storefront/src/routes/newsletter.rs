//! Newsletter subscription route handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use fraz_modern_core::Email;

use crate::db::newsletter::{NewsletterRepository, Subscription};
use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::models::Subscriber;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewsletterRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub message: &'static str,
    pub subscriber: Subscriber,
}

fn parse_email(email: Option<&str>) -> Result<Email> {
    let email = email.map(str::trim).unwrap_or_default();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }
    let invalid = || AppError::BadRequest("Invalid email format".to_string());
    if !Email::is_valid_format(email) {
        return Err(invalid());
    }
    Email::parse(email).map_err(|_| invalid())
}

/// Subscribe an address, reactivating a former subscriber.
#[instrument(skip(state, body))]
pub async fn subscribe(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewsletterRequest>,
) -> Result<impl IntoResponse> {
    let email = parse_email(body.email.as_deref())?;

    let (status, message, subscriber) = match NewsletterRepository::new(state.pool())
        .subscribe(&email)
        .await?
    {
        Subscription::Created(subscriber) => (
            StatusCode::CREATED,
            "Successfully subscribed to newsletter",
            subscriber,
        ),
        Subscription::Reactivated(subscriber) => {
            (StatusCode::OK, "Successfully resubscribed to newsletter", subscriber)
        }
        Subscription::AlreadyActive => {
            return Err(AppError::BadRequest("Email already subscribed".to_string()));
        }
    };

    tracing::info!(subscriber_id = %subscriber.id, "Newsletter subscription");
    Ok((status, Json(SubscriptionResponse { message, subscriber })))
}

/// Mark an address as unsubscribed.
#[instrument(skip(state, body))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewsletterRequest>,
) -> Result<Json<SubscriptionResponse>> {
    let email = parse_email(body.email.as_deref())?;

    let subscriber = NewsletterRepository::new(state.pool())
        .unsubscribe(&email)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Email not found".to_string()),
            other => other.into(),
        })?;

    Ok(Json(SubscriptionResponse {
        message: "Successfully unsubscribed from newsletter",
        subscriber,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_email_messages() {
        assert!(matches!(
            parse_email(None),
            Err(AppError::BadRequest(ref m)) if m == "Email is required"
        ));
        assert!(matches!(
            parse_email(Some("  ")),
            Err(AppError::BadRequest(ref m)) if m == "Email is required"
        ));
        assert!(matches!(
            parse_email(Some("not-an-email")),
            Err(AppError::BadRequest(ref m)) if m == "Invalid email format"
        ));
        for address in ["reader@localhost", "a@@b.com"] {
            assert!(matches!(
                parse_email(Some(address)),
                Err(AppError::BadRequest(ref m)) if m == "Invalid email format"
            ));
        }
        assert!(parse_email(Some(" Shopper@Example.com ")).is_ok());
    }
}
