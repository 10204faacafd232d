//! Newsletter subscribers and campaigns.

use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use fraz_modern_core::SubscriberId;
use fraz_modern_storefront::db::NewsletterRepository;
use fraz_modern_storefront::models::Subscriber;
use fraz_modern_storefront::services::EmailService;

use super::{Success, record_activity};
use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParam};
use crate::middleware::RequireAdmin;
use crate::models::Activity;
use crate::services::{CampaignReport, send_campaign};
use crate::state::AppState;

/// Build the newsletter router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/newsletter", get(index))
        .route("/newsletter/{id}", delete(destroy))
        .route("/newsletter/send", post(send))
}

#[derive(Debug, Default, Deserialize)]
pub struct CampaignRequest {
    pub subject: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CampaignSent {
    pub message: String,
    #[serde(flatten)]
    pub report: CampaignReport,
}

impl From<CampaignReport> for CampaignSent {
    fn from(report: CampaignReport) -> Self {
        Self {
            message: format!("Campaign sent successfully to {} subscribers", report.sent),
            report,
        }
    }
}

/// Active subscribers, newest first.
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Subscriber>>> {
    Ok(Json(NewsletterRepository::new(state.pool()).list_active().await?))
}

/// Remove a subscriber for good.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    PathParam(id): PathParam<SubscriberId>,
) -> Result<Json<Success>> {
    let subscriber = NewsletterRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(AppError::missing("Subscriber not found"))?;

    record_activity(
        &state,
        &admin,
        Activity::new("newsletter", "delete")
            .entity(id.as_i32())
            .details(format!("Removed subscriber {}", subscriber.email)),
    )
    .await;

    Ok(Json(Success::new()))
}

/// Email a campaign to every active subscriber.
///
/// Individual delivery failures are counted in the response.
#[instrument(skip(state, admin, body), fields(admin_id = %admin.id))]
pub async fn send(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    JsonBody(body): JsonBody<CampaignRequest>,
) -> Result<Json<CampaignSent>> {
    let (Some(subject), Some(content)) = (
        body.subject.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        body.content.as_deref().filter(|c| !c.trim().is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "Subject and content are required".to_string(),
        ));
    };

    let recipients: Vec<String> = NewsletterRepository::new(state.pool())
        .list_active()
        .await?
        .into_iter()
        .map(|s| s.email.to_string())
        .collect();
    if recipients.is_empty() {
        return Err(AppError::BadRequest("No subscribers found".to_string()));
    }

    let email = state
        .email()
        .ok_or_else(|| AppError::ServiceUnavailable("Email is not configured".to_string()))?;
    let campaign = EmailService::render_campaign(subject, content)?;

    let total = recipients.len();
    let report = send_campaign(email, &campaign, recipients).await;
    tracing::info!(
        subject,
        total,
        sent = report.sent,
        failed = report.failed,
        "Campaign sent"
    );

    record_activity(
        &state,
        &admin,
        Activity::new("newsletter", "send").details(format!(
            "Sent \"{subject}\" to {} of {total} subscribers",
            report.sent
        )),
    )
    .await;

    Ok(Json(report.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_campaign_sent_body() {
        let body = CampaignSent::from(CampaignReport { sent: 3, failed: 1 });
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({
                "message": "Campaign sent successfully to 3 subscribers",
                "sent": 3,
                "failed": 1,
            })
        );
    }
}
