//! Payment intent creation for the checkout page.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::middleware::RequireAuth;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    pub amount: Option<Decimal>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "usd".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// Create a payment intent and hand its client secret to the browser.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(body): JsonBody<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>> {
    let Some(amount) = body.amount.filter(|a| *a > Decimal::ZERO) else {
        return Err(AppError::BadRequest("Missing amount".to_string()));
    };
    let payments = state.payments().ok_or_else(|| {
        AppError::ServiceUnavailable("Payments are not configured".to_string())
    })?;

    let client_secret = payments
        .create_payment_intent(amount, &body.currency)
        .await?;

    tracing::info!(%amount, currency = %body.currency, "Payment intent created");
    Ok(Json(PaymentIntentResponse { client_secret }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_defaults_to_usd() {
        let body: PaymentIntentRequest = serde_json::from_str(r#"{"amount": 12.5}"#).unwrap();
        assert_eq!(body.currency, "usd");
        assert_eq!(body.amount, Some("12.5".parse().unwrap()));
    }
}
