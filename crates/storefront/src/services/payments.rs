//! Payment processor client.
//!
//! Creates payment intents through the processor's REST API so the browser
//! can confirm the payment with the returned client secret.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::PaymentsConfig;

/// Errors that can occur when talking to the payment processor.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Amount is missing, zero, negative or too large.
    #[error("Missing amount")]
    InvalidAmount,

    /// Currency is not a three letter code.
    #[error("Invalid currency")]
    InvalidCurrency,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build the client or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct PaymentIntent {
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Payment processor API client.
#[derive(Clone)]
pub struct PaymentClient {
    client: reqwest::Client,
    api_base: Url,
}

impl PaymentClient {
    /// Create a new client with the secret key as bearer token.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &PaymentsConfig) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();
        let mut auth_value =
            HeaderValue::from_str(&format!("Bearer {}", config.secret_key.expose_secret()))
                .map_err(|e| PaymentError::Parse(format!("Invalid secret key format: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
        })
    }

    /// Create a payment intent for `amount` in major units and return its
    /// client secret.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidAmount` or `InvalidCurrency` for bad
    /// input, `Api` when the processor refuses the request.
    pub async fn create_payment_intent(
        &self,
        amount: Decimal,
        currency: &str,
    ) -> Result<String, PaymentError> {
        let minor = to_minor_units(amount)?;
        let currency = normalize_currency(currency)?;

        let url = self
            .api_base
            .join("/v1/payment_intents")
            .map_err(|e| PaymentError::Parse(e.to_string()))?;

        let form = [
            ("amount", minor.to_string()),
            ("currency", currency),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];

        let response = self.client.post(url).form(&form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or(body);
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let intent: PaymentIntent = response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))?;

        intent
            .client_secret
            .ok_or_else(|| PaymentError::Parse("payment intent has no client secret".to_string()))
    }
}

/// Convert a major-unit amount (dollars) to minor units (cents).
///
/// # Errors
///
/// Returns `PaymentError::InvalidAmount` unless the result is positive and
/// fits in an `i64`.
pub fn to_minor_units(amount: Decimal) -> Result<i64, PaymentError> {
    let cents = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(PaymentError::InvalidAmount)?
        .round();
    match cents.to_i64() {
        Some(value) if value > 0 => Ok(value),
        _ => Err(PaymentError::InvalidAmount),
    }
}

fn normalize_currency(currency: &str) -> Result<String, PaymentError> {
    let currency = currency.trim().to_ascii_lowercase();
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(currency)
    } else {
        Err(PaymentError::InvalidCurrency)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(d("19.99")).unwrap(), 1999);
        assert_eq!(to_minor_units(d("1")).unwrap(), 100);
        assert_eq!(to_minor_units(d("0.015")).unwrap(), 2);
    }

    #[test]
    fn test_to_minor_units_rejects_non_positive() {
        assert!(matches!(to_minor_units(Decimal::ZERO), Err(PaymentError::InvalidAmount)));
        assert!(matches!(to_minor_units(d("-5")), Err(PaymentError::InvalidAmount)));
        assert!(matches!(to_minor_units(d("0.001")), Err(PaymentError::InvalidAmount)));
    }

    #[test]
    fn test_to_minor_units_rejects_huge_amounts() {
        assert!(matches!(to_minor_units(Decimal::MAX), Err(PaymentError::InvalidAmount)));
        assert!(matches!(
            to_minor_units(d("79228162514264337593543950335")),
            Err(PaymentError::InvalidAmount)
        ));
        assert!(matches!(
            to_minor_units(d("792281625142643375935439503")),
            Err(PaymentError::InvalidAmount)
        ));
    }

    #[test]
    fn test_normalize_currency() {
        assert_eq!(normalize_currency(" USD ").unwrap(), "usd");
        assert!(normalize_currency("dollars").is_err());
        assert!(normalize_currency("u$d").is_err());
    }

    #[test]
    fn test_api_error_body_parses() {
        let body = r#"{"error":{"message":"Invalid API Key provided","type":"invalid_request_error"}}"#;
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message.as_deref(), Some("Invalid API Key provided"));
    }
}
