//! Coupon validation for the checkout page.

use axum::{Json, extract::State};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use fraz_modern_core::{CouponId, CouponRejection, DiscountType, MAX_MONEY};

use crate::db::CouponRepository;
use crate::error::{AppError, Result};
use crate::extract::QueryParams;
use crate::models::{Coupon, normalize_code};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    pub code: Option<String>,
    pub subtotal: Option<Decimal>,
}

impl ValidateQuery {
    /// The subtotal to price against, if one was given.
    ///
    /// # Errors
    ///
    /// Returns a 400 for a negative subtotal or one larger than an order
    /// total can be.
    pub fn subtotal(&self) -> Result<Option<Decimal>> {
        match self.subtotal {
            Some(subtotal) if subtotal < Decimal::ZERO || subtotal > MAX_MONEY => Err(
                AppError::BadRequest(CouponRejection::InvalidSubtotal.to_string()),
            ),
            other => Ok(other),
        }
    }
}

/// What a shopper may know about a coupon.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidCoupon {
    pub id: CouponId,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub minimum_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
}

impl ValidCoupon {
    fn new(coupon: Coupon, discount: Option<Decimal>) -> Self {
        Self {
            id: coupon.id,
            code: coupon.code,
            description: coupon.description,
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value,
            minimum_amount: coupon.minimum_amount,
            discount,
        }
    }
}

/// Check whether a code can be redeemed now, and for how much when a
/// subtotal is given.
#[instrument(skip(state))]
pub async fn validate(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ValidateQuery>,
) -> Result<Json<ValidCoupon>> {
    let code = query.code.as_deref().map(normalize_code).unwrap_or_default();
    if code.is_empty() {
        return Err(AppError::BadRequest("Coupon code is required".to_string()));
    }
    let subtotal = query.subtotal()?;

    let coupon = CouponRepository::new(state.pool())
        .get_by_code(&code)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid coupon code".to_string()))?;

    let terms = coupon.terms();
    let now = Utc::now();
    let reject = |rejection: CouponRejection| AppError::BadRequest(rejection.to_string());
    let discount = match subtotal {
        Some(subtotal) => Some(terms.check_order(now, subtotal).map_err(reject)?),
        None => {
            terms.check_redeemable(now).map_err(reject)?;
            None
        }
    };

    Ok(Json(ValidCoupon::new(coupon, discount)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn query(subtotal: &str) -> ValidateQuery {
        ValidateQuery {
            code: Some("SAVE10".to_string()),
            subtotal: Some(subtotal.parse().unwrap()),
        }
    }

    #[test]
    fn test_subtotal_in_range() {
        assert_eq!(query("49.90").subtotal().unwrap(), Some("49.90".parse().unwrap()));
        let none = ValidateQuery {
            code: Some("SAVE10".to_string()),
            subtotal: None,
        };
        assert_eq!(none.subtotal().unwrap(), None);
    }

    #[test]
    fn test_subtotal_out_of_range_is_bad_request() {
        for raw in ["-1", "100000000", "79228162514264337593543950335"] {
            let err = query(raw).subtotal().unwrap_err();
            assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
            assert_eq!(err.public_message(), "Invalid subtotal");
        }
    }
}
