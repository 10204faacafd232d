//! Coupon models and back-office input validation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fraz_modern_core::{CouponId, CouponTerms, DiscountType, is_storable_money};

/// A discount code.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub minimum_amount: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// The redeemable terms of this coupon.
    #[must_use]
    pub const fn terms(&self) -> CouponTerms {
        CouponTerms {
            discount_type: self.discount_type,
            discount_value: self.discount_value,
            minimum_amount: self.minimum_amount,
            max_uses: self.max_uses,
            used_count: self.used_count,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            is_active: self.is_active,
        }
    }
}

/// Normalize a coupon code as entered by a shopper or admin.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Request body for creating a coupon.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponInput {
    pub code: Option<String>,
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<Decimal>,
    pub minimum_amount: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

/// A validated coupon ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoupon {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub minimum_amount: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
}

impl CouponInput {
    /// Check required fields and value ranges.
    ///
    /// # Errors
    ///
    /// Returns the message to show the admin.
    pub fn validate(self) -> Result<NewCoupon, String> {
        let code = self.code.as_deref().map(normalize_code).unwrap_or_default();
        let (Some(discount_type), Some(discount_value), Some(valid_from), Some(valid_until)) = (
            self.discount_type,
            self.discount_value,
            self.valid_from,
            self.valid_until,
        ) else {
            return Err("Missing required fields".to_string());
        };
        if code.is_empty() {
            return Err("Missing required fields".to_string());
        }

        let coupon = NewCoupon {
            code,
            description: self.description,
            discount_type,
            discount_value,
            minimum_amount: self.minimum_amount,
            max_uses: self.max_uses,
            valid_from,
            valid_until,
            is_active: self.is_active.unwrap_or(true),
        };
        check_ranges(&coupon)?;
        Ok(coupon)
    }
}

/// Partial update of a coupon.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponPatch {
    pub code: Option<String>,
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<Decimal>,
    pub minimum_amount: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl CouponPatch {
    /// Apply the patch to `current` and validate the result.
    ///
    /// # Errors
    ///
    /// Returns the message to show the admin.
    pub fn apply(self, current: &Coupon) -> Result<NewCoupon, String> {
        let code = match self.code {
            Some(code) => {
                let code = normalize_code(&code);
                if code.is_empty() {
                    return Err("Coupon code cannot be empty".to_string());
                }
                code
            }
            None => current.code.clone(),
        };

        let coupon = NewCoupon {
            code,
            description: self.description.or_else(|| current.description.clone()),
            discount_type: self.discount_type.unwrap_or(current.discount_type),
            discount_value: self.discount_value.unwrap_or(current.discount_value),
            minimum_amount: self.minimum_amount.or(current.minimum_amount),
            max_uses: self.max_uses.or(current.max_uses),
            valid_from: self.valid_from.unwrap_or(current.valid_from),
            valid_until: self.valid_until.unwrap_or(current.valid_until),
            is_active: self.is_active.unwrap_or(current.is_active),
        };
        check_ranges(&coupon)?;
        Ok(coupon)
    }
}

fn check_ranges(coupon: &NewCoupon) -> Result<(), String> {
    if coupon.discount_value <= Decimal::ZERO {
        return Err("Discount value must be greater than 0".to_string());
    }
    if !is_storable_money(coupon.discount_value) {
        return Err(
            "Discount value must be at most 99999999.99 with two decimal places".to_string(),
        );
    }
    if coupon.discount_type == DiscountType::Percentage
        && coupon.discount_value > Decimal::ONE_HUNDRED
    {
        return Err("Percentage discount cannot exceed 100".to_string());
    }
    if coupon.valid_until <= coupon.valid_from {
        return Err("validUntil must be after validFrom".to_string());
    }
    if coupon.minimum_amount.is_some_and(|m| m < Decimal::ZERO) {
        return Err("Minimum amount cannot be negative".to_string());
    }
    if coupon.minimum_amount.is_some_and(|m| !is_storable_money(m)) {
        return Err(
            "Minimum amount must be at most 99999999.99 with two decimal places".to_string(),
        );
    }
    if coupon.max_uses.is_some_and(|m| m < 1) {
        return Err("Max uses must be at least 1".to_string());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn input() -> CouponInput {
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        CouponInput {
            code: Some(" summer25 ".to_string()),
            discount_type: Some(DiscountType::Percentage),
            discount_value: Some("25".parse().unwrap()),
            valid_from: Some(from),
            valid_until: Some(from + Duration::days(90)),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_uppercases_code() {
        let coupon = input().validate().unwrap();
        assert_eq!(coupon.code, "SUMMER25");
        assert!(coupon.is_active);
    }

    #[test]
    fn test_validate_missing_fields() {
        let mut missing = input();
        missing.valid_until = None;
        assert_eq!(missing.validate().unwrap_err(), "Missing required fields");

        let mut blank = input();
        blank.code = Some("  ".to_string());
        assert_eq!(blank.validate().unwrap_err(), "Missing required fields");
    }

    #[test]
    fn test_validate_percentage_range() {
        let mut over = input();
        over.discount_value = Some("100.01".parse().unwrap());
        assert!(over.validate().is_err());

        let mut fixed = input();
        fixed.discount_type = Some(DiscountType::Fixed);
        fixed.discount_value = Some("150".parse().unwrap());
        assert!(fixed.validate().is_ok());
    }

    #[test]
    fn test_validate_amounts_fit_money_column() {
        let mut huge = input();
        huge.discount_type = Some(DiscountType::Fixed);
        huge.discount_value = Some("100000000".parse().unwrap());
        assert_eq!(
            huge.validate().unwrap_err(),
            "Discount value must be at most 99999999.99 with two decimal places"
        );

        let mut fine_grained = input();
        fine_grained.discount_value = Some("12.505".parse().unwrap());
        assert_eq!(
            fine_grained.validate().unwrap_err(),
            "Discount value must be at most 99999999.99 with two decimal places"
        );

        let mut minimum = input();
        minimum.minimum_amount = Some("0.001".parse().unwrap());
        assert_eq!(
            minimum.validate().unwrap_err(),
            "Minimum amount must be at most 99999999.99 with two decimal places"
        );

        let mut ok = input();
        ok.minimum_amount = Some("99999999.99".parse().unwrap());
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_validate_window_order() {
        let mut backwards = input();
        backwards.valid_until = backwards.valid_from;
        assert_eq!(
            backwards.validate().unwrap_err(),
            "validUntil must be after validFrom"
        );
    }

    #[test]
    fn test_patch_keeps_unspecified_fields() {
        let new = input().validate().unwrap();
        let current = Coupon {
            id: CouponId::new(1),
            code: new.code,
            description: Some("Summer sale".to_string()),
            discount_type: new.discount_type,
            discount_value: new.discount_value,
            minimum_amount: None,
            max_uses: Some(100),
            used_count: 4,
            valid_from: new.valid_from,
            valid_until: new.valid_until,
            is_active: true,
            created_at: new.valid_from,
            updated_at: new.valid_from,
        };

        let patched = CouponPatch {
            is_active: Some(false),
            ..Default::default()
        }
        .apply(&current)
        .unwrap();

        assert!(!patched.is_active);
        assert_eq!(patched.code, "SUMMER25");
        assert_eq!(patched.max_uses, Some(100));
        assert_eq!(patched.description.as_deref(), Some("Summer sale"));
    }
}
