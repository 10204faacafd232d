//! Order totals and coupon rules.
//!
//! All money is `rust_decimal::Decimal` in the store currency's major unit
//! (dollars, not cents) and is rounded to cents with [`round_money`] before it
//! is persisted or shown.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::DiscountType;

/// Largest amount a `NUMERIC(10,2)` column holds: 99,999,999.99.
pub const MAX_MONEY: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Whether `amount` can be stored as `NUMERIC(10,2)` without rounding:
/// not negative, at most [`MAX_MONEY`] and no more than two decimals.
#[must_use]
pub fn is_storable_money(amount: Decimal) -> bool {
    amount >= Decimal::ZERO && amount <= MAX_MONEY && amount.normalize().scale() <= 2
}

/// Round a money amount to cents (half away from zero).
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A priced line of a cart or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    /// Unit price at the time the line is priced.
    pub unit_price: Decimal,
    /// Number of units.
    pub quantity: i32,
}

impl LineItem {
    /// Price of the whole line.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Sum of all line totals, rounded to cents.
#[must_use]
pub fn subtotal(items: &[LineItem]) -> Decimal {
    round_money(items.iter().map(LineItem::total).sum())
}

/// Why a coupon cannot be applied.
///
/// The `Display` strings are shown to shoppers as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponRejection {
    #[error("Coupon is not active")]
    Inactive,
    #[error("Coupon is expired or not yet valid")]
    OutsideValidity,
    #[error("Coupon usage limit reached")]
    UsageLimitReached,
    #[error("Order subtotal must be at least {minimum}")]
    BelowMinimum { minimum: Decimal },
    #[error("Invalid subtotal")]
    InvalidSubtotal,
}

/// The redeemable terms of a coupon, detached from its storage row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponTerms {
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub minimum_amount: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
}

impl CouponTerms {
    /// Check the rules that do not depend on an order.
    ///
    /// Rules are checked in order: active flag, validity window (inclusive on
    /// both ends), usage cap.
    ///
    /// # Errors
    ///
    /// Returns the first rule the coupon fails.
    pub fn check_redeemable(&self, now: DateTime<Utc>) -> Result<(), CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::Inactive);
        }
        if now < self.valid_from || now > self.valid_until {
            return Err(CouponRejection::OutsideValidity);
        }
        if let Some(max_uses) = self.max_uses
            && self.used_count >= max_uses
        {
            return Err(CouponRejection::UsageLimitReached);
        }
        Ok(())
    }

    /// Check every rule against an order subtotal and return the discount.
    ///
    /// # Errors
    ///
    /// Returns the first rule the coupon fails, including the minimum order
    /// amount. A subtotal that is negative or above [`MAX_MONEY`] is
    /// rejected before any rule is checked.
    pub fn check_order(
        &self,
        now: DateTime<Utc>,
        subtotal: Decimal,
    ) -> Result<Decimal, CouponRejection> {
        if subtotal < Decimal::ZERO || subtotal > MAX_MONEY {
            return Err(CouponRejection::InvalidSubtotal);
        }
        self.check_redeemable(now)?;
        if let Some(minimum) = self.minimum_amount
            && subtotal < minimum
        {
            return Err(CouponRejection::BelowMinimum { minimum });
        }
        Ok(self.discount_for(subtotal))
    }

    /// Discount this coupon gives on `subtotal`.
    ///
    /// Never negative and never more than the subtotal.
    #[must_use]
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        let ceiling = subtotal.max(Decimal::ZERO);
        let raw = match self.discount_type {
            DiscountType::Percentage => subtotal
                .checked_mul(self.discount_value)
                .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
                .or_else(|| (subtotal / Decimal::ONE_HUNDRED).checked_mul(self.discount_value))
                .unwrap_or(ceiling),
            DiscountType::Fixed => self.discount_value,
        };
        round_money(raw.clamp(Decimal::ZERO, ceiling))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn terms(discount_type: DiscountType, value: Decimal) -> CouponTerms {
        CouponTerms {
            discount_type,
            discount_value: value,
            minimum_amount: None,
            max_uses: None,
            used_count: 0,
            valid_from: now() - Duration::days(1),
            valid_until: now() + Duration::days(1),
            is_active: true,
        }
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let items = [
            LineItem {
                unit_price: d("1299.99"),
                quantity: 1,
            },
            LineItem {
                unit_price: d("49.99"),
                quantity: 3,
            },
        ];
        assert_eq!(subtotal(&items), d("1449.96"));
        assert_eq!(subtotal(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(d("10.005")), d("10.01"));
        assert_eq!(round_money(d("10.004")), d("10.00"));
    }

    #[test]
    fn test_percentage_discount() {
        let coupon = terms(DiscountType::Percentage, d("15"));
        assert_eq!(coupon.discount_for(d("200.00")), d("30.00"));
        assert_eq!(coupon.discount_for(d("33.33")), d("5.00"));
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let coupon = terms(DiscountType::Fixed, d("25"));
        assert_eq!(coupon.discount_for(d("100")), d("25"));
        assert_eq!(coupon.discount_for(d("10")), d("10"));
    }

    #[test]
    fn test_inactive_coupon_rejected_first() {
        let mut coupon = terms(DiscountType::Fixed, d("5"));
        coupon.is_active = false;
        coupon.used_count = 10;
        coupon.max_uses = Some(1);
        assert_eq!(
            coupon.check_redeemable(now()),
            Err(CouponRejection::Inactive)
        );
    }

    #[test]
    fn test_validity_window() {
        let coupon = terms(DiscountType::Fixed, d("5"));
        assert!(coupon.check_redeemable(now()).is_ok());
        assert_eq!(
            coupon.check_redeemable(now() + Duration::days(2)),
            Err(CouponRejection::OutsideValidity)
        );
        assert_eq!(
            coupon.check_redeemable(now() - Duration::days(2)),
            Err(CouponRejection::OutsideValidity)
        );
        assert!(coupon.check_redeemable(coupon.valid_until).is_ok());
    }

    #[test]
    fn test_usage_limit() {
        let mut coupon = terms(DiscountType::Fixed, d("5"));
        coupon.max_uses = Some(3);
        coupon.used_count = 2;
        assert!(coupon.check_redeemable(now()).is_ok());
        coupon.used_count = 3;
        assert_eq!(
            coupon.check_redeemable(now()),
            Err(CouponRejection::UsageLimitReached)
        );
    }

    #[test]
    fn test_minimum_amount() {
        let mut coupon = terms(DiscountType::Percentage, d("10"));
        coupon.minimum_amount = Some(d("50"));
        assert_eq!(
            coupon.check_order(now(), d("49.99")),
            Err(CouponRejection::BelowMinimum { minimum: d("50") })
        );
        assert_eq!(coupon.check_order(now(), d("50")).unwrap(), d("5.00"));
    }

    #[test]
    fn test_subtotal_at_decimal_limits() {
        let coupon = terms(DiscountType::Percentage, d("10"));
        assert_eq!(
            coupon.check_order(now(), d("79228162514264337593543950335")),
            Err(CouponRejection::InvalidSubtotal)
        );
        assert_eq!(
            coupon.check_order(now(), d("-1")),
            Err(CouponRejection::InvalidSubtotal)
        );
        assert_eq!(coupon.check_order(now(), MAX_MONEY).unwrap(), d("10000000.00"));
        let discount = coupon.discount_for(Decimal::MAX);
        assert!(discount > Decimal::ZERO && discount < Decimal::MAX);
    }

    #[test]
    fn test_storable_money() {
        assert_eq!(MAX_MONEY, d("99999999.99"));
        assert!(is_storable_money(d("0")));
        assert!(is_storable_money(d("19.90")));
        assert!(is_storable_money(d("10.000")));
        assert!(is_storable_money(MAX_MONEY));
        assert!(!is_storable_money(d("100000000")));
        assert!(!is_storable_money(d("9.999")));
        assert!(!is_storable_money(d("-0.01")));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            CouponRejection::OutsideValidity.to_string(),
            "Coupon is expired or not yet valid"
        );
        assert_eq!(
            CouponRejection::UsageLimitReached.to_string(),
            "Coupon usage limit reached"
        );
    }
}
