//! Discount coupons.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::CouponId;
use crate::validation::{FieldError, Validate};

/// How a coupon's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponKind {
    /// `value` is a percentage of the subtotal (0, 100].
    Percentage,
    /// `value` is a fixed amount off the subtotal.
    Fixed,
}

/// A discount code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: CouponId,
    /// Uppercase alphanumeric redemption code.
    pub code: String,
    #[serde(rename = "type")]
    pub kind: CouponKind,
    pub value: Decimal,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl Coupon {
    /// Whether the coupon can be redeemed at `now`.
    #[must_use]
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_none_or(|expires| now < expires)
    }

    /// Discount this coupon grants on `subtotal`, never more than the subtotal.
    #[must_use]
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        let raw = match self.kind {
            CouponKind::Percentage => (subtotal * self.value / Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            CouponKind::Fixed => self.value,
        };
        raw.min(subtotal).max(Decimal::ZERO)
    }
}

/// Whether `code` is a non-empty run of uppercase ASCII letters and digits.
#[must_use]
pub fn is_valid_coupon_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

impl Validate for Coupon {
    fn validate_into(&self, path: &str, errors: &mut Vec<FieldError>) {
        if self.id.is_blank() {
            errors.push(FieldError::new(format!("{path}.id"), "must not be empty"));
        }
        if !is_valid_coupon_code(&self.code) {
            errors.push(FieldError::new(
                format!("{path}.code"),
                "must be uppercase letters and digits",
            ));
        }
        if self.value <= Decimal::ZERO {
            errors.push(FieldError::new(format!("{path}.value"), "must be positive"));
        }
        if self.kind == CouponKind::Percentage && self.value > Decimal::ONE_HUNDRED {
            errors.push(FieldError::new(
                format!("{path}.value"),
                "percentage cannot exceed 100",
            ));
        }
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("id", self.id.to_string()), ("code", self.code.clone())]
    }
}

/// Partial update for a coupon.
#[derive(Debug, Clone, Default)]
pub struct CouponUpdate {
    pub code: Option<String>,
    pub kind: Option<CouponKind>,
    pub value: Option<Decimal>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub is_active: Option<bool>,
}

impl CouponUpdate {
    /// Apply the set fields onto `coupon`.
    pub fn apply(self, coupon: &mut Coupon) {
        if let Some(code) = self.code {
            coupon.code = code;
        }
        if let Some(kind) = self.kind {
            coupon.kind = kind;
        }
        if let Some(value) = self.value {
            coupon.value = value;
        }
        if let Some(expires_at) = self.expires_at {
            coupon.expires_at = expires_at;
        }
        if let Some(is_active) = self.is_active {
            coupon.is_active = is_active;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn coupon(kind: CouponKind, value: Decimal) -> Coupon {
        Coupon {
            id: CouponId::new("c-1"),
            code: "PROMO10".to_string(),
            kind,
            value,
            expires_at: None,
            is_active: true,
        }
    }

    #[test]
    fn test_percentage_discount() {
        let c = coupon(CouponKind::Percentage, Decimal::from(10));
        assert_eq!(c.discount_for(Decimal::new(4999, 2)), Decimal::new(500, 2));
        // 1.225 rounds up
        assert_eq!(c.discount_for(Decimal::new(1225, 2)), Decimal::new(123, 2));
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let c = coupon(CouponKind::Fixed, Decimal::from(20));
        assert_eq!(c.discount_for(Decimal::from(15)), Decimal::from(15));
        assert_eq!(c.discount_for(Decimal::from(50)), Decimal::from(20));
    }

    #[test]
    fn test_expiry() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let mut c = coupon(CouponKind::Fixed, Decimal::ONE);
        assert!(c.is_redeemable(now));
        c.expires_at = Some(Utc.with_ymd_and_hms(2026, 4, 30, 0, 0, 0).unwrap());
        assert!(!c.is_redeemable(now));
        c.expires_at = None;
        c.is_active = false;
        assert!(!c.is_redeemable(now));
    }

    #[test]
    fn test_code_validation() {
        assert!(is_valid_coupon_code("VERANO2026"));
        assert!(!is_valid_coupon_code("verano"));
        assert!(!is_valid_coupon_code("PRO-MO"));
        assert!(!is_valid_coupon_code(""));
    }

    #[test]
    fn test_type_field_name() {
        let c: Coupon = serde_json::from_str(
            r#"{"id": "c", "code": "X1", "type": "percentage", "value": 5, "isActive": true}"#,
        )
        .unwrap();
        assert_eq!(c.kind, CouponKind::Percentage);
        assert!(c.validate().is_ok());
    }
}
