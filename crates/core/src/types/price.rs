//! Price arithmetic on decimal amounts.
//!
//! All monetary values are `rust_decimal::Decimal` in the store currency's
//! standard unit (dollars, not cents). Ratios that leave the money domain
//! (percentages, conversion rates) are `f64`.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;

/// Format an amount for display (e.g. `$19.99`).
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.2}")
}

/// Percentage discount of `price` relative to `old_price`.
///
/// Returns 0 when there is no old price, when the old price is zero, or when
/// it does not exceed the current price.
#[must_use]
pub fn discount_percentage(price: Decimal, old_price: Option<Decimal>) -> f64 {
    match old_price {
        Some(old) if old > price && !old.is_zero() => percent_of(old - price, old),
        _ => 0.0,
    }
}

/// `part / whole * 100`, short-circuiting to 0 when `whole` is zero.
#[must_use]
pub fn percent_of(part: Decimal, whole: Decimal) -> f64 {
    part.checked_div(whole)
        .and_then(|ratio| (ratio * Decimal::ONE_HUNDRED).to_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Decimal::new(1999, 2)), "$19.99");
        assert_eq!(format_price(Decimal::from(5)), "$5.00");
        assert_eq!(format_price(Decimal::new(12345, 3)), "$12.35");
        assert_eq!(format_price(Decimal::new(12335, 3)), "$12.34");
        assert_eq!(format_price(Decimal::new(1, 3)), "$0.00");
    }

    #[test]
    fn test_discount_percentage() {
        let pct = discount_percentage(Decimal::from(75), Some(Decimal::from(100)));
        assert!((pct - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_discount_percentage_guards() {
        assert!(discount_percentage(Decimal::from(75), None).abs() < f64::EPSILON);
        assert!(discount_percentage(Decimal::from(75), Some(Decimal::from(50))).abs() < f64::EPSILON);
        assert!(discount_percentage(Decimal::ZERO, Some(Decimal::ZERO)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percent_of_zero_denominator() {
        assert!(percent_of(Decimal::from(3), Decimal::ZERO).abs() < f64::EPSILON);
    }
}
