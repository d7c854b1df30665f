//! Rounding helpers shared by the calculators and their callers.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places (paise) using
/// half-up rounding.
///
/// Values at exactly 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use gst_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `amount * rate_percent / 100` without intermediate rounding, or `None`
/// when the product does not fit in a [`Decimal`].
pub fn percent_of(
    amount: Decimal,
    rate_percent: Decimal,
) -> Option<Decimal> {
    amount
        .checked_mul(rate_percent)?
        .checked_div(Decimal::ONE_HUNDRED)
}
