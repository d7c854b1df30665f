use std::sync::LazyLock;

use gst_core::calculations::common::round_half_up;
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for decimal parsing: trims whitespace, a leading rupee
/// sign and commas (thousands separators, Indian or western).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().trim_start_matches('₹').trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Accepts `"1,234.56"`, `"12,34,567"` and `"₹500"`.
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Groups an unsigned digit string the Indian way: the last three digits,
/// then pairs. `"1234567"` becomes `"12,34,567"`.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (mut head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    while head.len() > 2 {
        let (rest, pair) = head.split_at(head.len() - 2);
        groups.push(pair);
        head = rest;
    }
    if !head.is_empty() {
        groups.push(head);
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Formats an amount as rupees, rounded half-up to paise, with Indian
/// digit grouping: `₹12,34,567.89`.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = round_half_up(amount);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (whole, paise) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{sign}₹{}.{paise}", group_indian(whole))
}

/// `18` -> `"18%"`, `12.50` -> `"12.5%"`.
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", rate.normalize())
}

static IFSC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").expect("IFSC pattern is valid")
});

/// Bank branch code: four letters, a zero, six alphanumerics.
pub fn is_valid_ifsc(code: &str) -> bool {
    IFSC_RE.is_match(code)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_decimal_accepts_comma_thousands_separator() {
        assert_eq!(parse_decimal("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("12,34,567.89").unwrap(), dec!(1234567.89));
    }

    #[test]
    fn parse_decimal_strips_rupee_sign_and_whitespace() {
        assert_eq!(parse_decimal("  ₹ 500  ").unwrap(), dec!(500));
    }

    #[test]
    fn parse_decimal_empty_treated_as_zero() {
        assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_decimal("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_decimal_invalid_returns_error() {
        assert!(parse_decimal("abc").is_err());
    }

    #[test]
    fn group_indian_uses_lakh_and_crore_positions() {
        assert_eq!(group_indian("0"), "0");
        assert_eq!(group_indian("999"), "999");
        assert_eq!(group_indian("1000"), "1,000");
        assert_eq!(group_indian("100000"), "1,00,000");
        assert_eq!(group_indian("1234567"), "12,34,567");
        assert_eq!(group_indian("123456789"), "12,34,56,789");
    }

    #[test]
    fn format_inr_rounds_and_groups() {
        assert_eq!(format_inr(dec!(1234567.885)), "₹12,34,567.89");
        assert_eq!(format_inr(dec!(1180)), "₹1,180.00");
        assert_eq!(format_inr(dec!(8.33325)), "₹8.33");
        assert_eq!(format_inr(dec!(0.005)), "₹0.01");
        assert_eq!(format_inr(Decimal::ZERO), "₹0.00");
    }

    #[test]
    fn format_inr_negative() {
        assert_eq!(format_inr(dec!(-150000.5)), "-₹1,50,000.50");
    }

    #[test]
    fn format_rate_drops_trailing_zeros() {
        assert_eq!(format_rate(dec!(18.00)), "18%");
        assert_eq!(format_rate(dec!(12.50)), "12.5%");
        assert_eq!(format_rate(dec!(0)), "0%");
    }

    #[test]
    fn ifsc_validation() {
        assert!(is_valid_ifsc("HDFC0001234"));
        assert!(is_valid_ifsc("SBIN0ABC123"));
        assert!(!is_valid_ifsc("HDFC1001234"));
        assert!(!is_valid_ifsc("hdfc0001234"));
        assert!(!is_valid_ifsc("HDFC000123"));
    }
}
