//! Amount and quantity parsing for Brazilian-formatted bills.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a Brazilian-formatted amount (e.g., "1.234,56" or "-225,42").
///
/// Thousands separators (`.`) are dropped and the decimal comma becomes a
/// point. Malformed input yields zero instead of an error.
pub fn parse_decimal(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

/// Parse an integer kWh quantity, tolerating thousands separators ("1.234").
pub fn parse_quantity(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect();

    cleaned.parse().ok()
}

/// Format amount in Brazilian style (R$ 1.234,56).
pub fn format_brl(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let chars: Vec<char> = integer_part.chars().collect();
    let mut grouped = String::new();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}R$ {},{}", sign, grouped, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1.234,56"), Decimal::new(123456, 2));
        assert_eq!(parse_decimal("47,75"), Decimal::new(4775, 2));
        assert_eq!(parse_decimal("-225,42"), Decimal::new(-22542, 2));
        assert_eq!(parse_decimal("1.000.000,00"), Decimal::new(100000000, 2));
        assert_eq!(parse_decimal(" 49,43 "), Decimal::new(4943, 2));
    }

    #[test]
    fn test_parse_decimal_malformed_is_zero() {
        assert_eq!(parse_decimal("abc"), Decimal::ZERO);
        assert_eq!(parse_decimal(""), Decimal::ZERO);
        assert_eq!(parse_decimal("12,34,56"), Decimal::ZERO);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("50"), Some(50));
        assert_eq!(parse_quantity("1.234"), Some(1234));
        assert_eq!(parse_quantity("12a"), None);
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(Decimal::new(123456, 2)), "R$ 1.234,56");
        assert_eq!(format_brl(Decimal::new(4775, 2)), "R$ 47,75");
        assert_eq!(format_brl(Decimal::new(-22542, 2)), "-R$ 225,42");
        assert_eq!(format_brl(Decimal::new(100000000, 2)), "R$ 1.000.000,00");
    }
}
