//! Number formatting utilities for human-readable display.
//!
//! WAD amounts are converted through `Decimal` so nothing is lost to `f64`
//! rounding before the last step.

use alloy_primitives::U256;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::shared::wad::{wad_to_decimal, INFINITE_RATIO};

/// Trims trailing zeros, adds thousands separators.
pub fn display_formatted_string(formatted: String) -> String {
    let trimmed = if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    };

    let (sign, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

fn rounded(value: Decimal, decimals: u32) -> String {
    let value = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.1$}", value, decimals as usize)
}

/// Format a WAD amount with explicit decimal places and separators.
pub fn display_wad_with_decimals(amount: U256, decimals: u32) -> String {
    match wad_to_decimal(amount) {
        Ok(value) => display_formatted_string(rounded(value, decimals)),
        Err(_) => amount.to_string(),
    }
}

/// Format a WAD amount for display with two decimal places.
pub fn display_wad(amount: U256) -> String {
    display_wad_with_decimals(amount, 2)
}

/// Format a WAD fraction as a percentage, e.g. `0.0512e18` → `"5.12%"`.
pub fn display_percent(fraction: U256) -> String {
    match wad_to_decimal(fraction) {
        Ok(value) => format!("{}%", rounded(value * Decimal::ONE_HUNDRED, 2)),
        Err(_) => fraction.to_string(),
    }
}

/// Format a collateralization ratio. The infinite sentinel renders as `∞`.
pub fn display_coll_ratio(ratio: U256) -> String {
    if ratio == INFINITE_RATIO {
        return "∞".to_string();
    }
    display_percent(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::wad::parse_wad;

    #[test]
    fn test_display_formatted_string_thousands_separator() {
        assert_eq!(display_formatted_string("0".to_string()), "0");
        assert_eq!(display_formatted_string("123".to_string()), "123");
        assert_eq!(display_formatted_string("1000".to_string()), "1,000");
        assert_eq!(display_formatted_string("1234567".to_string()), "1,234,567");
    }

    #[test]
    fn test_display_formatted_string_decimals() {
        assert_eq!(display_formatted_string("1.50".to_string()), "1.5");
        assert_eq!(display_formatted_string("1000.00".to_string()), "1,000");
        assert_eq!(display_formatted_string("-1234.56".to_string()), "-1,234.56");
    }

    #[test]
    fn test_display_wad() {
        assert_eq!(display_wad(parse_wad("1234.567").unwrap()), "1,234.57");
        assert_eq!(display_wad(U256::ZERO), "0");
    }

    #[test]
    fn test_display_coll_ratio() {
        assert_eq!(display_coll_ratio(INFINITE_RATIO), "∞");
        assert_eq!(display_coll_ratio(parse_wad("1.5").unwrap()), "150.00%");
        assert_eq!(display_coll_ratio(parse_wad("1.23456").unwrap()), "123.46%");
    }
}
