//! Pure fixed-point math for WAD (18 decimal) and token-scale amounts.
//!
//! All amounts are `U256` raw integers. Every operation truncates toward
//! zero exactly like the on-chain math does. No async, no network calls.

use std::fmt;

use alloy_primitives::{I256, U256};
use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

/// `10^18`, the unit for ratios and FIAT-denominated amounts.
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Sentinel returned for the collateralization ratio of a debt-free position.
pub const INFINITE_RATIO: U256 = U256::MAX;

/// Seconds in a 365 day year, used to annualize per-second interest.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Errors that can occur during fixed-point conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WadError {
    Overflow { context: String },
    Underflow { context: String },
    DivisionByZero { context: String },
    InvalidDecimal { input: String, reason: String },
}

impl fmt::Display for WadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WadError::Overflow { context } => write!(f, "Overflow: {}", context),
            WadError::Underflow { context } => write!(f, "Underflow: {}", context),
            WadError::DivisionByZero { context } => write!(f, "Division by zero: {}", context),
            WadError::InvalidDecimal { input, reason } => {
                write!(f, "Invalid decimal '{}': {}", input, reason)
            }
        }
    }
}

impl std::error::Error for WadError {}

fn overflow(context: &str) -> WadError {
    WadError::Overflow {
        context: context.to_string(),
    }
}

fn div_zero(context: &str) -> WadError {
    WadError::DivisionByZero {
        context: context.to_string(),
    }
}

/// `a * b / denom`, truncating.
pub fn mul_div(a: U256, b: U256, denom: U256) -> Result<U256, WadError> {
    if denom.is_zero() {
        return Err(div_zero("mul_div denominator"));
    }
    a.checked_mul(b)
        .map(|n| n / denom)
        .ok_or_else(|| overflow("mul_div product"))
}

/// `a * b / WAD`.
pub fn wmul(a: U256, b: U256) -> Result<U256, WadError> {
    mul_div(a, b, WAD)
}

/// `a * WAD / b`.
pub fn wdiv(a: U256, b: U256) -> Result<U256, WadError> {
    if b.is_zero() {
        return Err(div_zero("wdiv divisor"));
    }
    mul_div(a, WAD, b)
}

pub fn add(a: U256, b: U256, context: &str) -> Result<U256, WadError> {
    a.checked_add(b).ok_or_else(|| overflow(context))
}

/// `x^n` where `x` is a WAD value and `n` a plain integer exponent.
pub fn wpow(x: U256, mut n: u64) -> Result<U256, WadError> {
    let mut result = WAD;
    let mut base = x;
    while n > 0 {
        if n & 1 == 1 {
            result = wmul(result, base)?;
        }
        n >>= 1;
        if n > 0 {
            base = wmul(base, base)?;
        }
    }
    Ok(result)
}

/// `10^decimals` as a `U256` scale.
pub fn scale_from_decimals(decimals: u32) -> Result<U256, WadError> {
    U256::from(10u8)
        .checked_pow(U256::from(decimals))
        .ok_or_else(|| overflow(&format!("10^{} overflow", decimals)))
}

/// Number of decimals a power-of-ten scale represents (`1e6` → `6`).
pub fn decimals_of_scale(scale: U256) -> Result<u32, WadError> {
    if scale.is_zero() {
        return Err(div_zero("scale is zero"));
    }
    let ten = U256::from(10u8);
    let mut remaining = scale;
    let mut decimals = 0u32;
    while remaining > U256::from(1u8) {
        if remaining % ten != U256::ZERO {
            return Err(WadError::InvalidDecimal {
                input: scale.to_string(),
                reason: "scale is not a power of ten".to_string(),
            });
        }
        remaining /= ten;
        decimals += 1;
    }
    Ok(decimals)
}

/// Convert an amount in `scale` units to WAD.
pub fn scale_to_wad(amount: U256, scale: U256) -> Result<U256, WadError> {
    mul_div(amount, WAD, scale)
}

/// Convert a WAD amount to `scale` units.
pub fn wad_to_scale(amount: U256, scale: U256) -> Result<U256, WadError> {
    mul_div(amount, scale, WAD)
}

/// Convert a non-negative human-readable decimal into `scale` units (floored).
pub fn dec_to_scale(value: Decimal, scale: U256) -> Result<U256, WadError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(WadError::InvalidDecimal {
            input: value.to_string(),
            reason: "value must not be negative".to_string(),
        });
    }
    let mantissa = U256::from(value.mantissa().unsigned_abs());
    let divisor = scale_from_decimals(value.scale())?;
    mul_div(mantissa, scale, divisor)
}

/// Convert a non-negative human-readable decimal into WAD.
pub fn dec_to_wad(value: Decimal) -> Result<U256, WadError> {
    dec_to_scale(value, WAD)
}

/// Parse a decimal string and convert it into WAD.
pub fn parse_wad(input: &str) -> Result<U256, WadError> {
    let value = Decimal::from_str(input.trim()).map_err(|e| WadError::InvalidDecimal {
        input: input.to_string(),
        reason: e.to_string(),
    })?;
    dec_to_wad(value)
}

/// Render `amount / 10^decimals` as a plain decimal string, trailing zeros trimmed.
pub fn format_units(amount: U256, decimals: u32) -> String {
    let digits = amount.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// Render a WAD amount as a decimal string (`1.5e18` → `"1.5"`).
pub fn wad_to_dec(amount: U256) -> String {
    format_units(amount, 18)
}

/// Convert a `scale`-unit amount to a `Decimal` for display math.
pub fn scale_to_decimal(amount: U256, scale: U256) -> Result<Decimal, WadError> {
    let rendered = format_units(amount, decimals_of_scale(scale)?);
    Decimal::from_str(&rendered).map_err(|e| WadError::InvalidDecimal {
        input: rendered,
        reason: e.to_string(),
    })
}

/// Convert a WAD amount to a `Decimal` for display math.
pub fn wad_to_decimal(amount: U256) -> Result<Decimal, WadError> {
    scale_to_decimal(amount, WAD)
}

/// Floor a decimal to `dp` decimal places.
pub fn floor_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::ToZero)
}

/// Apply `amount * (WAD - fraction) / WAD`, e.g. slippage or a safety buffer.
pub fn apply_discount(amount: U256, fraction: U256) -> Result<U256, WadError> {
    let factor = WAD.checked_sub(fraction).ok_or_else(|| WadError::Underflow {
        context: format!("discount fraction {} exceeds WAD", fraction),
    })?;
    wmul(amount, factor)
}

/// Signed `U256` → `I256` conversion.
pub fn to_signed(amount: U256) -> Result<I256, WadError> {
    I256::try_from(amount).map_err(|_| overflow(&format!("{} does not fit in I256", amount)))
}

// ─── Protocol math ───────────────────────────────────────────────────────────

/// Normalized debt for a FIAT-denominated debt amount: `debt / rate`.
pub fn debt_to_normal_debt(debt: U256, virtual_rate: U256) -> Result<U256, WadError> {
    wdiv(debt, virtual_rate)
}

/// FIAT-denominated debt for a normalized debt amount: `normal_debt * rate`.
pub fn normal_debt_to_debt(normal_debt: U256, virtual_rate: U256) -> Result<U256, WadError> {
    wmul(normal_debt, virtual_rate)
}

/// `(collateral * fair_price) / (normal_debt * rate)`.
///
/// Returns [`INFINITE_RATIO`] when the debt value is zero.
pub fn compute_collateralization_ratio(
    collateral: U256,
    fair_price: U256,
    normal_debt: U256,
    virtual_rate: U256,
) -> Result<U256, WadError> {
    let debt_value = wmul(normal_debt, virtual_rate)?;
    if debt_value.is_zero() {
        return Ok(INFINITE_RATIO);
    }
    wdiv(wmul(collateral, fair_price)?, debt_value)
}

/// Largest normalized debt that keeps the ratio at `targeted_coll_ratio`.
pub fn compute_max_normal_debt(
    collateral: U256,
    virtual_rate: U256,
    fair_price: U256,
    targeted_coll_ratio: U256,
) -> Result<U256, WadError> {
    if targeted_coll_ratio.is_zero() {
        return Err(div_zero("targeted collateralization ratio"));
    }
    let value = wmul(collateral, fair_price)?;
    wdiv(wdiv(value, targeted_coll_ratio)?, virtual_rate)
}

/// Accumulated rate factor between `now` and `maturity` (WAD, `>= 1`).
pub fn interest_per_second_to_rate_until_maturity(
    interest_per_second: U256,
    maturity: u64,
    now: u64,
) -> Result<U256, WadError> {
    wpow(interest_per_second, maturity.saturating_sub(now))
}

/// Annualized rate for a per-second interest factor (WAD, `0.05e18` = 5%).
pub fn interest_per_second_to_apy(interest_per_second: U256) -> Result<U256, WadError> {
    Ok(wpow(interest_per_second, SECONDS_PER_YEAR)?.saturating_sub(WAD))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wad(s: &str) -> U256 {
        parse_wad(s).unwrap()
    }

    #[test]
    fn test_wad_constant() {
        assert_eq!(WAD, U256::from(10u64).pow(U256::from(18)));
    }

    #[test]
    fn test_scale_round_trip_six_decimals() {
        let scale = U256::from(1_000_000u64);
        let wad_amount = scale_to_wad(U256::from(1_500_000u64), scale).unwrap();
        assert_eq!(wad_amount, wad("1.5"));
        assert_eq!(wad_to_scale(wad_amount, scale).unwrap(), U256::from(1_500_000u64));
    }

    #[test]
    fn test_wad_to_scale_truncates() {
        let scale = U256::from(1_000_000u64);
        // 1.0000009 WAD -> 1.000000 in 6 decimals
        assert_eq!(
            wad_to_scale(wad("1.0000009"), scale).unwrap(),
            U256::from(1_000_000u64)
        );
    }

    #[test]
    fn test_dec_to_scale() {
        let scale = U256::from(1_000_000u64);
        let value = Decimal::from_str("1000.1234").unwrap();
        assert_eq!(dec_to_scale(value, scale).unwrap(), U256::from(1_000_123_400u64));
    }

    #[test]
    fn test_dec_to_scale_rejects_negative() {
        let value = Decimal::from_str("-1").unwrap();
        assert!(matches!(
            dec_to_scale(value, WAD),
            Err(WadError::InvalidDecimal { .. })
        ));
    }

    #[test]
    fn test_parse_wad_invalid() {
        assert!(matches!(parse_wad("abc"), Err(WadError::InvalidDecimal { .. })));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(wad_to_dec(WAD), "1");
        assert_eq!(wad_to_dec(wad("0.5")), "0.5");
        assert_eq!(wad_to_dec(U256::ZERO), "0");
        assert_eq!(wad_to_dec(U256::from(1u8)), "0.000000000000000001");
        assert_eq!(format_units(U256::from(123_450_000u64), 6), "123.45");
    }

    #[test]
    fn test_decimals_of_scale() {
        assert_eq!(decimals_of_scale(U256::from(1u8)).unwrap(), 0);
        assert_eq!(decimals_of_scale(U256::from(1_000_000u64)).unwrap(), 6);
        assert_eq!(decimals_of_scale(WAD).unwrap(), 18);
        assert!(decimals_of_scale(U256::from(1_500u64)).is_err());
    }

    #[test]
    fn test_wdiv_by_zero() {
        assert!(matches!(wdiv(WAD, U256::ZERO), Err(WadError::DivisionByZero { .. })));
    }

    #[test]
    fn test_apply_discount() {
        // 999 * (1 - 0.001) = 998.001
        assert_eq!(apply_discount(wad("999"), wad("0.001")).unwrap(), wad("998.001"));
        assert!(apply_discount(WAD, wad("1.5")).is_err());
    }

    #[test]
    fn test_debt_conversions() {
        let rate = wad("1.1");
        assert_eq!(normal_debt_to_debt(wad("100"), rate).unwrap(), wad("110"));
        assert_eq!(debt_to_normal_debt(wad("110"), rate).unwrap(), wad("100"));
    }

    #[test]
    fn test_coll_ratio_sentinel_for_zero_debt() {
        let ratio = compute_collateralization_ratio(wad("10"), WAD, U256::ZERO, WAD).unwrap();
        assert_eq!(ratio, INFINITE_RATIO);
    }

    #[test]
    fn test_coll_ratio() {
        // 150 collateral at 1.0 against 100 debt at rate 1.0 -> 150%
        let ratio = compute_collateralization_ratio(wad("150"), WAD, wad("100"), WAD).unwrap();
        assert_eq!(ratio, wad("1.5"));
    }

    #[test]
    fn test_max_normal_debt_hits_target_ratio() {
        let collateral = wad("120");
        let fair_price = wad("1");
        let rate = wad("1");
        let target = wad("1.2");
        let normal_debt = compute_max_normal_debt(collateral, rate, fair_price, target).unwrap();
        assert_eq!(normal_debt, wad("100"));
        let ratio = compute_collateralization_ratio(collateral, fair_price, normal_debt, rate).unwrap();
        assert_eq!(ratio, target);
    }

    #[test]
    fn test_wpow() {
        assert_eq!(wpow(wad("2"), 0).unwrap(), WAD);
        assert_eq!(wpow(wad("2"), 10).unwrap(), wad("1024"));
        assert_eq!(wpow(wad("1.5"), 2).unwrap(), wad("2.25"));
    }

    #[test]
    fn test_rate_until_maturity_after_maturity_is_one() {
        let rate = interest_per_second_to_rate_until_maturity(wad("1.000000001"), 100, 200).unwrap();
        assert_eq!(rate, WAD);
    }

    #[test]
    fn test_apy_of_zero_interest() {
        assert_eq!(interest_per_second_to_apy(WAD).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_apy_is_roughly_three_percent() {
        // 1.000000000937303470 per second ~= 3% per year
        let apy = interest_per_second_to_apy(U256::from(1_000_000_000_937_303_470u64)).unwrap();
        assert!(apy > wad("0.0299") && apy < wad("0.0301"), "apy = {}", apy);
    }

    #[test]
    fn test_floor_dp() {
        assert_eq!(
            floor_dp(Decimal::from_str("1.23456").unwrap(), 4),
            Decimal::from_str("1.2345").unwrap()
        );
    }
}
