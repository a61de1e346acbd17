//! Tunable constants for dispatch, valuation and the client.
//!
//! Every field has a default, so a partial JSON document is enough:
//!
//! ```json
//! { "swap_debt_buffer": "0.002", "debounce_ms": 250 }
//! ```

use std::time::Duration;

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FiatError;
use crate::shared::serde_util::u256_dec;
use crate::shared::wad::{dec_to_wad, WadError, WAD};

/// Configuration shared by the dispatcher, the engine and the client.
///
/// Fractions (`*_buffer`, `default_*`) are human-readable decimals and are
/// converted to WAD on use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionsConfig {
    pub modify_debt_buffer: Decimal,
    pub swap_debt_buffer: Decimal,
    pub redeem_debt_buffer: Decimal,
    /// Remaining normal debt below this is snapped to zero.
    #[serde(with = "u256_dec")]
    pub dust_threshold: U256,
    pub swap_deadline_secs: u64,
    pub debounce_ms: u64,
    pub default_slippage_pct: Decimal,
    pub default_targeted_coll_ratio: Decimal,
    /// Upper clamp for slippage input, in percent.
    pub max_slippage_pct: Decimal,
    pub input_precision: u32,
    pub collateral_type_cache_ttl_secs: u64,
}

impl Default for PositionsConfig {
    fn default() -> Self {
        Self {
            modify_debt_buffer: Decimal::new(1, 4),
            swap_debt_buffer: Decimal::new(1, 3),
            redeem_debt_buffer: Decimal::new(1, 3),
            dust_threshold: WAD,
            swap_deadline_secs: 3600,
            debounce_ms: 400,
            default_slippage_pct: Decimal::new(1, 3),
            default_targeted_coll_ratio: Decimal::new(12, 1),
            max_slippage_pct: Decimal::from(50),
            input_precision: 4,
            collateral_type_cache_ttl_secs: 60,
        }
    }
}

impl PositionsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, FiatError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the math cannot work with.
    pub fn validate(&self) -> Result<(), FiatError> {
        for (name, value) in [
            ("modify_debt_buffer", self.modify_debt_buffer),
            ("swap_debt_buffer", self.swap_debt_buffer),
            ("redeem_debt_buffer", self.redeem_debt_buffer),
            ("default_slippage_pct", self.default_slippage_pct),
        ] {
            if value.is_sign_negative() || value >= Decimal::ONE {
                return Err(FiatError::Validation(format!(
                    "{} must be in [0, 1), got {}",
                    name, value
                )));
            }
        }
        if self.default_targeted_coll_ratio <= Decimal::ONE {
            return Err(FiatError::Validation(format!(
                "default_targeted_coll_ratio must be greater than 1, got {}",
                self.default_targeted_coll_ratio
            )));
        }
        if self.max_slippage_pct.is_sign_negative() || self.max_slippage_pct > Decimal::ONE_HUNDRED {
            return Err(FiatError::Validation(format!(
                "max_slippage_pct must be in [0, 100], got {}",
                self.max_slippage_pct
            )));
        }
        Ok(())
    }

    pub fn modify_debt_buffer(mut self, value: Decimal) -> Self {
        self.modify_debt_buffer = value;
        self
    }

    pub fn swap_debt_buffer(mut self, value: Decimal) -> Self {
        self.swap_debt_buffer = value;
        self
    }

    pub fn redeem_debt_buffer(mut self, value: Decimal) -> Self {
        self.redeem_debt_buffer = value;
        self
    }

    pub fn dust_threshold(mut self, value: U256) -> Self {
        self.dust_threshold = value;
        self
    }

    pub fn swap_deadline_secs(mut self, secs: u64) -> Self {
        self.swap_deadline_secs = secs;
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn default_slippage_pct(mut self, value: Decimal) -> Self {
        self.default_slippage_pct = value;
        self
    }

    pub fn default_targeted_coll_ratio(mut self, value: Decimal) -> Self {
        self.default_targeted_coll_ratio = value;
        self
    }

    pub fn collateral_type_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.collateral_type_cache_ttl_secs = secs;
        self
    }

    // ─── WAD accessors ───────────────────────────────────────────────────

    pub fn modify_debt_buffer_wad(&self) -> Result<U256, WadError> {
        dec_to_wad(self.modify_debt_buffer)
    }

    pub fn swap_debt_buffer_wad(&self) -> Result<U256, WadError> {
        dec_to_wad(self.swap_debt_buffer)
    }

    pub fn redeem_debt_buffer_wad(&self) -> Result<U256, WadError> {
        dec_to_wad(self.redeem_debt_buffer)
    }

    pub fn default_slippage_wad(&self) -> Result<U256, WadError> {
        dec_to_wad(self.default_slippage_pct)
    }

    pub fn default_targeted_coll_ratio_wad(&self) -> Result<U256, WadError> {
        dec_to_wad(self.default_targeted_coll_ratio)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn collateral_type_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.collateral_type_cache_ttl_secs)
    }
}
