//! Position form domain: per-mode inputs, derived estimates and feedback.

pub mod state;

use std::str::FromStr;

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PositionsConfig;
use crate::domain::collateral_type::CollateralType;
use crate::domain::position::Position;
use crate::error::FiatError;
use crate::shared::wad::{dec_to_scale, dec_to_wad, floor_dp, WadError};

pub use state::{ModifyPositionStore, RecomputeRequest};

// ─── Mode ────────────────────────────────────────────────────────────────────

/// What the user is doing to the selected position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Open a position in a collateral type the user holds nothing in.
    Create,
    #[default]
    Increase,
    Decrease,
    /// Withdraw matured collateral at face value.
    Redeem,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Create, Mode::Increase, Mode::Decrease, Mode::Redeem];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Create => "create",
            Mode::Increase => "increase",
            Mode::Decrease => "decrease",
            Mode::Redeem => "redeem",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── ModeState ───────────────────────────────────────────────────────────────

/// Inputs and derived values for one mode.
///
/// `underlier` is in underlier scale; everything else is WAD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeState {
    pub underlier: U256,
    /// Fraction, `0.001e18` = 0.1%.
    pub slippage_pct: U256,
    pub targeted_coll_ratio: U256,
    pub delta_collateral: U256,
    pub delta_debt: U256,
    pub collateral: U256,
    pub debt: U256,
    pub coll_ratio: U256,
}

impl ModeState {
    pub fn initial(config: &PositionsConfig) -> Result<Self, WadError> {
        Ok(Self {
            underlier: U256::ZERO,
            slippage_pct: config.default_slippage_wad()?,
            targeted_coll_ratio: config.default_targeted_coll_ratio_wad()?,
            delta_collateral: U256::ZERO,
            delta_debt: U256::ZERO,
            collateral: U256::ZERO,
            debt: U256::ZERO,
            coll_ratio: U256::ZERO,
        })
    }
}

// ─── Feedback and status ─────────────────────────────────────────────────────

/// Advisory warnings and blocking errors from the last estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFeedback {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl FormFeedback {
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    pub fn clear(&mut self) {
        self.warnings.clear();
        self.errors.clear();
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormStatus {
    #[default]
    Idle,
    Computing,
    Ready,
    Error,
}

// ─── ModifyPositionData ──────────────────────────────────────────────────────

/// Everything the form needs about the selected collateral type and the
/// user's standing with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyPositionData {
    pub collateral_type: CollateralType,
    pub position: Option<Position>,
    /// Underlier the proxy may pull from the user, in underlier scale.
    pub underlier_allowance: U256,
    pub underlier_balance: U256,
    pub moneta_delegate: bool,
    pub fiat_allowance: U256,
}

impl ModifyPositionData {
    pub fn new(collateral_type: CollateralType, position: Option<Position>) -> Self {
        Self {
            collateral_type,
            position,
            underlier_allowance: U256::ZERO,
            underlier_balance: U256::ZERO,
            moneta_delegate: false,
            fiat_allowance: U256::ZERO,
        }
    }

    /// Fails when the proxy lacks the allowance or delegate `mode` pulls on.
    pub fn ensure_approved(&self, mode: Mode, state: &ModeState) -> Result<(), FiatError> {
        match mode {
            Mode::Create | Mode::Increase => {
                if !self.moneta_delegate {
                    return Err(FiatError::Validation("Moneta delegate is not set".to_string()));
                }
                if !state.underlier.is_zero() && self.underlier_allowance < state.underlier {
                    return Err(FiatError::Validation("Insufficient underlier allowance".to_string()));
                }
            }
            Mode::Decrease | Mode::Redeem => {
                if !state.delta_debt.is_zero() && self.fiat_allowance < state.delta_debt {
                    return Err(FiatError::Validation("Insufficient FIAT allowance".to_string()));
                }
            }
        }
        Ok(())
    }

    /// Existing position, or an empty one.
    pub fn position_or_default(&self) -> Position {
        self.position.clone().unwrap_or_else(|| Position {
            vault: self.collateral_type.properties.vault,
            token_id: self.collateral_type.properties.token_id,
            ..Position::default()
        })
    }
}

// ─── Input parsing ───────────────────────────────────────────────────────────

fn parse_decimal(input: &str) -> Result<Decimal, FiatError> {
    Decimal::from_str(input.trim())
        .map_err(|e| FiatError::Validation(format!("Invalid number `{}`: {}", input, e)))
}

/// Parse a user-entered amount into `scale` units.
///
/// Empty input yields `None` (use the mode default). Negative input yields zero.
pub fn parse_amount_input(input: &str, scale: U256, precision: u32) -> Result<Option<U256>, FiatError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    let value = parse_decimal(input)?.max(Decimal::ZERO);
    Ok(Some(dec_to_scale(floor_dp(value, precision), scale)?))
}

/// Parse a slippage percentage into a WAD fraction, clamped to `[0, max_pct]`.
pub fn parse_slippage_input(input: &str, max_pct: Decimal, precision: u32) -> Result<Option<U256>, FiatError> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    let pct = parse_decimal(input)?.clamp(Decimal::ZERO, max_pct);
    let fraction = floor_dp(pct / Decimal::ONE_HUNDRED, precision);
    Ok(Some(dec_to_wad(fraction)?))
}
