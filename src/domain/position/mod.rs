//! Position domain: collateralized debt positions and their summaries.

pub mod client;
pub mod wire;

use crate::domain::collateral_type::CollateralType;
use crate::shared::wad::{
    compute_collateralization_ratio, interest_per_second_to_apy,
    interest_per_second_to_rate_until_maturity, normal_debt_to_debt, wmul, WadError,
};
use crate::shared::{CollateralTypeId, PositionId};
use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use client::Positions;

// ─── Position ────────────────────────────────────────────────────────────────

/// Collateral and normalized debt held by `owner` in one collateral type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub vault: Address,
    pub token_id: U256,
    pub owner: Address,
    /// WAD.
    pub collateral: U256,
    /// WAD, in normalized units. Multiply by the virtual rate for FIAT.
    pub normal_debt: U256,
}

impl Position {
    pub fn id(&self) -> PositionId {
        PositionId::new(self.vault, self.token_id, self.owner)
    }

    pub fn collateral_type_id(&self) -> CollateralTypeId {
        CollateralTypeId::new(self.vault, self.token_id)
    }

    pub fn is_empty(&self) -> bool {
        self.collateral.is_zero() && self.normal_debt.is_zero()
    }

    /// FIAT debt at the given virtual rate.
    pub fn debt(&self, virtual_rate: U256) -> Result<U256, WadError> {
        normal_debt_to_debt(self.normal_debt, virtual_rate)
    }
}

impl From<wire::PositionResponse> for Position {
    fn from(p: wire::PositionResponse) -> Self {
        Position {
            vault: p.vault,
            token_id: p.token_id,
            owner: p.owner,
            collateral: p.collateral,
            normal_debt: p.normal_debt,
        }
    }
}

// ─── UserData ────────────────────────────────────────────────────────────────

/// An account returned by the SDK: the user itself or one of its proxies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub user: Address,
    pub is_proxy: bool,
    pub positions: Vec<Position>,
}

impl From<wire::UserDataResponse> for UserData {
    fn from(u: wire::UserDataResponse) -> Self {
        UserData {
            user: u.user,
            is_proxy: u.is_proxy,
            positions: u.positions.into_iter().map(Position::from).collect(),
        }
    }
}

/// Addresses of all proxy accounts in a `fetchUserData` result.
pub fn proxies_of(accounts: &[UserData]) -> Vec<Address> {
    accounts
        .iter()
        .filter(|a| a.is_proxy)
        .map(|a| a.user)
        .collect()
}

/// All positions across the user and its proxies.
pub fn positions_of(accounts: &[UserData]) -> Vec<Position> {
    accounts
        .iter()
        .flat_map(|a| a.positions.iter().cloned())
        .collect()
}

// ─── PositionSummary ─────────────────────────────────────────────────────────

/// Derived figures for a positions table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub position: Position,
    pub symbol: Option<String>,
    pub protocol: Option<String>,
    /// FIAT, WAD.
    pub debt: U256,
    /// Fair value of the collateral in FIAT, WAD.
    pub collateral_value: U256,
    /// Debt owed at maturity if nothing is repaid, WAD.
    pub due_at_maturity: U256,
    /// Accumulated borrow-rate factor until maturity (WAD, `>= 1`).
    pub rate_until_maturity: U256,
    pub borrow_apy: U256,
    pub coll_ratio: U256,
    pub maturity: DateTime<Utc>,
    pub days_until_maturity: u64,
}

impl PositionSummary {
    pub fn new(position: &Position, ct: &CollateralType, now: u64) -> Result<Self, WadError> {
        let maturity_secs = ct.properties.maturity;
        let rate_until_maturity =
            interest_per_second_to_rate_until_maturity(ct.interest_per_second, maturity_secs, now)?;
        let maturity = DateTime::<Utc>::from_timestamp(maturity_secs as i64, 0).ok_or_else(|| {
            WadError::Overflow {
                context: format!("maturity {} out of range", maturity_secs),
            }
        })?;
        Ok(PositionSummary {
            position: position.clone(),
            symbol: ct.symbol().map(str::to_string),
            protocol: ct.metadata.as_ref().and_then(|m| m.protocol.clone()),
            debt: position.debt(ct.virtual_rate)?,
            collateral_value: wmul(position.collateral, ct.fair_price)?,
            due_at_maturity: wmul(position.normal_debt, rate_until_maturity)?,
            rate_until_maturity,
            borrow_apy: interest_per_second_to_apy(ct.interest_per_second)?,
            coll_ratio: compute_collateralization_ratio(
                position.collateral,
                ct.fair_price,
                position.normal_debt,
                ct.virtual_rate,
            )?,
            maturity,
            days_until_maturity: maturity_secs.saturating_sub(now) / 86_400,
        })
    }
}
