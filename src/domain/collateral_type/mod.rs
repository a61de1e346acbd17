//! Collateral type domain: vault properties, protocol state, earnable rates.

pub mod client;
mod convert;
pub mod wire;

use crate::shared::wad::{interest_per_second_to_apy, WadError};
use crate::shared::{CollateralTypeId, VaultFamily, VaultType};
use alloy_primitives::{Address, B256, I256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use client::CollateralTypes;

// ─── Per-family data ─────────────────────────────────────────────────────────

/// Element: Balancer pool the principal token trades in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EptData {
    pub balancer_vault: Address,
    pub pool_id: B256,
}

/// Notional: fCash market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcData {
    pub notional: Address,
    pub tenor: U256,
}

/// Yield: YieldSpace pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FyData {
    pub yield_space_pool: Address,
}

/// Sense: adapter and Space pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SptData {
    pub adapter: Address,
    pub maturity: U256,
    pub target: Address,
    pub space_pool: Address,
    pub balancer_vault: Address,
}

/// A vault type resolved together with the data block it needs.
///
/// `Missing` and `Unsupported` are kept as variants so callers have to decide
/// what they mean for their operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultKind<'a> {
    Ept(&'a EptData),
    Fc(&'a FcData),
    Fy(&'a FyData),
    Spt(&'a SptData),
    Missing(VaultFamily),
    Unsupported(&'a str),
}

// ─── Properties ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    pub vault: Address,
    pub token_id: U256,
    pub name: Option<String>,
    pub vault_type: VaultType,
    pub token: Address,
    pub token_scale: U256,
    pub underlier_token: Address,
    pub underlier_scale: U256,
    pub underlier_symbol: Option<String>,
    /// Unix seconds.
    pub maturity: u64,
    pub ept_data: Option<EptData>,
    pub fc_data: Option<FcData>,
    pub fy_data: Option<FyData>,
    pub spt_data: Option<SptData>,
}

impl Properties {
    pub fn vault_kind(&self) -> VaultKind<'_> {
        match &self.vault_type {
            VaultType::Ept => self
                .ept_data
                .as_ref()
                .map_or(VaultKind::Missing(VaultFamily::Ept), VaultKind::Ept),
            VaultType::Fc => self
                .fc_data
                .as_ref()
                .map_or(VaultKind::Missing(VaultFamily::Fc), VaultKind::Fc),
            VaultType::Fy => self
                .fy_data
                .as_ref()
                .map_or(VaultKind::Missing(VaultFamily::Fy), VaultKind::Fy),
            VaultType::Spt => self
                .spt_data
                .as_ref()
                .map_or(VaultKind::Missing(VaultFamily::Spt), VaultKind::Spt),
            VaultType::Unsupported(tag) => VaultKind::Unsupported(tag),
        }
    }
}

// ─── CollateralType ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub protocol: Option<String>,
    pub asset: Option<String>,
    pub symbol: Option<String>,
    pub project_url: Option<String>,
    pub asset_url: Option<String>,
}

/// A validated collateral type snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralType {
    pub properties: Properties,
    pub debt_floor: U256,
    pub debt_ceiling: Option<U256>,
    pub liquidation_ratio: Option<U256>,
    pub virtual_rate: U256,
    pub fair_price: U256,
    pub interest_per_second: U256,
    pub metadata: Option<Metadata>,
    /// Signed WAD yield from swapping one underlier unit now and holding to maturity.
    pub earnable_rate: Option<I256>,
}

impl CollateralType {
    pub fn id(&self) -> CollateralTypeId {
        CollateralTypeId::new(self.properties.vault, self.properties.token_id)
    }

    pub fn vault_kind(&self) -> VaultKind<'_> {
        self.properties.vault_kind()
    }

    pub fn is_matured(&self, now: u64) -> bool {
        self.properties.maturity <= now
    }

    /// Annualized borrow rate.
    pub fn borrow_apy(&self) -> Result<U256, WadError> {
        interest_per_second_to_apy(self.interest_per_second)
    }

    pub fn symbol(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.symbol.as_deref())
    }
}

// ─── ValidationError ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Multiple(String, Vec<ValidationError>),
    MissingTokenScale,
    MissingUnderlierScale,
    ZeroScale(&'static str),
    MissingVirtualRate,
    MissingFairPrice,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Multiple(id, errors) => {
                writeln!(f, "Collateral type validation errors ({id}):")?;
                for err in errors {
                    writeln!(f, "  - {}", err)?;
                }
                Ok(())
            }
            ValidationError::MissingTokenScale => write!(f, "Missing token scale"),
            ValidationError::MissingUnderlierScale => write!(f, "Missing underlier scale"),
            ValidationError::ZeroScale(field) => write!(f, "Zero {}", field),
            ValidationError::MissingVirtualRate => write!(f, "Missing virtual rate"),
            ValidationError::MissingFairPrice => write!(f, "Missing fair price"),
        }
    }
}

impl std::error::Error for ValidationError {}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_kind_resolves_data() {
        let mut ct = fixtures::collateral_type(VaultType::Fy);
        assert!(matches!(ct.vault_kind(), VaultKind::Fy(_)));
        ct.properties.fy_data = None;
        assert_eq!(ct.vault_kind(), VaultKind::Missing(VaultFamily::Fy));
    }

    #[test]
    fn test_vault_kind_unsupported() {
        let ct = fixtures::collateral_type(VaultType::from_tag("ERC20:XYZ"));
        assert_eq!(ct.vault_kind(), VaultKind::Unsupported("ERC20:XYZ"));
    }

    #[test]
    fn test_is_matured() {
        let ct = fixtures::collateral_type(VaultType::Ept);
        assert!(!ct.is_matured(1_999_999_999));
        assert!(ct.is_matured(2_000_000_000));
    }
}
