//! Shared newtypes and utilities used across all domain modules.
//!
//! These types serialize identically to the shapes the protocol SDK returns,
//! so they can be used directly in wire types without conversion overhead.

pub mod fmt;
pub mod serde_util;
pub mod wad;

pub use wad::{WadError, INFINITE_RATIO, WAD};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

// ─── CollateralTypeId ────────────────────────────────────────────────────────

/// Identifier of a collateral type: `"{vault}-{token_id}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollateralTypeId {
    pub vault: Address,
    pub token_id: U256,
}

impl CollateralTypeId {
    pub fn new(vault: Address, token_id: U256) -> Self {
        Self { vault, token_id }
    }
}

impl std::fmt::Display for CollateralTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.vault, self.token_id)
    }
}

impl FromStr for CollateralTypeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (vault, token_id) = s
            .split_once('-')
            .ok_or_else(|| format!("invalid collateral type id '{}'", s))?;
        Ok(Self {
            vault: Address::from_str(vault).map_err(|e| e.to_string())?,
            token_id: U256::from_str(token_id).map_err(|e| e.to_string())?,
        })
    }
}

impl Serialize for CollateralTypeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CollateralTypeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CollateralTypeId::from_str(&s).map_err(serde::de::Error::custom)
    }
}

// ─── PositionId ──────────────────────────────────────────────────────────────

/// Identifier of a position: `"{vault}-{token_id}-{owner}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionId {
    pub vault: Address,
    pub token_id: U256,
    pub owner: Address,
}

impl PositionId {
    pub fn new(vault: Address, token_id: U256, owner: Address) -> Self {
        Self {
            vault,
            token_id,
            owner,
        }
    }

    pub fn collateral_type_id(&self) -> CollateralTypeId {
        CollateralTypeId::new(self.vault, self.token_id)
    }
}

impl std::fmt::Display for PositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.vault, self.token_id, self.owner)
    }
}

impl FromStr for PositionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(vault), Some(token_id), Some(owner)) => Ok(Self {
                vault: Address::from_str(vault).map_err(|e| e.to_string())?,
                token_id: U256::from_str(token_id).map_err(|e| e.to_string())?,
                owner: Address::from_str(owner).map_err(|e| e.to_string())?,
            }),
            _ => Err(format!("invalid position id '{}'", s)),
        }
    }
}

// ─── VaultType ───────────────────────────────────────────────────────────────

/// Vault type tag, e.g. `"ERC20:EPT"`.
///
/// Unknown tags survive deserialization as [`VaultType::Unsupported`] so a
/// single exotic vault does not poison a whole collateral-type listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VaultType {
    /// Element principal tokens.
    Ept,
    /// Notional fCash.
    Fc,
    /// Yield fyTokens.
    Fy,
    /// Sense principal tokens.
    Spt,
    Unsupported(String),
}

impl VaultType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ept => "ERC20:EPT",
            Self::Fc => "ERC1155:FC",
            Self::Fy => "ERC20:FY",
            Self::Spt => "ERC20:SPT",
            Self::Unsupported(tag) => tag,
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ERC20:EPT" => Self::Ept,
            "ERC1155:FC" => Self::Fc,
            "ERC20:FY" => Self::Fy,
            "ERC20:SPT" => Self::Spt,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// The protocol family, or `None` for unsupported tags.
    pub fn family(&self) -> Option<VaultFamily> {
        match self {
            Self::Ept => Some(VaultFamily::Ept),
            Self::Fc => Some(VaultFamily::Fc),
            Self::Fy => Some(VaultFamily::Fy),
            Self::Spt => Some(VaultFamily::Spt),
            Self::Unsupported(_) => None,
        }
    }
}

impl std::fmt::Display for VaultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VaultType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VaultType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(VaultType::from_tag(&s))
    }
}

// ─── VaultFamily ─────────────────────────────────────────────────────────────

/// Supported vault families, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VaultFamily {
    Ept,
    Fc,
    Fy,
    Spt,
}

impl std::fmt::Display for VaultFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VaultFamily::Ept => write!(f, "EPT"),
            VaultFamily::Fc => write!(f, "FC"),
            VaultFamily::Fy => write!(f, "FY"),
            VaultFamily::Spt => write!(f, "SPT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_vault_type_tags() {
        for tag in ["ERC20:EPT", "ERC1155:FC", "ERC20:FY", "ERC20:SPT"] {
            assert_eq!(VaultType::from_tag(tag).as_str(), tag);
        }
        let unknown = VaultType::from_tag("ERC721:XYZ");
        assert_eq!(unknown, VaultType::Unsupported("ERC721:XYZ".to_string()));
        assert_eq!(unknown.family(), None);
    }

    #[test]
    fn test_vault_type_serde() {
        let vt: VaultType = serde_json::from_str("\"ERC1155:FC\"").unwrap();
        assert_eq!(vt, VaultType::Fc);
        assert_eq!(serde_json::to_string(&VaultType::Spt).unwrap(), "\"ERC20:SPT\"");
    }

    #[test]
    fn test_position_id_parse() {
        let vault = address!("0x1111111111111111111111111111111111111111");
        let owner = address!("0x2222222222222222222222222222222222222222");
        let id = PositionId::new(vault, U256::from(7u8), owner);
        let parsed: PositionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.collateral_type_id().to_string(), format!("{}-7", vault));
    }

    #[test]
    fn test_collateral_type_id_rejects_garbage() {
        assert!("nodash".parse::<CollateralTypeId>().is_err());
        assert!("0xzz-1".parse::<CollateralTypeId>().is_err());
    }
}
