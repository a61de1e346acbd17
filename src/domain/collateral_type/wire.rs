//! Wire types for collateral types as returned by `fetchCollateralTypesAndPrices`.
//!
//! Mirrors the SDK's nested camelCase layout (`state.codex.virtualRate`).

use crate::shared::serde_util::{u256_dec, u256_dec_opt, unix_secs};
use crate::shared::VaultType;
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// One collateral type with its on-chain state and optional metadata.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CollateralTypeResponse {
    pub properties: PropertiesResponse,
    #[serde(default)]
    pub settings: SettingsResponse,
    pub state: StateResponse,
    #[serde(default)]
    pub metadata: Option<MetadataResponse>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PropertiesResponse {
    pub vault: Address,
    #[serde(with = "u256_dec")]
    pub token_id: U256,
    #[serde(default)]
    pub name: Option<String>,
    pub vault_type: VaultType,
    pub token: Address,
    #[serde(default, with = "u256_dec_opt")]
    pub token_scale: Option<U256>,
    pub underlier_token: Address,
    #[serde(default, with = "u256_dec_opt")]
    pub underlier_scale: Option<U256>,
    #[serde(default)]
    pub underlier_symbol: Option<String>,
    #[serde(with = "unix_secs")]
    pub maturity: u64,
    #[serde(default)]
    pub ept_data: Option<EptDataResponse>,
    #[serde(default)]
    pub fc_data: Option<FcDataResponse>,
    #[serde(default)]
    pub fy_data: Option<FyDataResponse>,
    #[serde(default)]
    pub spt_data: Option<SptDataResponse>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EptDataResponse {
    pub balancer_vault: Address,
    pub pool_id: B256,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FcDataResponse {
    pub notional: Address,
    #[serde(with = "u256_dec")]
    pub tenor: U256,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FyDataResponse {
    pub yield_space_pool: Address,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SptDataResponse {
    pub adapter: Address,
    #[serde(with = "u256_dec")]
    pub maturity: U256,
    pub target: Address,
    pub space_pool: Address,
    pub balancer_vault: Address,
}

// ─── settings ────────────────────────────────────────────────────────────────

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    #[serde(default)]
    pub codex: CodexSettingsResponse,
    #[serde(default)]
    pub collybus: CollybusSettingsResponse,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CodexSettingsResponse {
    #[serde(default, with = "u256_dec_opt")]
    pub debt_ceiling: Option<U256>,
    #[serde(default, with = "u256_dec_opt")]
    pub debt_floor: Option<U256>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CollybusSettingsResponse {
    #[serde(default, with = "u256_dec_opt")]
    pub liquidation_ratio: Option<U256>,
}

// ─── state ───────────────────────────────────────────────────────────────────

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub codex: CodexStateResponse,
    pub collybus: CollybusStateResponse,
    #[serde(default)]
    pub publican: PublicanStateResponse,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CodexStateResponse {
    #[serde(default, with = "u256_dec_opt")]
    pub virtual_rate: Option<U256>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CollybusStateResponse {
    #[serde(default, with = "u256_dec_opt")]
    pub fair_price: Option<U256>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PublicanStateResponse {
    #[serde(default, with = "u256_dec_opt")]
    pub interest_per_second: Option<U256>,
}

// ─── metadata ────────────────────────────────────────────────────────────────

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetadataResponse {
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub urls: Option<MetadataUrlsResponse>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetadataUrlsResponse {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub asset: Option<String>,
}
