//! Shared fixtures for integration tests.

#![allow(dead_code)]

use alloy_primitives::{Address, U256};
use fiat_positions::domain::collateral_type::wire::CollateralTypeResponse;
use fiat_positions::domain::position::wire::UserDataResponse;
use fiat_positions::error::SdkError;
use fiat_positions::sdk::mock::MockSdk;
use fiat_positions::sdk::{CallOutput, Contracts};
use fiat_positions::shared::wad::parse_wad;
use fiat_positions::vault::constants::{FY_TOKEN_TO_UNDERLIER, UNDERLIER_TO_FY_TOKEN};
use fiat_positions::vault::ContractCall;

pub const USER: Address = Address::repeat_byte(0x0a);
pub const PROXY: Address = Address::repeat_byte(0x0b);
pub const UNDERLIER: Address = Address::repeat_byte(0x90);
pub const MATURITY: u64 = 2_000_000_000;

pub fn addr(byte: u8) -> String {
    format!("0x{}", format!("{:02x}", byte).repeat(20))
}

pub fn wad(s: &str) -> U256 {
    parse_wad(s).unwrap()
}

pub fn usdc(units: u64) -> U256 {
    U256::from(units) * U256::from(1_000_000u64)
}

pub fn contracts() -> Contracts {
    Contracts {
        vault_ept_actions: Address::repeat_byte(0xe1),
        vault_fc_actions: Address::repeat_byte(0xe2),
        vault_fy_actions: Address::repeat_byte(0xe3),
        vault_spt_actions: Address::repeat_byte(0xe4),
        proxy_registry: Address::repeat_byte(0xe5),
        codex: Address::repeat_byte(0xe6),
        moneta: Address::repeat_byte(0xe7),
        fiat: Address::repeat_byte(0xe8),
    }
}

/// A Yield FY collateral type: 6 decimal token and underlier, 1 FIAT debt floor.
pub fn fy_collateral_type(vault: u8, maturity: u64, with_metadata: bool) -> CollateralTypeResponse {
    let mut json = serde_json::json!({
        "properties": {
            "vault": addr(vault),
            "tokenId": "0",
            "name": "VaultFYUSDC",
            "vaultType": "ERC20:FY",
            "token": addr(vault.wrapping_add(1)),
            "tokenScale": "1000000",
            "underlierToken": addr(0x90),
            "underlierScale": "1000000",
            "underlierSymbol": "USDC",
            "maturity": maturity,
            "fyData": { "yieldSpacePool": addr(vault.wrapping_add(2)) }
        },
        "settings": { "codex": { "debtFloor": "1000000000000000000" } },
        "state": {
            "codex": { "virtualRate": "1000000000000000000" },
            "collybus": { "fairPrice": "1000000000000000000" },
            "publican": { "interestPerSecond": "1000000000000000000" }
        }
    });
    if with_metadata {
        json["metadata"] = serde_json::json!({ "protocol": "Yield", "asset": "USDC", "symbol": "fyUSDC" });
    }
    serde_json::from_value(json).unwrap()
}

pub fn user_data(user: Address, is_proxy: bool, positions: serde_json::Value) -> UserDataResponse {
    serde_json::from_value(serde_json::json!({
        "user": user,
        "isProxy": is_proxy,
        "positions": positions,
    }))
    .unwrap()
}

/// Quotes `underlier * (1 + premium_bps / 10_000)` collateral for underlier
/// and 1:1 underlier for collateral, echoing the amount argument.
pub fn quotes(premium_bps: u64) -> impl Fn(&ContractCall) -> Option<Result<CallOutput, SdkError>> + Send + Sync {
    move |call| {
        let amount = call.arg(0).and_then(|a| a.as_uint())?;
        if call.method == UNDERLIER_TO_FY_TOKEN {
            let out = amount * U256::from(10_000 + premium_bps) / U256::from(10_000u64);
            return Some(Ok(CallOutput::Uint(out)));
        }
        if call.method == FY_TOKEN_TO_UNDERLIER {
            return Some(Ok(CallOutput::Uint(amount)));
        }
        None
    }
}

pub fn mock_sdk() -> MockSdk {
    MockSdk::new().with_contracts(contracts())
}
