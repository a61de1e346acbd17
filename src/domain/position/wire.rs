//! Wire types for `fetchUserData`.

use crate::shared::serde_util::u256_dec;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// One account (the user or one of its proxies) and the positions it owns.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserDataResponse {
    pub user: Address,
    #[serde(default)]
    pub is_proxy: bool,
    #[serde(default)]
    pub positions: Vec<PositionResponse>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PositionResponse {
    pub vault: Address,
    #[serde(with = "u256_dec")]
    pub token_id: U256,
    pub owner: Address,
    #[serde(with = "u256_dec")]
    pub collateral: U256,
    #[serde(with = "u256_dec")]
    pub normal_debt: U256,
}
