//! The protocol SDK seam.
//!
//! Chain transport, signing and subgraph queries live behind [`FiatSdk`].
//! This crate only builds [`ContractCall`]s and interprets results, so any
//! implementation (an ethers/alloy provider, a JSON-RPC bridge, or
//! [`mock::MockSdk`] in tests) can drive it.

pub mod mock;

use alloy_primitives::{Address, B256, I256, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::collateral_type::wire::CollateralTypeResponse;
use crate::domain::position::wire::UserDataResponse;
use crate::error::SdkError;
use crate::shared::CollateralTypeId;
use crate::vault::{Contract, ContractCall};

// ─── Contracts ───────────────────────────────────────────────────────────────

/// Deployed protocol contract addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contracts {
    pub vault_ept_actions: Address,
    pub vault_fc_actions: Address,
    pub vault_fy_actions: Address,
    pub vault_spt_actions: Address,
    pub proxy_registry: Address,
    pub codex: Address,
    pub moneta: Address,
    pub fiat: Address,
}

impl Contracts {
    /// Address of a fixed protocol contract. `Erc20` has no fixed address.
    pub fn address_of(&self, contract: Contract) -> Option<Address> {
        match contract {
            Contract::VaultEptActions => Some(self.vault_ept_actions),
            Contract::VaultFcActions => Some(self.vault_fc_actions),
            Contract::VaultFyActions => Some(self.vault_fy_actions),
            Contract::VaultSptActions => Some(self.vault_spt_actions),
            Contract::ProxyRegistry => Some(self.proxy_registry),
            Contract::Codex => Some(self.codex),
            Contract::Moneta => Some(self.moneta),
            Contract::Fiat => Some(self.fiat),
            Contract::Erc20 => None,
        }
    }
}

// ─── CallOutput ──────────────────────────────────────────────────────────────

/// Decoded return value of a read-only call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CallOutput {
    Uint(U256),
    Int(I256),
    Bool(bool),
    Address(Address),
}

impl CallOutput {
    pub fn as_uint(&self) -> Result<U256, SdkError> {
        match self {
            Self::Uint(v) => Ok(*v),
            other => Err(SdkError::Decode(format!("expected uint, got {:?}", other))),
        }
    }

    pub fn as_bool(&self) -> Result<bool, SdkError> {
        match self {
            Self::Bool(v) => Ok(*v),
            other => Err(SdkError::Decode(format!("expected bool, got {:?}", other))),
        }
    }

    pub fn as_address(&self) -> Result<Address, SdkError> {
        match self {
            Self::Address(v) => Ok(*v),
            other => Err(SdkError::Decode(format!("expected address, got {:?}", other))),
        }
    }
}

// ─── TransactionReceipt ──────────────────────────────────────────────────────

/// Receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default = "default_status")]
    pub status: bool,
}

fn default_status() -> bool {
    true
}

// ─── FiatSdk ─────────────────────────────────────────────────────────────────

/// Operations this crate needs from the protocol SDK.
#[async_trait]
pub trait FiatSdk: Send + Sync {
    fn contracts(&self) -> &Contracts;

    /// Collateral types with current prices. An empty `ids` slice means all.
    async fn fetch_collateral_types_and_prices(
        &self,
        ids: &[CollateralTypeId],
    ) -> Result<Vec<CollateralTypeResponse>, SdkError>;

    /// The user account and its proxies, each with their positions.
    async fn fetch_user_data(&self, user: Address) -> Result<Vec<UserDataResponse>, SdkError>;

    /// Read-only call.
    async fn call(&self, call: &ContractCall) -> Result<CallOutput, SdkError>;

    /// Batched read-only calls; results are in request order.
    async fn multicall(&self, calls: &[ContractCall]) -> Result<Vec<CallOutput>, SdkError>;

    /// Simulate a state-changing call without broadcasting it.
    async fn dryrun(&self, call: &ContractCall) -> Result<serde_json::Value, SdkError>;

    /// Sign, broadcast and wait for a state-changing call to be mined.
    async fn send_and_wait(&self, call: &ContractCall) -> Result<TransactionReceipt, SdkError>;
}
