//! Vault dispatcher: turns a collateral type plus user intent into a
//! [`ContractCall`] the SDK can dry-run or submit.
//!
//! Everything here is pure. Builders never touch the network; the async
//! helpers in [`previews`] only forward a built call to a [`FiatSdk`].
//!
//! [`FiatSdk`]: crate::sdk::FiatSdk

pub mod actions;
pub mod approvals;
pub mod constants;
pub mod plan;
pub mod previews;

pub use actions::{
    build_buy_collateral_and_modify_debt_args, build_modify_collateral_and_debt_args,
    build_redeem_collateral_and_modify_debt_args, build_sell_collateral_and_modify_debt_args,
};
pub use plan::{plan_submission, PlannedSubmission};

use alloy_primitives::{Address, B256, I256, U256};
use serde::{Deserialize, Serialize};

use crate::config::PositionsConfig;
use crate::sdk::Contracts;

// ─── Contract ────────────────────────────────────────────────────────────────

/// Logical contract a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Contract {
    VaultEptActions,
    VaultFcActions,
    VaultFyActions,
    VaultSptActions,
    ProxyRegistry,
    Codex,
    Moneta,
    Fiat,
    /// An arbitrary ERC-20, e.g. a collateral type's underlier.
    Erc20,
}

// ─── CallArg ─────────────────────────────────────────────────────────────────

/// One positional ABI argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CallArg {
    Address(Address),
    Uint(U256),
    Int(I256),
    Bytes32(B256),
    Tuple(Vec<CallArg>),
}

impl CallArg {
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[CallArg]> {
        match self {
            Self::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Address> for CallArg {
    fn from(v: Address) -> Self {
        Self::Address(v)
    }
}

impl From<U256> for CallArg {
    fn from(v: U256) -> Self {
        Self::Uint(v)
    }
}

impl From<I256> for CallArg {
    fn from(v: I256) -> Self {
        Self::Int(v)
    }
}

impl From<B256> for CallArg {
    fn from(v: B256) -> Self {
        Self::Bytes32(v)
    }
}

impl From<u64> for CallArg {
    fn from(v: u64) -> Self {
        Self::Uint(U256::from(v))
    }
}

// ─── ContractCall ────────────────────────────────────────────────────────────

/// A fully assembled contract invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCall {
    pub contract: Contract,
    pub address: Address,
    pub method: String,
    pub args: Vec<CallArg>,
    /// Execute through this proxy instead of calling the contract directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_proxy: Option<Address>,
}

impl ContractCall {
    pub fn new(contract: Contract, address: Address, method: &str, args: Vec<CallArg>) -> Self {
        Self {
            contract,
            address,
            method: method.to_string(),
            args,
            via_proxy: None,
        }
    }

    pub fn via_proxy(mut self, proxy: Address) -> Self {
        self.via_proxy = Some(proxy);
        self
    }

    pub fn arg(&self, index: usize) -> Option<&CallArg> {
        self.args.get(index)
    }
}

// ─── ActionContext ───────────────────────────────────────────────────────────

/// Everything a builder needs besides the collateral type and amounts.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub contracts: &'a Contracts,
    pub user: Address,
    /// The user's first proxy. Builders that route through it fail without one.
    pub proxy: Option<Address>,
    pub config: &'a PositionsConfig,
    /// Current unix time in seconds.
    pub now: u64,
}

impl<'a> ActionContext<'a> {
    pub fn new(contracts: &'a Contracts, user: Address, config: &'a PositionsConfig, now: u64) -> Self {
        Self {
            contracts,
            user,
            proxy: None,
            config,
            now,
        }
    }

    pub fn with_proxy(mut self, proxy: Address) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub(crate) fn require_proxy(&self) -> Result<Address, crate::error::DispatchError> {
        self.proxy.ok_or(crate::error::DispatchError::MissingProxy)
    }
}
