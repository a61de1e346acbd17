//! Proxy deployment, token allowances and Moneta delegation.
//!
//! A position is always managed through the user's proxy, which needs the
//! underlier and FIAT allowances plus a Codex delegate for Moneta before it
//! can swap, borrow or repay on the user's behalf.

use alloy_primitives::{Address, U256};

use super::constants::{
    ALLOWANCE, APPROVE, BALANCE_OF, DELEGATES, DEPLOY_FOR, GET_CURRENT_PROXY, GRANT_DELEGATE,
    REVOKE_DELEGATE,
};
use super::{Contract, ContractCall};
use crate::domain::collateral_type::CollateralType;
use crate::sdk::Contracts;
use crate::shared::wad::WAD;

/// Deploy a proxy for `user` through the proxy registry.
pub fn deploy_proxy_call(contracts: &Contracts, user: Address) -> ContractCall {
    ContractCall::new(
        Contract::ProxyRegistry,
        contracts.proxy_registry,
        DEPLOY_FOR,
        vec![user.into()],
    )
}

/// Read the proxy currently registered for `user`.
pub fn current_proxy_call(contracts: &Contracts, user: Address) -> ContractCall {
    ContractCall::new(
        Contract::ProxyRegistry,
        contracts.proxy_registry,
        GET_CURRENT_PROXY,
        vec![user.into()],
    )
}

/// Approve the proxy for `underlier` plus one whole unit of headroom.
pub fn set_underlier_allowance_call(ct: &CollateralType, proxy: Address, underlier: U256) -> ContractCall {
    let amount = underlier.saturating_add(ct.properties.underlier_scale);
    ContractCall::new(
        Contract::Erc20,
        ct.properties.underlier_token,
        APPROVE,
        vec![proxy.into(), amount.into()],
    )
}

pub fn unset_underlier_allowance_call(ct: &CollateralType, proxy: Address) -> ContractCall {
    ContractCall::new(
        Contract::Erc20,
        ct.properties.underlier_token,
        APPROVE,
        vec![proxy.into(), U256::ZERO.into()],
    )
}

/// Approve the proxy for `delta_debt` FIAT plus one FIAT of headroom.
pub fn set_fiat_allowance_call(contracts: &Contracts, proxy: Address, delta_debt: U256) -> ContractCall {
    ContractCall::new(
        Contract::Fiat,
        contracts.fiat,
        APPROVE,
        vec![proxy.into(), delta_debt.saturating_add(WAD).into()],
    )
}

pub fn unset_fiat_allowance_call(contracts: &Contracts, proxy: Address) -> ContractCall {
    ContractCall::new(
        Contract::Fiat,
        contracts.fiat,
        APPROVE,
        vec![proxy.into(), U256::ZERO.into()],
    )
}

/// Let Moneta move FIAT out of the Codex on the caller's behalf.
pub fn set_moneta_delegate_call(contracts: &Contracts) -> ContractCall {
    ContractCall::new(
        Contract::Codex,
        contracts.codex,
        GRANT_DELEGATE,
        vec![contracts.moneta.into()],
    )
}

pub fn unset_moneta_delegate_call(contracts: &Contracts) -> ContractCall {
    ContractCall::new(
        Contract::Codex,
        contracts.codex,
        REVOKE_DELEGATE,
        vec![contracts.moneta.into()],
    )
}

/// The four reads populating a position form when the user has a proxy, in
/// order: underlier allowance, underlier balance, Moneta delegation, FIAT allowance.
pub fn modify_position_data_calls(
    contracts: &Contracts,
    ct: &CollateralType,
    user: Address,
    proxy: Address,
) -> [ContractCall; 4] {
    let underlier = ct.properties.underlier_token;
    [
        ContractCall::new(Contract::Erc20, underlier, ALLOWANCE, vec![user.into(), proxy.into()]),
        ContractCall::new(Contract::Erc20, underlier, BALANCE_OF, vec![user.into()]),
        ContractCall::new(
            Contract::Codex,
            contracts.codex,
            DELEGATES,
            vec![proxy.into(), contracts.moneta.into()],
        ),
        ContractCall::new(Contract::Fiat, contracts.fiat, ALLOWANCE, vec![user.into(), proxy.into()]),
    ]
}

/// FIAT balance of `user`.
pub fn fiat_balance_call(contracts: &Contracts, user: Address) -> ContractCall {
    ContractCall::new(Contract::Fiat, contracts.fiat, BALANCE_OF, vec![user.into()])
}
