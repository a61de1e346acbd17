//! Argument builders for the per-family vault actions contracts.
//!
//! Each builder resolves the collateral type's [`VaultKind`], computes the
//! buffered normalized debt delta and lays out the positional arguments the
//! actions contract expects. The returned call is routed through the user's
//! proxy.

use alloy_primitives::{Address, I256, U256};

use super::constants::{
    BUY_COLLATERAL_AND_MODIFY_DEBT, MODIFY_COLLATERAL_AND_DEBT, REDEEM_COLLATERAL_AND_MODIFY_DEBT,
    SELL_COLLATERAL_AND_MODIFY_DEBT,
};
use super::{ActionContext, CallArg, Contract, ContractCall};
use crate::domain::collateral_type::{CollateralType, VaultKind};
use crate::domain::position::Position;
use crate::error::DispatchError;
use crate::shared::VaultType;
use crate::shared::wad::{
    apply_discount, debt_to_normal_debt, mul_div, scale_to_wad, to_signed, wad_to_scale, WAD,
};

/// Actions contract for the collateral type's family.
///
/// Only the tag matters here; a missing data block is not an error.
pub(crate) fn actions_contract(
    ctx: &ActionContext<'_>,
    ct: &CollateralType,
) -> Result<(Contract, Address), DispatchError> {
    let contracts = ctx.contracts;
    match &ct.properties.vault_type {
        VaultType::Ept => Ok((Contract::VaultEptActions, contracts.vault_ept_actions)),
        VaultType::Fc => Ok((Contract::VaultFcActions, contracts.vault_fc_actions)),
        VaultType::Fy => Ok((Contract::VaultFyActions, contracts.vault_fy_actions)),
        VaultType::Spt => Ok((Contract::VaultSptActions, contracts.vault_spt_actions)),
        VaultType::Unsupported(tag) => {
            Err(DispatchError::UnsupportedVaultType(tag.clone()))
        }
    }
}

/// `debt / rate`, shaved by `buffer`.
fn buffered_normal_debt(debt: U256, virtual_rate: U256, buffer: U256) -> Result<U256, DispatchError> {
    Ok(apply_discount(debt_to_normal_debt(debt, virtual_rate)?, buffer)?)
}

/// Normal debt to repay: the requested amount, or everything if what would
/// remain is dust.
fn clamp_repayment(
    normal_debt: U256,
    position: &Position,
    dust: U256,
) -> Result<I256, DispatchError> {
    let remaining_is_dust = position
        .normal_debt
        .checked_sub(normal_debt)
        .map_or(true, |remaining| remaining < dust);
    let repay = if remaining_is_dust {
        position.normal_debt
    } else {
        normal_debt
    };
    Ok(-to_signed(repay)?)
}

// ─── modify ──────────────────────────────────────────────────────────────────

/// Change debt only, through the family's generic `modifyCollateralAndDebt`.
///
/// `delta_debt` is signed FIAT: positive borrows, negative repays. If the
/// resulting normal debt would fall below the dust threshold the whole
/// position debt is repaid instead.
pub fn build_modify_collateral_and_debt_args(
    ctx: &ActionContext<'_>,
    ct: &CollateralType,
    delta_debt: I256,
    position: Option<&Position>,
) -> Result<ContractCall, DispatchError> {
    let (contract, address) = actions_contract(ctx, ct)?;
    let proxy = ctx.require_proxy()?;
    let props = &ct.properties;
    let buffer = ctx.config.modify_debt_buffer_wad()?;
    let current = to_signed(position.map_or(U256::ZERO, |p| p.normal_debt))?;

    let magnitude = buffered_normal_debt(delta_debt.unsigned_abs(), ct.virtual_rate, buffer)?;
    let mut delta_normal_debt = to_signed(magnitude)?;
    if delta_debt.is_negative() {
        delta_normal_debt = -delta_normal_debt;
    }
    if current.saturating_add(delta_normal_debt) < to_signed(ctx.config.dust_threshold)? {
        delta_normal_debt = -current;
    }

    let args = vec![
        props.vault.into(),
        props.token.into(),
        props.token_id.into(),
        proxy.into(),
        ctx.user.into(),
        ctx.user.into(),
        CallArg::Int(I256::ZERO),
        delta_normal_debt.into(),
    ];
    Ok(ContractCall::new(contract, address, MODIFY_COLLATERAL_AND_DEBT, args).via_proxy(proxy))
}

// ─── buy ─────────────────────────────────────────────────────────────────────

/// Swap `underlier` for `delta_collateral` (WAD) of collateral token, deposit
/// it and borrow `delta_debt` FIAT.
pub fn build_buy_collateral_and_modify_debt_args(
    ctx: &ActionContext<'_>,
    ct: &CollateralType,
    delta_collateral: U256,
    delta_debt: U256,
    underlier: U256,
) -> Result<ContractCall, DispatchError> {
    if delta_collateral.is_zero() {
        return Err(DispatchError::InvalidDeltaCollateral);
    }
    let (contract, address) = actions_contract(ctx, ct)?;
    let props = &ct.properties;
    let proxy = ctx.require_proxy()?;
    let buffer = ctx.config.swap_debt_buffer_wad()?;
    let delta_normal_debt =
        CallArg::Int(to_signed(buffered_normal_debt(delta_debt, ct.virtual_rate, buffer)?)?);
    let token_amount = wad_to_scale(delta_collateral, props.token_scale)?;

    let args = match props.vault_kind() {
        VaultKind::Ept(ept) => {
            let deadline = ctx.now + ctx.config.swap_deadline_secs;
            vec![
                props.vault.into(),
                proxy.into(),
                ctx.user.into(),
                ctx.user.into(),
                underlier.into(),
                delta_normal_debt,
                CallArg::Tuple(vec![
                    ept.balancer_vault.into(),
                    ept.pool_id.into(),
                    props.underlier_token.into(),
                    props.token.into(),
                    token_amount.into(),
                    deadline.into(),
                    underlier.into(),
                ]),
            ]
        }
        VaultKind::Fc(_) => {
            // 1 - underlier / deltaCollateral
            let price = mul_div(
                scale_to_wad(underlier, props.underlier_scale)?,
                WAD,
                delta_collateral,
            )?;
            let rate = WAD
                .checked_sub(price)
                .ok_or(DispatchError::NegativeRate { field: "minLendRate" })?;
            let min_lend_rate = wad_to_scale(rate, props.token_scale)?;
            vec![
                props.vault.into(),
                props.token.into(),
                props.token_id.into(),
                proxy.into(),
                ctx.user.into(),
                ctx.user.into(),
                token_amount.into(),
                delta_normal_debt,
                min_lend_rate.into(),
                underlier.into(),
            ]
        }
        VaultKind::Fy(fy) => vec![
            props.vault.into(),
            proxy.into(),
            ctx.user.into(),
            ctx.user.into(),
            underlier.into(),
            delta_normal_debt,
            CallArg::Tuple(vec![
                token_amount.into(),
                fy.yield_space_pool.into(),
                props.underlier_token.into(),
                props.token.into(),
            ]),
        ],
        VaultKind::Spt(spt) => vec![
            props.vault.into(),
            proxy.into(),
            ctx.user.into(),
            ctx.user.into(),
            underlier.into(),
            delta_normal_debt,
            CallArg::Tuple(vec![
                spt.adapter.into(),
                token_amount.into(),
                spt.maturity.into(),
                props.underlier_token.into(),
                props.token.into(),
                underlier.into(),
            ]),
        ],
        VaultKind::Missing(family) => return Err(DispatchError::MissingVaultData(family)),
        VaultKind::Unsupported(tag) => {
            return Err(DispatchError::UnsupportedVaultType(tag.to_string()))
        }
    };
    Ok(ContractCall::new(contract, address, BUY_COLLATERAL_AND_MODIFY_DEBT, args).via_proxy(proxy))
}

// ─── sell ────────────────────────────────────────────────────────────────────

/// Withdraw `delta_collateral` (WAD), swap it for at least `underlier` and
/// repay `delta_debt` FIAT.
pub fn build_sell_collateral_and_modify_debt_args(
    ctx: &ActionContext<'_>,
    ct: &CollateralType,
    delta_collateral: U256,
    delta_debt: U256,
    underlier: U256,
    position: &Position,
) -> Result<ContractCall, DispatchError> {
    if delta_collateral.is_zero() {
        return Err(DispatchError::InvalidDeltaCollateral);
    }
    let (contract, address) = actions_contract(ctx, ct)?;
    let props = &ct.properties;
    let proxy = ctx.require_proxy()?;
    let buffer = ctx.config.swap_debt_buffer_wad()?;
    let normal_debt = buffered_normal_debt(delta_debt, ct.virtual_rate, buffer)?;
    let delta_normal_debt =
        CallArg::Int(clamp_repayment(normal_debt, position, ctx.config.dust_threshold)?);
    let token_amount = wad_to_scale(delta_collateral, props.token_scale)?;

    let args = match props.vault_kind() {
        VaultKind::Ept(ept) => {
            let deadline = ctx.now + ctx.config.swap_deadline_secs;
            vec![
                props.vault.into(),
                proxy.into(),
                ctx.user.into(),
                ctx.user.into(),
                token_amount.into(),
                delta_normal_debt,
                CallArg::Tuple(vec![
                    ept.balancer_vault.into(),
                    ept.pool_id.into(),
                    props.token.into(),
                    props.underlier_token.into(),
                    underlier.into(),
                    deadline.into(),
                    token_amount.into(),
                ]),
            ]
        }
        VaultKind::Fc(_) => {
            // deltaCollateral / underlier - 1
            let ratio = mul_div(
                delta_collateral,
                WAD,
                scale_to_wad(underlier, props.underlier_scale)?,
            )?;
            let rate = ratio
                .checked_sub(WAD)
                .ok_or(DispatchError::NegativeRate { field: "maxBorrowRate" })?;
            let max_borrow_rate = wad_to_scale(rate, props.token_scale)?;
            vec![
                props.vault.into(),
                props.token.into(),
                props.token_id.into(),
                proxy.into(),
                ctx.user.into(),
                ctx.user.into(),
                token_amount.into(),
                delta_normal_debt,
                max_borrow_rate.into(),
            ]
        }
        VaultKind::Fy(fy) => vec![
            props.vault.into(),
            proxy.into(),
            ctx.user.into(),
            ctx.user.into(),
            token_amount.into(),
            delta_normal_debt,
            CallArg::Tuple(vec![
                underlier.into(),
                fy.yield_space_pool.into(),
                props.token.into(),
                props.underlier_token.into(),
            ]),
        ],
        VaultKind::Spt(spt) => vec![
            props.vault.into(),
            proxy.into(),
            ctx.user.into(),
            ctx.user.into(),
            token_amount.into(),
            delta_normal_debt,
            CallArg::Tuple(vec![
                spt.adapter.into(),
                underlier.into(),
                spt.maturity.into(),
                props.token.into(),
                props.underlier_token.into(),
                token_amount.into(),
            ]),
        ],
        VaultKind::Missing(family) => return Err(DispatchError::MissingVaultData(family)),
        VaultKind::Unsupported(tag) => {
            return Err(DispatchError::UnsupportedVaultType(tag.to_string()))
        }
    };
    Ok(ContractCall::new(contract, address, SELL_COLLATERAL_AND_MODIFY_DEBT, args).via_proxy(proxy))
}

// ─── redeem ──────────────────────────────────────────────────────────────────

/// Redeem matured collateral for underlier and repay `delta_debt` FIAT.
pub fn build_redeem_collateral_and_modify_debt_args(
    ctx: &ActionContext<'_>,
    ct: &CollateralType,
    delta_collateral: U256,
    delta_debt: U256,
    position: &Position,
) -> Result<ContractCall, DispatchError> {
    let (contract, address) = actions_contract(ctx, ct)?;
    let props = &ct.properties;
    let proxy = ctx.require_proxy()?;
    let buffer = ctx.config.redeem_debt_buffer_wad()?;
    let normal_debt = buffered_normal_debt(delta_debt, ct.virtual_rate, buffer)?;
    let delta_normal_debt =
        CallArg::Int(clamp_repayment(normal_debt, position, ctx.config.dust_threshold)?);
    let token_amount = wad_to_scale(delta_collateral, props.token_scale)?;

    let args = match props.vault_kind() {
        VaultKind::Ept(_) | VaultKind::Fy(_) => vec![
            props.vault.into(),
            props.token.into(),
            proxy.into(),
            ctx.user.into(),
            ctx.user.into(),
            token_amount.into(),
            delta_normal_debt,
        ],
        VaultKind::Fc(_) => vec![
            props.vault.into(),
            props.token.into(),
            props.token_id.into(),
            proxy.into(),
            ctx.user.into(),
            ctx.user.into(),
            token_amount.into(),
            delta_normal_debt,
        ],
        VaultKind::Spt(spt) => vec![
            props.vault.into(),
            props.token.into(),
            proxy.into(),
            ctx.user.into(),
            ctx.user.into(),
            token_amount.into(),
            delta_normal_debt,
            CallArg::Tuple(vec![
                spt.adapter.into(),
                spt.maturity.into(),
                spt.target.into(),
                props.underlier_token.into(),
                token_amount.into(),
            ]),
        ],
        VaultKind::Missing(family) => return Err(DispatchError::MissingVaultData(family)),
        VaultKind::Unsupported(tag) => {
            return Err(DispatchError::UnsupportedVaultType(tag.to_string()))
        }
    };
    Ok(ContractCall::new(contract, address, REDEEM_COLLATERAL_AND_MODIFY_DEBT, args).via_proxy(proxy))
}
