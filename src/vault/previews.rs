//! Swap-preview quotes and earnable-rate queries.
//!
//! Quotes are read-only calls on the family's actions contract. The `_call`
//! builders are pure; the async wrappers run them through a [`FiatSdk`].

use alloy_primitives::{I256, U256};
use tracing::{debug, warn};

use super::constants::{
    BALANCER_SUB_OVERFLOW, FCASH_TO_UNDERLIER, FY_TOKEN_TO_UNDERLIER, P_TOKEN_TO_UNDERLIER,
    UNDERLIER_TO_FCASH, UNDERLIER_TO_FY_TOKEN, UNDERLIER_TO_P_TOKEN,
};
use super::{Contract, ContractCall};
use crate::domain::collateral_type::{CollateralType, VaultKind};
use crate::error::{DispatchError, SdkError, SwapDirection, ValuationError};
use crate::sdk::{Contracts, FiatSdk};
use crate::shared::wad::{scale_to_wad, to_signed, WAD};
use crate::shared::CollateralTypeId;

fn quote_call(
    contracts: &Contracts,
    ct: &CollateralType,
    amount: U256,
    direction: SwapDirection,
) -> Result<ContractCall, DispatchError> {
    let props = &ct.properties;
    let to_collateral = direction == SwapDirection::UnderlierToCollateral;
    let call = match props.vault_kind() {
        VaultKind::Ept(ept) => ContractCall::new(
            Contract::VaultEptActions,
            contracts.vault_ept_actions,
            if to_collateral { UNDERLIER_TO_P_TOKEN } else { P_TOKEN_TO_UNDERLIER },
            vec![
                props.vault.into(),
                ept.balancer_vault.into(),
                ept.pool_id.into(),
                amount.into(),
            ],
        ),
        VaultKind::Fc(_) => ContractCall::new(
            Contract::VaultFcActions,
            contracts.vault_fc_actions,
            if to_collateral { UNDERLIER_TO_FCASH } else { FCASH_TO_UNDERLIER },
            vec![props.token_id.into(), amount.into()],
        ),
        VaultKind::Fy(fy) => ContractCall::new(
            Contract::VaultFyActions,
            contracts.vault_fy_actions,
            if to_collateral { UNDERLIER_TO_FY_TOKEN } else { FY_TOKEN_TO_UNDERLIER },
            vec![amount.into(), fy.yield_space_pool.into()],
        ),
        VaultKind::Spt(spt) => ContractCall::new(
            Contract::VaultSptActions,
            contracts.vault_spt_actions,
            if to_collateral { UNDERLIER_TO_P_TOKEN } else { P_TOKEN_TO_UNDERLIER },
            vec![
                spt.space_pool.into(),
                spt.balancer_vault.into(),
                amount.into(),
            ],
        ),
        VaultKind::Missing(family) => return Err(DispatchError::MissingVaultData(family)),
        VaultKind::Unsupported(tag) => {
            return Err(DispatchError::UnsupportedVaultType(tag.to_string()))
        }
    };
    Ok(call)
}

/// Quote call: collateral token received for `underlier` (underlier scale).
pub fn underlier_to_collateral_token_call(
    contracts: &Contracts,
    ct: &CollateralType,
    underlier: U256,
) -> Result<ContractCall, DispatchError> {
    quote_call(contracts, ct, underlier, SwapDirection::UnderlierToCollateral)
}

/// Quote call: underlier received for `collateral` (token scale).
pub fn collateral_token_to_underlier_call(
    contracts: &Contracts,
    ct: &CollateralType,
    collateral: U256,
) -> Result<ContractCall, DispatchError> {
    quote_call(contracts, ct, collateral, SwapDirection::CollateralToUnderlier)
}

fn map_quote_error(err: SdkError, direction: SwapDirection) -> ValuationError {
    if err.revert_reason() == Some(BALANCER_SUB_OVERFLOW) {
        ValuationError::InsufficientLiquidity(direction)
    } else {
        ValuationError::Sdk(err)
    }
}

async fn quote<S: FiatSdk + ?Sized>(
    sdk: &S,
    ct: &CollateralType,
    amount: U256,
    direction: SwapDirection,
) -> Result<U256, ValuationError> {
    if amount.is_zero() {
        return Ok(U256::ZERO);
    }
    let call = quote_call(sdk.contracts(), ct, amount, direction)?;
    debug!(method = %call.method, %amount, "requesting swap preview");
    let output = sdk
        .call(&call)
        .await
        .map_err(|e| map_quote_error(e, direction))?;
    Ok(output.as_uint()?)
}

/// Collateral token (token scale) received for `underlier`. Zero in, zero out.
///
/// A Balancer `BAL#001` revert becomes [`ValuationError::InsufficientLiquidity`].
pub async fn underlier_to_collateral_token<S: FiatSdk + ?Sized>(
    sdk: &S,
    ct: &CollateralType,
    underlier: U256,
) -> Result<U256, ValuationError> {
    quote(sdk, ct, underlier, SwapDirection::UnderlierToCollateral).await
}

/// Underlier (underlier scale) received for `collateral`. Zero in, zero out.
pub async fn collateral_token_to_underlier<S: FiatSdk + ?Sized>(
    sdk: &S,
    ct: &CollateralType,
    collateral: U256,
) -> Result<U256, ValuationError> {
    quote(sdk, ct, collateral, SwapDirection::CollateralToUnderlier).await
}

// ─── Earnable rate ───────────────────────────────────────────────────────────

/// One earnable-rate query: quote one underlier unit of a collateral type.
#[derive(Debug, Clone)]
pub struct EarnableRateQuery {
    pub id: CollateralTypeId,
    pub token_scale: U256,
    pub call: ContractCall,
}

/// Queries for every collateral type that has not matured at `now`.
///
/// Types that cannot be quoted (unsupported tag, missing data) are skipped.
pub fn earnable_rate_calls(
    contracts: &Contracts,
    cts: &[CollateralType],
    now: u64,
) -> Vec<EarnableRateQuery> {
    cts.iter()
        .filter(|ct| !ct.is_matured(now))
        .filter_map(|ct| {
            match underlier_to_collateral_token_call(contracts, ct, ct.properties.underlier_scale) {
                Ok(call) => Some(EarnableRateQuery {
                    id: ct.id(),
                    token_scale: ct.properties.token_scale,
                    call,
                }),
                Err(err) => {
                    warn!(collateral_type = %ct.id(), error = %err, "skipping earnable rate");
                    None
                }
            }
        })
        .collect()
}

/// `scale_to_wad(quote, token_scale) - WAD`, signed.
pub fn earnable_rate_from_quote(quote: U256, token_scale: U256) -> Result<I256, ValuationError> {
    let quoted = to_signed(scale_to_wad(quote, token_scale)?)?;
    Ok(quoted - to_signed(WAD)?)
}

/// Earnable rates for all non-matured types in one multicall.
pub async fn earnable_rates<S: FiatSdk + ?Sized>(
    sdk: &S,
    cts: &[CollateralType],
    now: u64,
) -> Result<Vec<(CollateralTypeId, I256)>, ValuationError> {
    let queries = earnable_rate_calls(sdk.contracts(), cts, now);
    if queries.is_empty() {
        return Ok(Vec::new());
    }
    let calls: Vec<ContractCall> = queries.iter().map(|q| q.call.clone()).collect();
    let results = sdk.multicall(&calls).await?;
    if results.len() != queries.len() {
        return Err(SdkError::Decode(format!(
            "multicall returned {} results for {} calls",
            results.len(),
            queries.len()
        ))
        .into());
    }
    queries
        .iter()
        .zip(results)
        .map(|(query, output)| -> Result<(CollateralTypeId, I256), ValuationError> {
            let rate = earnable_rate_from_quote(output.as_uint()?, query.token_scale)?;
            Ok((query.id, rate))
        })
        .collect()
}
