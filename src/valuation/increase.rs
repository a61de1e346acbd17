//! Estimates for opening and growing a position.

use alloy_primitives::U256;

use super::{debt_floor_error, is_undercollateralized, Estimate, COLL_RATIO_ERROR, PRICE_IMPACT_WARNING};
use crate::domain::collateral_type::CollateralType;
use crate::domain::form::{FormFeedback, Mode, ModeState, ModifyPositionData};
use crate::error::ValuationError;
use crate::sdk::FiatSdk;
use crate::shared::wad::{
    add, apply_discount, compute_collateralization_ratio, compute_max_normal_debt,
    debt_to_normal_debt, mul_div, normal_debt_to_debt, scale_to_wad,
};
use crate::vault::previews::underlier_to_collateral_token;

struct Derived {
    delta_collateral: U256,
    delta_debt: U256,
    collateral: U256,
    debt: U256,
    coll_ratio: U256,
}

/// Collateral (WAD) the swap of `underlier` is expected to yield after slippage.
///
/// Warns when the slippage-adjusted quote is below a 1:1 exchange.
async fn preview_delta_collateral<S: FiatSdk + ?Sized>(
    sdk: &S,
    ct: &CollateralType,
    underlier: U256,
    slippage: U256,
    feedback: &mut FormFeedback,
) -> Result<U256, ValuationError> {
    if underlier.is_zero() {
        return Ok(U256::ZERO);
    }
    let token_scale = ct.properties.token_scale;
    let tokens_out = underlier_to_collateral_token(sdk, ct, underlier).await?;
    let min_tokens_out = mul_div(underlier, token_scale, ct.properties.underlier_scale)?;
    if apply_discount(tokens_out, slippage)? < min_tokens_out {
        feedback.warn(PRICE_IMPACT_WARNING);
    }
    Ok(apply_discount(scale_to_wad(tokens_out, token_scale)?, slippage)?)
}

fn check_borrow(ct: &CollateralType, debt: U256, coll_ratio: U256, feedback: &mut FormFeedback) {
    if !debt.is_zero() && debt <= ct.debt_floor {
        feedback.error(debt_floor_error(ct));
    }
    if !debt.is_zero() && is_undercollateralized(coll_ratio) {
        feedback.error(COLL_RATIO_ERROR);
    }
}

fn apply(state: &ModeState, result: Result<Derived, ValuationError>, feedback: &mut FormFeedback) -> ModeState {
    let mut next = state.clone();
    match result {
        Ok(d) => {
            next.delta_collateral = d.delta_collateral;
            next.delta_debt = d.delta_debt;
            next.collateral = d.collateral;
            next.debt = d.debt;
            next.coll_ratio = d.coll_ratio;
        }
        Err(err) => {
            next.delta_collateral = U256::ZERO;
            next.delta_debt = U256::ZERO;
            next.collateral = U256::ZERO;
            next.debt = U256::ZERO;
            next.coll_ratio = U256::ZERO;
            feedback.error(err.to_string());
        }
    }
    next
}

async fn create<S: FiatSdk + ?Sized>(
    sdk: &S,
    ct: &CollateralType,
    state: &ModeState,
    feedback: &mut FormFeedback,
) -> Result<Derived, ValuationError> {
    let rate = ct.virtual_rate;
    let delta_collateral =
        preview_delta_collateral(sdk, ct, state.underlier, state.slippage_pct, feedback).await?;

    let delta_normal_debt =
        compute_max_normal_debt(delta_collateral, rate, ct.fair_price, state.targeted_coll_ratio)?;
    let delta_debt = normal_debt_to_debt(delta_normal_debt, rate)?;
    let coll_ratio =
        compute_collateralization_ratio(delta_collateral, ct.fair_price, delta_normal_debt, rate)?;

    check_borrow(ct, delta_debt, coll_ratio, feedback);

    Ok(Derived {
        delta_collateral,
        delta_debt,
        collateral: delta_collateral,
        debt: delta_debt,
        coll_ratio,
    })
}

/// New position: borrow as much as the targeted ratio allows against the
/// collateral bought with `underlier`.
pub async fn estimate_create<S: FiatSdk + ?Sized>(
    sdk: &S,
    data: &ModifyPositionData,
    state: &ModeState,
) -> Estimate {
    let mut feedback = FormFeedback::default();
    let result = create(sdk, &data.collateral_type, state, &mut feedback).await;
    let state = apply(state, result, &mut feedback);
    Estimate {
        mode: Mode::Create,
        state,
        feedback,
    }
}

async fn increase<S: FiatSdk + ?Sized>(
    sdk: &S,
    data: &ModifyPositionData,
    state: &ModeState,
    feedback: &mut FormFeedback,
) -> Result<Derived, ValuationError> {
    let ct = &data.collateral_type;
    let rate = ct.virtual_rate;
    let position = data.position_or_default();
    let delta_collateral =
        preview_delta_collateral(sdk, ct, state.underlier, state.slippage_pct, feedback).await?;

    let collateral = add(position.collateral, delta_collateral, "collateral after increase")?;
    let debt = add(position.debt(rate)?, state.delta_debt, "debt after increase")?;
    let normal_debt = debt_to_normal_debt(debt, rate)?;
    let coll_ratio = compute_collateralization_ratio(collateral, ct.fair_price, normal_debt, rate)?;

    check_borrow(ct, debt, coll_ratio, feedback);

    Ok(Derived {
        delta_collateral,
        delta_debt: state.delta_debt,
        collateral,
        debt,
        coll_ratio,
    })
}

/// Existing position: add the collateral bought with `underlier` and borrow
/// the user-entered `delta_debt` on top.
pub async fn estimate_increase<S: FiatSdk + ?Sized>(
    sdk: &S,
    data: &ModifyPositionData,
    state: &ModeState,
) -> Estimate {
    let mut feedback = FormFeedback::default();
    let result = increase(sdk, data, state, &mut feedback).await;
    let state = apply(state, result, &mut feedback);
    Estimate {
        mode: Mode::Increase,
        state,
        feedback,
    }
}
