//! Estimates for shrinking a position, by selling or by redeeming at maturity.

use alloy_primitives::U256;
use tracing::warn;

use super::{
    debt_floor_error, is_undercollateralized, Estimate, COLL_RATIO_ERROR, INSUFFICIENT_COLLATERAL,
    INSUFFICIENT_DEBT,
};
use crate::config::PositionsConfig;
use crate::domain::collateral_type::CollateralType;
use crate::domain::form::{FormFeedback, Mode, ModeState, ModifyPositionData};
use crate::domain::position::Position;
use crate::error::ValuationError;
use crate::sdk::FiatSdk;
use crate::shared::wad::{
    apply_discount, compute_collateralization_ratio, debt_to_normal_debt, normal_debt_to_debt,
    wad_to_scale,
};
use crate::vault::previews::collateral_token_to_underlier;

struct Remaining {
    collateral: U256,
    debt: U256,
    coll_ratio: U256,
}

/// What is left of `position` after withdrawing `delta_collateral` and
/// repaying `delta_debt`.
fn remaining(
    ct: &CollateralType,
    position: &Position,
    state: &ModeState,
    config: &PositionsConfig,
    feedback: &mut FormFeedback,
) -> Result<Remaining, ValuationError> {
    let rate = ct.virtual_rate;
    let delta_normal_debt = debt_to_normal_debt(state.delta_debt, rate)?;

    if position.collateral < state.delta_collateral {
        feedback.error(INSUFFICIENT_COLLATERAL);
    }
    if position.normal_debt < delta_normal_debt {
        feedback.error(INSUFFICIENT_DEBT);
    }

    let collateral = position.collateral.saturating_sub(state.delta_collateral);
    let mut normal_debt = position.normal_debt.saturating_sub(delta_normal_debt);
    if normal_debt < config.dust_threshold {
        normal_debt = U256::ZERO;
    }
    let debt = normal_debt_to_debt(normal_debt, rate)?;
    if !debt.is_zero() && debt < ct.debt_floor {
        feedback.error(debt_floor_error(ct));
    }

    let coll_ratio = compute_collateralization_ratio(collateral, ct.fair_price, normal_debt, rate)?;
    let closes_position = collateral.is_zero() && normal_debt.is_zero();
    if !closes_position && is_undercollateralized(coll_ratio) {
        feedback.error(COLL_RATIO_ERROR);
    }

    Ok(Remaining {
        collateral,
        debt,
        coll_ratio,
    })
}

/// On failure the form shows the position as it stands.
fn unchanged(ct: &CollateralType, position: &Position, state: &ModeState) -> ModeState {
    let rate = ct.virtual_rate;
    let debt = position.debt(rate).unwrap_or_else(|err| {
        warn!(error = %err, "cannot price current debt");
        U256::ZERO
    });
    let coll_ratio =
        compute_collateralization_ratio(position.collateral, ct.fair_price, position.normal_debt, rate)
            .unwrap_or_else(|err| {
                warn!(error = %err, "cannot price current collateralization");
                U256::ZERO
            });
    ModeState {
        underlier: U256::ZERO,
        collateral: position.collateral,
        debt,
        coll_ratio,
        ..state.clone()
    }
}

async fn decrease<S: FiatSdk + ?Sized>(
    sdk: &S,
    ct: &CollateralType,
    position: &Position,
    state: &ModeState,
    config: &PositionsConfig,
    feedback: &mut FormFeedback,
) -> Result<(U256, Remaining), ValuationError> {
    let token_in = wad_to_scale(state.delta_collateral, ct.properties.token_scale)?;
    let quoted = collateral_token_to_underlier(sdk, ct, token_in).await?;
    let underlier = apply_discount(quoted, state.slippage_pct)?;
    let rest = remaining(ct, position, state, config, feedback)?;
    Ok((underlier, rest))
}

/// Sell `delta_collateral` for underlier and repay `delta_debt`.
pub async fn estimate_decrease<S: FiatSdk + ?Sized>(
    sdk: &S,
    data: &ModifyPositionData,
    state: &ModeState,
    config: &PositionsConfig,
) -> Estimate {
    let ct = &data.collateral_type;
    let position = data.position_or_default();
    let mut feedback = FormFeedback::default();

    let next = match decrease(sdk, ct, &position, state, config, &mut feedback).await {
        Ok((underlier, rest)) => ModeState {
            underlier,
            collateral: rest.collateral,
            debt: rest.debt,
            coll_ratio: rest.coll_ratio,
            ..state.clone()
        },
        Err(err) => {
            feedback.error(err.to_string());
            unchanged(ct, &position, state)
        }
    };

    Estimate {
        mode: Mode::Decrease,
        state: next,
        feedback,
    }
}

/// Redeem matured collateral at face value and repay `delta_debt`. No swap.
pub fn estimate_redeem(data: &ModifyPositionData, state: &ModeState, config: &PositionsConfig) -> Estimate {
    let ct = &data.collateral_type;
    let position = data.position_or_default();
    let mut feedback = FormFeedback::default();

    let next = match remaining(ct, &position, state, config, &mut feedback) {
        Ok(rest) => ModeState {
            collateral: rest.collateral,
            debt: rest.debt,
            coll_ratio: rest.coll_ratio,
            ..state.clone()
        },
        Err(err) => {
            feedback.error(err.to_string());
            unchanged(ct, &position, state)
        }
    };

    Estimate {
        mode: Mode::Redeem,
        state: next,
        feedback,
    }
}
