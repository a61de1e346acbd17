//! Picks the actions call for the form's active mode.

use alloy_primitives::U256;

use super::{
    build_buy_collateral_and_modify_debt_args, build_modify_collateral_and_debt_args,
    build_redeem_collateral_and_modify_debt_args, build_sell_collateral_and_modify_debt_args,
    ActionContext, ContractCall,
};
use crate::domain::form::{Mode, ModeState, ModifyPositionData};
use crate::domain::transaction::TxAction;
use crate::error::DispatchError;
use crate::shared::wad::to_signed;

/// A call ready to submit, labelled with the action it performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSubmission {
    pub action: TxAction,
    pub call: ContractCall,
}

/// Without collateral to move only debt changes, through the generic
/// modify call. Otherwise the mode decides between buy, sell and redeem.
pub fn plan_submission(
    ctx: &ActionContext<'_>,
    mode: Mode,
    state: &ModeState,
    data: &ModifyPositionData,
) -> Result<PlannedSubmission, DispatchError> {
    let ct = &data.collateral_type;
    let position = data.position.as_ref();
    let debt_only = state.delta_collateral == U256::ZERO;
    let delta_debt = to_signed(state.delta_debt)?;

    let (action, call) = match mode {
        Mode::Create | Mode::Increase if debt_only => (
            TxAction::ModifyCollateralAndDebt,
            build_modify_collateral_and_debt_args(ctx, ct, delta_debt, position)?,
        ),
        Mode::Create | Mode::Increase => (
            TxAction::BuyCollateralAndModifyDebt,
            build_buy_collateral_and_modify_debt_args(
                ctx,
                ct,
                state.delta_collateral,
                state.delta_debt,
                state.underlier,
            )?,
        ),
        Mode::Decrease | Mode::Redeem if debt_only => (
            TxAction::ModifyCollateralAndDebt,
            build_modify_collateral_and_debt_args(ctx, ct, -delta_debt, position)?,
        ),
        Mode::Decrease => (
            TxAction::SellCollateralAndModifyDebt,
            build_sell_collateral_and_modify_debt_args(
                ctx,
                ct,
                state.delta_collateral,
                state.delta_debt,
                state.underlier,
                &data.position_or_default(),
            )?,
        ),
        Mode::Redeem => (
            TxAction::RedeemCollateralAndModifyDebt,
            build_redeem_collateral_and_modify_debt_args(
                ctx,
                ct,
                state.delta_collateral,
                state.delta_debt,
                &data.position_or_default(),
            )?,
        ),
    };

    Ok(PlannedSubmission { action, call })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PositionsConfig;
    use crate::domain::collateral_type::fixtures;
    use crate::domain::position::Position;
    use crate::sdk::Contracts;
    use crate::shared::wad::parse_wad;
    use crate::shared::VaultType;
    use crate::vault::constants::{
        BUY_COLLATERAL_AND_MODIFY_DEBT, MODIFY_COLLATERAL_AND_DEBT,
        REDEEM_COLLATERAL_AND_MODIFY_DEBT, SELL_COLLATERAL_AND_MODIFY_DEBT,
    };
    use alloy_primitives::{Address, I256};

    fn data() -> ModifyPositionData {
        ModifyPositionData::new(
            fixtures::collateral_type(VaultType::Spt),
            Some(Position {
                collateral: parse_wad("100").unwrap(),
                normal_debt: parse_wad("50").unwrap(),
                ..Position::default()
            }),
        )
    }

    fn state(delta_collateral: &str, delta_debt: &str) -> ModeState {
        let mut s = ModeState::initial(&PositionsConfig::default()).unwrap();
        s.delta_collateral = parse_wad(delta_collateral).unwrap();
        s.delta_debt = parse_wad(delta_debt).unwrap();
        s.underlier = U256::from(10_000_000u64);
        s
    }

    fn plan(mode: Mode, s: &ModeState) -> Result<PlannedSubmission, DispatchError> {
        let contracts = Contracts::default();
        let config = PositionsConfig::default();
        let ctx = ActionContext::new(&contracts, Address::repeat_byte(1), &config, 1_700_000_000)
            .with_proxy(Address::repeat_byte(2));
        plan_submission(&ctx, mode, s, &data())
    }

    #[test]
    fn test_debt_only_uses_modify() {
        let planned = plan(Mode::Increase, &state("0", "10")).unwrap();
        assert_eq!(planned.action, TxAction::ModifyCollateralAndDebt);
        assert_eq!(planned.call.method, MODIFY_COLLATERAL_AND_DEBT);
        let dnd = planned.call.arg(7).and_then(|a| a.as_int()).unwrap();
        assert!(dnd > I256::ZERO);
    }

    #[test]
    fn test_repay_only_is_negative_modify() {
        for mode in [Mode::Decrease, Mode::Redeem] {
            let planned = plan(mode, &state("0", "10")).unwrap();
            assert_eq!(planned.call.method, MODIFY_COLLATERAL_AND_DEBT);
            let dnd = planned.call.arg(7).and_then(|a| a.as_int()).unwrap();
            assert!(dnd < I256::ZERO);
        }
    }

    #[test]
    fn test_collateral_selects_swap_call_per_mode() {
        let s = state("5", "1");
        assert_eq!(plan(Mode::Create, &s).unwrap().call.method, BUY_COLLATERAL_AND_MODIFY_DEBT);
        assert_eq!(plan(Mode::Increase, &s).unwrap().action, TxAction::BuyCollateralAndModifyDebt);
        assert_eq!(plan(Mode::Decrease, &s).unwrap().call.method, SELL_COLLATERAL_AND_MODIFY_DEBT);
        assert_eq!(plan(Mode::Redeem, &s).unwrap().call.method, REDEEM_COLLATERAL_AND_MODIFY_DEBT);
    }

    #[test]
    fn test_missing_proxy() {
        let contracts = Contracts::default();
        let config = PositionsConfig::default();
        let ctx = ActionContext::new(&contracts, Address::repeat_byte(1), &config, 0);
        let err = plan_submission(&ctx, Mode::Increase, &state("0", "1"), &data()).unwrap_err();
        assert_eq!(err, DispatchError::MissingProxy);
    }
}
