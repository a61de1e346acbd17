//! Position Valuation Engine.
//!
//! Estimates what a position looks like after the change the user has typed
//! in, and flags what would make the change fail on chain. Amounts that need
//! a swap are priced with a preview call through the SDK; everything else is
//! local WAD math.
//!
//! Estimates never fail as a whole: errors are rendered into
//! [`FormFeedback::errors`] and block submission, warnings are advisory.

mod decrease;
mod increase;

pub use decrease::{estimate_decrease, estimate_redeem};
pub use increase::{estimate_create, estimate_increase};

use alloy_primitives::U256;

use crate::config::PositionsConfig;
use crate::domain::collateral_type::CollateralType;
use crate::domain::form::{FormFeedback, Mode, ModeState, ModifyPositionData};
use crate::sdk::FiatSdk;
use crate::shared::wad::{wad_to_dec, WAD};

pub(crate) const PRICE_IMPACT_WARNING: &str = "Large Price Impact (Negative Yield)";
pub(crate) const COLL_RATIO_ERROR: &str = "Collateralization Ratio has to be greater than 100%";
pub(crate) const INSUFFICIENT_COLLATERAL: &str = "Insufficient collateral";
pub(crate) const INSUFFICIENT_DEBT: &str = "Insufficient debt";

pub(crate) fn debt_floor_error(ct: &CollateralType) -> String {
    format!(
        "This collateral type requires a minimum of {} FIAT to be borrowed",
        wad_to_dec(ct.debt_floor)
    )
}

/// Collateralization ratio must stay strictly above 100%.
pub(crate) fn is_undercollateralized(coll_ratio: U256) -> bool {
    coll_ratio <= WAD
}

/// Result of one valuation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Estimate {
    pub mode: Mode,
    /// The input state with its derived fields replaced.
    pub state: ModeState,
    pub feedback: FormFeedback,
}

impl Estimate {
    /// Errors block submission, warnings do not.
    pub fn can_submit(&self) -> bool {
        self.feedback.errors.is_empty()
    }
}

/// Run the estimate for `mode`.
pub async fn evaluate<S: FiatSdk + ?Sized>(
    sdk: &S,
    data: &ModifyPositionData,
    mode: Mode,
    state: &ModeState,
    config: &PositionsConfig,
) -> Estimate {
    match mode {
        Mode::Create => estimate_create(sdk, data, state).await,
        Mode::Increase => estimate_increase(sdk, data, state).await,
        Mode::Decrease => estimate_decrease(sdk, data, state, config).await,
        Mode::Redeem => estimate_redeem(data, state, config),
    }
}
