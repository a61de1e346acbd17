//! Contract method names and well-known revert reasons.

pub const MODIFY_COLLATERAL_AND_DEBT: &str = "modifyCollateralAndDebt";
pub const BUY_COLLATERAL_AND_MODIFY_DEBT: &str = "buyCollateralAndModifyDebt";
pub const SELL_COLLATERAL_AND_MODIFY_DEBT: &str = "sellCollateralAndModifyDebt";
pub const REDEEM_COLLATERAL_AND_MODIFY_DEBT: &str = "redeemCollateralAndModifyDebt";

pub const UNDERLIER_TO_P_TOKEN: &str = "underlierToPToken";
pub const P_TOKEN_TO_UNDERLIER: &str = "pTokenToUnderlier";
pub const UNDERLIER_TO_FCASH: &str = "underlierToFCash";
pub const FCASH_TO_UNDERLIER: &str = "fCashToUnderlier";
pub const UNDERLIER_TO_FY_TOKEN: &str = "underlierToFYToken";
pub const FY_TOKEN_TO_UNDERLIER: &str = "fyTokenToUnderlier";

pub const DEPLOY_FOR: &str = "deployFor";
pub const GET_CURRENT_PROXY: &str = "getCurrentProxy";
pub const APPROVE: &str = "approve";
pub const ALLOWANCE: &str = "allowance";
pub const BALANCE_OF: &str = "balanceOf";
pub const DELEGATES: &str = "delegates";
pub const GRANT_DELEGATE: &str = "grantDelegate";
pub const REVOKE_DELEGATE: &str = "revokeDelegate";

/// Balancer `SUB_OVERFLOW`: the pool cannot cover the requested swap.
pub const BALANCER_SUB_OVERFLOW: &str = "BAL#001";
