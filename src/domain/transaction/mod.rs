//! Transaction domain: what was submitted and where it stands.

pub mod client;

use serde::{Deserialize, Serialize};

pub use client::Transactions;

/// Label of a state-changing call, used for status display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TxAction {
    BuyCollateralAndModifyDebt,
    SellCollateralAndModifyDebt,
    RedeemCollateralAndModifyDebt,
    ModifyCollateralAndDebt,
    CreateProxy,
    SetUnderlierAllowance,
    UnsetUnderlierAllowance,
    #[serde(rename = "setFIATAllowance")]
    SetFiatAllowance,
    #[serde(rename = "unsetFIATAllowance")]
    UnsetFiatAllowance,
    SetMonetaDelegate,
    UnsetMonetaDelegate,
}

impl TxAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxAction::BuyCollateralAndModifyDebt => "buyCollateralAndModifyDebt",
            TxAction::SellCollateralAndModifyDebt => "sellCollateralAndModifyDebt",
            TxAction::RedeemCollateralAndModifyDebt => "redeemCollateralAndModifyDebt",
            TxAction::ModifyCollateralAndDebt => "modifyCollateralAndDebt",
            TxAction::CreateProxy => "createProxy",
            TxAction::SetUnderlierAllowance => "setUnderlierAllowance",
            TxAction::UnsetUnderlierAllowance => "unsetUnderlierAllowance",
            TxAction::SetFiatAllowance => "setFIATAllowance",
            TxAction::UnsetFiatAllowance => "unsetFIATAllowance",
            TxAction::SetMonetaDelegate => "setMonetaDelegate",
            TxAction::UnsetMonetaDelegate => "unsetMonetaDelegate",
        }
    }
}

impl std::fmt::Display for TxAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionStatus {
    Sent,
    /// Mined, waiting for confirmations. Reported by SDKs that stream receipts.
    Confirming,
    Confirmed,
    Error,
}

/// The single in-flight transaction slot. Both fields are `None` when idle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    pub action: Option<TxAction>,
    pub status: Option<TransactionStatus>,
}

impl TransactionData {
    pub fn sent(action: TxAction) -> Self {
        Self {
            action: Some(action),
            status: Some(TransactionStatus::Sent),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.action.is_none() && self.status.is_none()
    }

    pub fn is_pending(&self) -> bool {
        self.status == Some(TransactionStatus::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_labels_match_serde() {
        for action in [
            TxAction::BuyCollateralAndModifyDebt,
            TxAction::SetFiatAllowance,
            TxAction::UnsetMonetaDelegate,
        ] {
            let json = serde_json::to_value(action).unwrap();
            assert_eq!(json, serde_json::Value::String(action.as_str().to_string()));
        }
    }

    #[test]
    fn test_pending_only_while_sent() {
        let mut data = TransactionData::sent(TxAction::CreateProxy);
        assert!(data.is_pending());
        data.status = Some(TransactionStatus::Error);
        assert!(!data.is_pending());
        assert!(TransactionData::default().is_idle());
    }
}
