//! Unified error types.

use thiserror::Error;

use crate::shared::{VaultFamily, WadError};

/// Top-level crate error.
#[derive(Error, Debug)]
pub enum FiatError {
    #[error("SDK error: {0}")]
    Sdk(#[from] SdkError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Math error: {0}")]
    Math(#[from] WadError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by the protocol SDK collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SdkError {
    /// A contract call reverted. `reason` is the raw revert string (e.g. `BAL#001`).
    #[error("Execution reverted: {message}")]
    Revert { reason: String, message: String },

    #[error("User rejected the request")]
    UserRejected,

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

impl SdkError {
    pub fn revert(reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Revert {
            reason: reason.into(),
            message: message.into(),
        }
    }

    /// Revert reason, if this is a revert.
    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            Self::Revert { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Errors building contract calls for a vault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Invalid value for `deltaCollateral` - Value has to be non-zero")]
    InvalidDeltaCollateral,

    #[error("Missing {0} data")]
    MissingVaultData(VaultFamily),

    #[error("Unsupported vault type: {0}")]
    UnsupportedVaultType(String),

    #[error("No proxy deployed for the connected account")]
    MissingProxy,

    #[error("Invalid value for `{field}` - Value has to be non-negative")]
    NegativeRate { field: &'static str },

    #[error(transparent)]
    Math(#[from] WadError),
}

/// Direction of a swap preview, used to word liquidity errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapDirection {
    UnderlierToCollateral,
    CollateralToUnderlier,
}

impl SwapDirection {
    pub fn liquidity_message(&self) -> &'static str {
        match self {
            Self::UnderlierToCollateral => "Insufficient liquidity to convert underlier to collateral",
            Self::CollateralToUnderlier => "Insufficient liquidity to convert collateral to underlier",
        }
    }
}

/// Errors from the position valuation engine.
///
/// These never escape to callers as `Err`; the engine renders them into
/// form error strings via `Display`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValuationError {
    #[error("{}", .0.liquidity_message())]
    InsufficientLiquidity(SwapDirection),

    #[error("{0}")]
    Sdk(#[from] SdkError),

    #[error("{0}")]
    Dispatch(#[from] DispatchError),

    #[error("{0}")]
    Math(#[from] WadError),
}

/// Errors from submitting a transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("A transaction is already pending")]
    AlreadyPending,

    #[error("Transaction failed: {message}")]
    Failed { message: String },

    #[error("User rejected the transaction")]
    Rejected,

    #[error("No account connected")]
    NotConnected,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl TransactionError {
    /// Message to show the user, or `None` when it should be suppressed.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Rejected => None,
            other => Some(other.to_string()),
        }
    }
}

impl From<SdkError> for TransactionError {
    fn from(err: SdkError) -> Self {
        match err {
            SdkError::UserRejected => Self::Rejected,
            SdkError::Revert { message, .. } => Self::Failed { message },
            other => Self::Failed {
                message: other.to_string(),
            },
        }
    }
}

pub type FiatResult<T> = Result<T, FiatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_messages() {
        assert_eq!(
            DispatchError::InvalidDeltaCollateral.to_string(),
            "Invalid value for `deltaCollateral` - Value has to be non-zero"
        );
        assert_eq!(
            DispatchError::MissingVaultData(VaultFamily::Fc).to_string(),
            "Missing FC data"
        );
    }

    #[test]
    fn test_liquidity_messages() {
        assert_eq!(
            ValuationError::InsufficientLiquidity(SwapDirection::UnderlierToCollateral).to_string(),
            "Insufficient liquidity to convert underlier to collateral"
        );
        assert_eq!(
            ValuationError::InsufficientLiquidity(SwapDirection::CollateralToUnderlier).to_string(),
            "Insufficient liquidity to convert collateral to underlier"
        );
    }

    #[test]
    fn test_rejected_is_suppressed() {
        let err: TransactionError = SdkError::UserRejected.into();
        assert_eq!(err, TransactionError::Rejected);
        assert_eq!(err.user_message(), None);

        let err: TransactionError = SdkError::revert("", "out of gas").into();
        assert_eq!(err.user_message().as_deref(), Some("Transaction failed: out of gas"));
    }
}
