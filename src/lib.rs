//! # FIAT positions
//!
//! Client-side core for managing FIAT collateralized debt positions in
//! fixed-income vaults (Element PTs, Notional fCash, Yield FYTokens, Sense PTs).
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: WAD math, ids, domain models, configuration (pure, WASM-safe)
//! 2. **SDK seam**: the [`sdk::FiatSdk`] trait the protocol SDK is plugged in through
//! 3. **Vault dispatcher**: per-vault-type contract call builders, swap previews, approvals
//! 4. **Valuation engine**: position estimates with form warnings and errors
//! 5. **High-Level Client**: `FiatClient` with nested sub-clients, caching and form sessions
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fiat_positions::prelude::*;
//!
//! let client = FiatClient::builder().sdk(my_sdk).build()?;
//! client.positions().connect(user).await?;
//!
//! let listed = client.collateral_types().list().await?;
//! let data = client.positions().modify_position_data(&listed[0].id()).await?;
//!
//! let session = client.session(data)?;
//! session.set_mode(Mode::Create).await?;
//! session.set_underlier("1000").await?;
//! session.submit(&client.transactions()).await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes, WAD math and formatting.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified error types.
pub mod error;

/// Tunable constants.
pub mod config;

// ── Layer 2: SDK seam ────────────────────────────────────────────────────────

/// The external protocol SDK and a mock for tests.
pub mod sdk;

// ── Layer 3: Vault dispatcher ────────────────────────────────────────────────

pub mod vault;

// ── Layer 4: Valuation engine ────────────────────────────────────────────────

pub mod valuation;

// ── Layer 5: High-Level Client ───────────────────────────────────────────────

/// `FiatClient`: the primary entry point.
pub mod client;

/// Debounced form sessions.
pub mod session;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{CollateralTypeId, PositionId, VaultFamily, VaultType, INFINITE_RATIO, WAD};

    // Domain types: collateral type
    pub use crate::domain::collateral_type::{CollateralType, Metadata, Properties, VaultKind};

    // Domain types: position
    pub use crate::domain::position::{Position, PositionSummary, UserData};

    // Domain types: form
    pub use crate::domain::form::{
        FormFeedback, FormStatus, Mode, ModeState, ModifyPositionData, ModifyPositionStore,
        RecomputeRequest,
    };

    // Domain types: transaction
    pub use crate::domain::transaction::{TransactionData, TransactionStatus, TxAction};

    // Errors
    pub use crate::error::{
        DispatchError, FiatError, FiatResult, SdkError, TransactionError, ValuationError,
    };

    // Config
    pub use crate::config::PositionsConfig;

    // SDK seam
    pub use crate::sdk::{CallOutput, Contracts, FiatSdk, TransactionReceipt};

    // Dispatcher
    pub use crate::vault::{ActionContext, CallArg, Contract, ContractCall, PlannedSubmission};

    // Valuation
    pub use crate::valuation::Estimate;

    // Client + sub-clients
    pub use crate::client::{
        CollateralTypesClient, FiatClient, FiatClientBuilder, PositionsClient, TransactionsClient,
        UserContext,
    };
    pub use crate::session::PositionSession;
}
