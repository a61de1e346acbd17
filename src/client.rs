//! High-level client: `FiatClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, shared cache state, and accessor methods.

use crate::config::PositionsConfig;
use crate::domain::collateral_type::client::CollateralTypes;
use crate::domain::collateral_type::CollateralType;
use crate::domain::form::ModifyPositionData;
use crate::domain::position::client::Positions;
use crate::domain::transaction::client::Transactions;
use crate::domain::transaction::TransactionData;
use crate::error::FiatError;
use crate::sdk::FiatSdk;
use crate::session::PositionSession;

use alloy_primitives::Address;
use async_lock::RwLock;
use chrono::{DateTime, Utc};
use std::sync::Arc;

// Re-export sub-client types for convenience.
pub use crate::domain::collateral_type::client::CollateralTypes as CollateralTypesClient;
pub use crate::domain::position::client::Positions as PositionsClient;
pub use crate::domain::transaction::client::Transactions as TransactionsClient;

/// The connected account and its proxies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserContext {
    pub user: Option<Address>,
    pub proxies: Vec<Address>,
}

impl UserContext {
    /// The proxy positions are managed through.
    pub fn proxy(&self) -> Option<Address> {
        self.proxies.first().copied()
    }
}

/// The primary entry point.
///
/// Provides nested sub-client accessors for each domain:
/// `client.collateral_types()`, `client.positions()`, `client.transactions()`.
pub struct FiatClient<S: FiatSdk> {
    pub(crate) sdk: Arc<S>,
    pub(crate) config: PositionsConfig,
    pub(crate) user_context: Arc<RwLock<UserContext>>,
    /// Listed collateral types and when they were fetched.
    pub(crate) collateral_type_cache: Arc<RwLock<Option<(Vec<CollateralType>, DateTime<Utc>)>>>,
    pub(crate) transaction: Arc<RwLock<TransactionData>>,
}

impl<S: FiatSdk> FiatClient<S> {
    pub fn builder() -> FiatClientBuilder<S> {
        FiatClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn collateral_types(&self) -> CollateralTypes<'_, S> {
        CollateralTypes { client: self }
    }

    pub fn positions(&self) -> Positions<'_, S> {
        Positions { client: self }
    }

    pub fn transactions(&self) -> Transactions<'_, S> {
        Transactions { client: self }
    }

    /// A debounced form session for one collateral type.
    pub fn session(&self, data: ModifyPositionData) -> Result<PositionSession<S>, FiatError> {
        PositionSession::new(self.sdk.clone(), self.config.clone(), data)
    }

    // ── State ────────────────────────────────────────────────────────────

    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    pub fn config(&self) -> &PositionsConfig {
        &self.config
    }

    pub async fn user_context(&self) -> UserContext {
        self.user_context.read().await.clone()
    }

    /// Current unix time in seconds.
    pub(crate) fn now(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }

    /// Clear all caches.
    pub async fn clear_all_caches(&self) {
        *self.collateral_type_cache.write().await = None;
    }
}

impl<S: FiatSdk> Clone for FiatClient<S> {
    fn clone(&self) -> Self {
        Self {
            sdk: self.sdk.clone(),
            config: self.config.clone(),
            user_context: self.user_context.clone(),
            collateral_type_cache: self.collateral_type_cache.clone(),
            transaction: self.transaction.clone(),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct FiatClientBuilder<S: FiatSdk> {
    sdk: Option<Arc<S>>,
    config: PositionsConfig,
    user: Option<Address>,
}

impl<S: FiatSdk> Default for FiatClientBuilder<S> {
    fn default() -> Self {
        Self {
            sdk: None,
            config: PositionsConfig::default(),
            user: None,
        }
    }
}

impl<S: FiatSdk> FiatClientBuilder<S> {
    pub fn sdk(mut self, sdk: S) -> Self {
        self.sdk = Some(Arc::new(sdk));
        self
    }

    /// Share an SDK instance with other owners.
    pub fn shared_sdk(mut self, sdk: Arc<S>) -> Self {
        self.sdk = Some(sdk);
        self
    }

    pub fn config(mut self, config: PositionsConfig) -> Self {
        self.config = config;
        self
    }

    /// Pre-set the connected account. Proxies are resolved on `positions().connect()`.
    pub fn user(mut self, user: Address) -> Self {
        self.user = Some(user);
        self
    }

    pub fn build(self) -> Result<FiatClient<S>, FiatError> {
        let sdk = self
            .sdk
            .ok_or_else(|| FiatError::Validation("FiatClient requires an SDK".to_string()))?;
        self.config.validate()?;
        Ok(FiatClient {
            sdk,
            config: self.config,
            user_context: Arc::new(RwLock::new(UserContext {
                user: self.user,
                proxies: Vec::new(),
            })),
            collateral_type_cache: Arc::new(RwLock::new(None)),
            transaction: Arc::new(RwLock::new(TransactionData::default())),
        })
    }
}
