//! Debounced recomputation driver for one position form.
//!
//! Every setter records the input right away, then waits out the debounce
//! delay. If another input arrived in the meantime the call returns without
//! touching the SDK; otherwise the engine runs on a snapshot of the inputs
//! and the result is committed unless it went stale while the quote was in
//! flight.
//!
//! ```rust,ignore
//! let session = client.session(data)?;
//! session.set_mode(Mode::Create).await?;
//! session.set_underlier("1000").await?;
//! let store = session.snapshot().await;
//! println!("{:?}", store.active().delta_collateral);
//! ```

use std::sync::Arc;

use async_lock::RwLock;
use futures_timer::Delay;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::PositionsConfig;
use crate::domain::form::{Mode, ModifyPositionData, ModifyPositionStore, RecomputeRequest};
use crate::domain::transaction::Transactions;
use crate::error::FiatError;
use crate::sdk::{FiatSdk, TransactionReceipt};
use crate::valuation::evaluate;

pub struct PositionSession<S: FiatSdk> {
    sdk: Arc<S>,
    config: PositionsConfig,
    store: Arc<RwLock<ModifyPositionStore>>,
    data: Arc<RwLock<ModifyPositionData>>,
}

impl<S: FiatSdk> Clone for PositionSession<S> {
    fn clone(&self) -> Self {
        Self {
            sdk: self.sdk.clone(),
            config: self.config.clone(),
            store: self.store.clone(),
            data: self.data.clone(),
        }
    }
}

impl<S: FiatSdk> PositionSession<S> {
    pub fn new(sdk: Arc<S>, config: PositionsConfig, data: ModifyPositionData) -> Result<Self, FiatError> {
        let store = ModifyPositionStore::new(config.clone())?;
        Ok(Self {
            sdk,
            config,
            store: Arc::new(RwLock::new(store)),
            data: Arc::new(RwLock::new(data)),
        })
    }

    /// Copy of the current form state.
    pub async fn snapshot(&self) -> ModifyPositionStore {
        self.store.read().await.clone()
    }

    pub async fn data(&self) -> ModifyPositionData {
        self.data.read().await.clone()
    }

    /// Swap in freshly fetched position data and recompute.
    pub async fn refresh_data(&self, data: ModifyPositionData) -> Result<bool, FiatError> {
        *self.data.write().await = data;
        let request = {
            let mut store = self.store.write().await;
            let mode = store.mode();
            store.set_mode(mode)
        };
        self.recompute(request).await
    }

    // ─── Setters ─────────────────────────────────────────────────────────
    //
    // Each returns `true` if its estimate was committed, `false` if a later
    // input superseded it.

    pub async fn set_mode(&self, mode: Mode) -> Result<bool, FiatError> {
        let request = self.store.write().await.set_mode(mode);
        self.recompute(request).await
    }

    pub async fn set_underlier(&self, input: &str) -> Result<bool, FiatError> {
        let request = {
            let data = self.data.read().await;
            self.store.write().await.set_underlier(input, &data)?
        };
        self.recompute(request).await
    }

    pub async fn set_max_underlier(&self) -> Result<bool, FiatError> {
        let request = {
            let data = self.data.read().await;
            self.store.write().await.set_max_underlier(&data)
        };
        self.recompute(request).await
    }

    pub async fn set_slippage_pct(&self, input: &str) -> Result<bool, FiatError> {
        let request = self.store.write().await.set_slippage_pct(input)?;
        self.recompute(request).await
    }

    pub async fn set_targeted_coll_ratio(&self, ratio: Decimal) -> Result<bool, FiatError> {
        let request = self.store.write().await.set_targeted_coll_ratio(ratio)?;
        self.recompute(request).await
    }

    pub async fn set_delta_collateral(&self, input: &str) -> Result<bool, FiatError> {
        let request = self.store.write().await.set_delta_collateral(input)?;
        self.recompute(request).await
    }

    pub async fn set_max_delta_collateral(&self) -> Result<bool, FiatError> {
        let request = {
            let data = self.data.read().await;
            self.store.write().await.set_max_delta_collateral(&data)
        };
        self.recompute(request).await
    }

    pub async fn set_delta_debt(&self, input: &str) -> Result<bool, FiatError> {
        let request = self.store.write().await.set_delta_debt(input)?;
        self.recompute(request).await
    }

    pub async fn set_max_delta_debt(&self) -> Result<bool, FiatError> {
        let request = {
            let data = self.data.read().await;
            self.store.write().await.set_max_delta_debt(&data)?
        };
        self.recompute(request).await
    }

    pub async fn reset_collateral_and_debt_inputs(&self) -> Result<bool, FiatError> {
        let request = self.store.write().await.reset_collateral_and_debt_inputs()?;
        self.recompute(request).await
    }

    pub async fn reset(&self) -> Result<(), FiatError> {
        self.store.write().await.reset()
    }

    /// Submit the active mode's change and reset the form once it is mined.
    ///
    /// The form stays readable and editable while the transaction is pending.
    pub async fn submit(&self, transactions: &Transactions<'_, S>) -> Result<TransactionReceipt, FiatError> {
        let store = self.snapshot().await;
        let data = self.data().await;
        let planned = transactions.plan_position_change(&store, &data).await?;

        let receipt = transactions.submit_position_change(&planned).await?;
        self.store.write().await.reset()?;
        Ok(receipt)
    }

    // ─── Recompute ───────────────────────────────────────────────────────

    async fn recompute(&self, request: RecomputeRequest) -> Result<bool, FiatError> {
        let delay = self.config.debounce();
        if !delay.is_zero() {
            Delay::new(delay).await;
        }

        let state = {
            let store = self.store.read().await;
            if !store.is_latest(request.seq) {
                debug!(seq = request.seq, "input superseded before quoting");
                return Ok(false);
            }
            store.state(request.mode).clone()
        };
        let data = self.data.read().await.clone();

        let estimate = evaluate(self.sdk.as_ref(), &data, request.mode, &state, &self.config).await;
        Ok(self.store.write().await.commit(request, estimate))
    }
}
