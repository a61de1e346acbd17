//! Form state container: app-owned, SDK-provided update logic.
//!
//! Setters record the user's input and hand back a [`RecomputeRequest`].
//! The caller runs the valuation engine on a snapshot and passes the result
//! to [`ModifyPositionStore::commit`], which drops it if a newer request has
//! been issued in the meantime.

use alloy_primitives::U256;
use rust_decimal::Decimal;

use super::{
    parse_amount_input, parse_slippage_input, FormFeedback, FormStatus, ModeState,
    ModifyPositionData, Mode,
};
use crate::config::PositionsConfig;
use crate::error::FiatError;
use crate::shared::wad::{dec_to_wad, normal_debt_to_debt, WAD};
use crate::valuation::Estimate;

/// Ticket for one recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecomputeRequest {
    pub seq: u64,
    pub mode: Mode,
}

/// Per-mode form state for one selected collateral type.
#[derive(Debug, Clone)]
pub struct ModifyPositionStore {
    config: PositionsConfig,
    mode: Mode,
    create: ModeState,
    increase: ModeState,
    decrease: ModeState,
    redeem: ModeState,
    feedback: FormFeedback,
    status: FormStatus,
    seq: u64,
}

impl ModifyPositionStore {
    pub fn new(config: PositionsConfig) -> Result<Self, FiatError> {
        let initial = ModeState::initial(&config)?;
        Ok(Self {
            config,
            mode: Mode::default(),
            create: initial.clone(),
            increase: initial.clone(),
            decrease: initial.clone(),
            redeem: initial,
            feedback: FormFeedback::default(),
            status: FormStatus::Idle,
            seq: 0,
        })
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self, mode: Mode) -> &ModeState {
        match mode {
            Mode::Create => &self.create,
            Mode::Increase => &self.increase,
            Mode::Decrease => &self.decrease,
            Mode::Redeem => &self.redeem,
        }
    }

    /// State of the active mode.
    pub fn active(&self) -> &ModeState {
        self.state(self.mode)
    }

    pub fn feedback(&self) -> &FormFeedback {
        &self.feedback
    }

    pub fn status(&self) -> FormStatus {
        self.status
    }

    pub fn form_data_loading(&self) -> bool {
        self.status == FormStatus::Computing
    }

    pub fn config(&self) -> &PositionsConfig {
        &self.config
    }

    /// Last issued sequence number.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.seq
    }

    fn state_mut(&mut self, mode: Mode) -> &mut ModeState {
        match mode {
            Mode::Create => &mut self.create,
            Mode::Increase => &mut self.increase,
            Mode::Decrease => &mut self.decrease,
            Mode::Redeem => &mut self.redeem,
        }
    }

    fn initial(&self) -> Result<ModeState, FiatError> {
        Ok(ModeState::initial(&self.config)?)
    }

    fn request(&mut self) -> RecomputeRequest {
        self.seq += 1;
        self.feedback.clear();
        self.status = FormStatus::Computing;
        RecomputeRequest {
            seq: self.seq,
            mode: self.mode,
        }
    }

    fn update(&mut self, apply: impl FnOnce(&mut ModeState)) -> RecomputeRequest {
        let mode = self.mode;
        apply(self.state_mut(mode));
        self.request()
    }

    // ─── Setters ─────────────────────────────────────────────────────────

    pub fn set_mode(&mut self, mode: Mode) -> RecomputeRequest {
        self.mode = mode;
        self.request()
    }

    pub fn set_underlier(&mut self, input: &str, data: &ModifyPositionData) -> Result<RecomputeRequest, FiatError> {
        let scale = data.collateral_type.properties.underlier_scale;
        let value = match parse_amount_input(input, scale, self.config.input_precision)? {
            Some(v) => v,
            None => self.initial()?.underlier,
        };
        Ok(self.update(|s| s.underlier = value))
    }

    pub fn set_max_underlier(&mut self, data: &ModifyPositionData) -> RecomputeRequest {
        let balance = data.underlier_balance;
        self.update(|s| s.underlier = balance)
    }

    /// Slippage in percent, e.g. `"0.5"` for 0.5%.
    pub fn set_slippage_pct(&mut self, input: &str) -> Result<RecomputeRequest, FiatError> {
        let value = match parse_slippage_input(input, self.config.max_slippage_pct, self.config.input_precision)? {
            Some(v) => v,
            None => self.initial()?.slippage_pct,
        };
        Ok(self.update(|s| s.slippage_pct = value))
    }

    pub fn set_targeted_coll_ratio(&mut self, ratio: Decimal) -> Result<RecomputeRequest, FiatError> {
        let value = dec_to_wad(ratio.max(Decimal::ZERO))?;
        Ok(self.update(|s| s.targeted_coll_ratio = value))
    }

    pub fn set_delta_collateral(&mut self, input: &str) -> Result<RecomputeRequest, FiatError> {
        let value = match parse_amount_input(input, WAD, self.config.input_precision)? {
            Some(v) => v,
            None => self.initial()?.delta_collateral,
        };
        Ok(self.update(|s| s.delta_collateral = value))
    }

    /// Withdraw all collateral of the current position.
    pub fn set_max_delta_collateral(&mut self, data: &ModifyPositionData) -> RecomputeRequest {
        let collateral = data.position.as_ref().map_or(U256::ZERO, |p| p.collateral);
        self.update(|s| s.delta_collateral = collateral)
    }

    pub fn set_delta_debt(&mut self, input: &str) -> Result<RecomputeRequest, FiatError> {
        let value = match parse_amount_input(input, WAD, self.config.input_precision)? {
            Some(v) => v,
            None => self.initial()?.delta_debt,
        };
        Ok(self.update(|s| s.delta_debt = value))
    }

    /// Repay all debt of the current position at the current virtual rate.
    pub fn set_max_delta_debt(&mut self, data: &ModifyPositionData) -> Result<RecomputeRequest, FiatError> {
        let normal_debt = data.position.as_ref().map_or(U256::ZERO, |p| p.normal_debt);
        let debt = normal_debt_to_debt(normal_debt, data.collateral_type.virtual_rate)?;
        Ok(self.update(|s| s.delta_debt = debt))
    }

    pub fn reset_collateral_and_debt_inputs(&mut self) -> Result<RecomputeRequest, FiatError> {
        let initial = self.initial()?;
        Ok(self.update(|s| {
            s.delta_collateral = initial.delta_collateral;
            s.delta_debt = initial.delta_debt;
            s.underlier = initial.underlier;
        }))
    }

    /// Back to the initial state. Any in-flight recomputation is invalidated.
    pub fn reset(&mut self) -> Result<(), FiatError> {
        let initial = self.initial()?;
        self.mode = Mode::default();
        self.create = initial.clone();
        self.increase = initial.clone();
        self.decrease = initial.clone();
        self.redeem = initial;
        self.feedback.clear();
        self.status = FormStatus::Idle;
        self.seq += 1;
        Ok(())
    }

    // ─── Submission ──────────────────────────────────────────────────────

    /// Fails while the estimate is loading, when it carries errors, or when
    /// the active mode would change nothing.
    pub fn ensure_submittable(&self) -> Result<(), FiatError> {
        if self.form_data_loading() {
            return Err(FiatError::Validation("Position estimate is still loading".to_string()));
        }
        if let Some(error) = self.feedback.errors.first() {
            return Err(FiatError::Validation(error.clone()));
        }
        let s = self.active();
        let nothing_to_do = match self.mode {
            Mode::Create => s.underlier.is_zero() || s.delta_collateral.is_zero(),
            Mode::Increase => s.underlier.is_zero() && s.delta_debt.is_zero(),
            Mode::Decrease | Mode::Redeem => s.delta_collateral.is_zero() && s.delta_debt.is_zero(),
        };
        if nothing_to_do {
            return Err(FiatError::Validation("Nothing to submit".to_string()));
        }
        Ok(())
    }

    // ─── Results ─────────────────────────────────────────────────────────

    /// Apply an estimate produced for `request`.
    ///
    /// Returns `false` and leaves the store untouched when `request` has been
    /// superseded.
    pub fn commit(&mut self, request: RecomputeRequest, estimate: Estimate) -> bool {
        if !self.is_latest(request.seq) {
            tracing::debug!(
                seq = request.seq,
                latest = self.seq,
                mode = %request.mode,
                "discarding stale estimate"
            );
            return false;
        }
        self.status = if estimate.feedback.errors.is_empty() {
            FormStatus::Ready
        } else {
            FormStatus::Error
        };
        self.feedback = estimate.feedback;
        *self.state_mut(request.mode) = estimate.state;
        true
    }
}
