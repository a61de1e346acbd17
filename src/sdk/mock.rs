//! Mock SDK for testing without a chain.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;

use super::{CallOutput, Contracts, FiatSdk, TransactionReceipt};
use crate::domain::collateral_type::wire::CollateralTypeResponse;
use crate::domain::position::wire::UserDataResponse;
use crate::error::SdkError;
use crate::shared::CollateralTypeId;
use crate::vault::ContractCall;

type CallHandler = Arc<dyn Fn(&ContractCall) -> Option<Result<CallOutput, SdkError>> + Send + Sync>;

/// Mock SDK that returns predefined data and records every call it receives.
#[derive(Clone)]
pub struct MockSdk {
    contracts: Contracts,
    collateral_types: Vec<CollateralTypeResponse>,
    user_data: Vec<UserDataResponse>,
    fetch_error: Option<SdkError>,
    call_results: HashMap<(Option<Address>, String), Result<CallOutput, SdkError>>,
    call_handler: Option<CallHandler>,
    dryrun_result: Result<serde_json::Value, SdkError>,
    send_result: Result<TransactionReceipt, SdkError>,
    latency: Option<Duration>,
    recorded: Arc<Mutex<Vec<RecordedCall>>>,
}

/// A call the mock received, tagged with how it was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Call(ContractCall),
    Dryrun(ContractCall),
    Send(ContractCall),
}

impl RecordedCall {
    pub fn call(&self) -> &ContractCall {
        match self {
            Self::Call(c) | Self::Dryrun(c) | Self::Send(c) => c,
        }
    }
}

impl MockSdk {
    pub fn new() -> Self {
        Self {
            contracts: Contracts::default(),
            collateral_types: Vec::new(),
            user_data: Vec::new(),
            fetch_error: None,
            call_results: HashMap::new(),
            call_handler: None,
            dryrun_result: Ok(serde_json::Value::Null),
            send_result: Ok(TransactionReceipt {
                transaction_hash: B256::repeat_byte(0xab),
                block_number: Some(1),
                status: true,
            }),
            latency: None,
            recorded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_contracts(mut self, contracts: Contracts) -> Self {
        self.contracts = contracts;
        self
    }

    pub fn with_collateral_type(mut self, ct: CollateralTypeResponse) -> Self {
        self.collateral_types.push(ct);
        self
    }

    pub fn with_collateral_types(mut self, cts: Vec<CollateralTypeResponse>) -> Self {
        self.collateral_types.extend(cts);
        self
    }

    pub fn with_user_data(mut self, data: UserDataResponse) -> Self {
        self.user_data.push(data);
        self
    }

    /// Make both fetch methods fail.
    pub fn with_fetch_error(mut self, err: SdkError) -> Self {
        self.fetch_error = Some(err);
        self
    }

    /// Result for any read call to `method`.
    pub fn with_call_result(mut self, method: &str, result: Result<CallOutput, SdkError>) -> Self {
        self.call_results.insert((None, method.to_string()), result);
        self
    }

    /// Result for read calls to `method` on a specific contract address.
    pub fn with_call_result_at(
        mut self,
        address: Address,
        method: &str,
        result: Result<CallOutput, SdkError>,
    ) -> Self {
        self.call_results
            .insert((Some(address), method.to_string()), result);
        self
    }

    /// Computes read results from the call itself. Consulted before the fixed results;
    /// returning `None` falls through to them.
    pub fn with_call_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ContractCall) -> Option<Result<CallOutput, SdkError>> + Send + Sync + 'static,
    {
        self.call_handler = Some(Arc::new(handler));
        self
    }

    pub fn with_dryrun_result(mut self, result: Result<serde_json::Value, SdkError>) -> Self {
        self.dryrun_result = result;
        self
    }

    pub fn with_send_result(mut self, result: Result<TransactionReceipt, SdkError>) -> Self {
        self.send_result = result;
        self
    }

    /// Delay every async method by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Everything received so far, in order.
    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.recorded
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of read calls (single or batched) made to `method`.
    pub fn call_count(&self, method: &str) -> usize {
        self.recorded()
            .iter()
            .filter(|r| matches!(r, RecordedCall::Call(c) if c.method == method))
            .count()
    }

    /// State-changing calls that were submitted.
    pub fn sent(&self) -> Vec<ContractCall> {
        self.recorded()
            .into_iter()
            .filter_map(|r| match r {
                RecordedCall::Send(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    fn record(&self, entry: RecordedCall) {
        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.push(entry);
        }
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            futures_timer::Delay::new(latency).await;
        }
    }

    fn resolve_call(&self, call: &ContractCall) -> Result<CallOutput, SdkError> {
        if let Some(result) = self.call_handler.as_ref().and_then(|h| h(call)) {
            return result;
        }
        self.call_results
            .get(&(Some(call.address), call.method.clone()))
            .or_else(|| self.call_results.get(&(None, call.method.clone())))
            .cloned()
            .unwrap_or_else(|| {
                Err(SdkError::Other(format!(
                    "MockSdk: no result configured for `{}`",
                    call.method
                )))
            })
    }
}

impl Default for MockSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSdk")
            .field("collateral_types", &self.collateral_types.len())
            .field("user_data", &self.user_data.len())
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FiatSdk for MockSdk {
    fn contracts(&self) -> &Contracts {
        &self.contracts
    }

    async fn fetch_collateral_types_and_prices(
        &self,
        ids: &[CollateralTypeId],
    ) -> Result<Vec<CollateralTypeResponse>, SdkError> {
        self.simulate_latency().await;
        if let Some(err) = &self.fetch_error {
            return Err(err.clone());
        }
        Ok(self
            .collateral_types
            .iter()
            .filter(|ct| {
                ids.is_empty()
                    || ids.contains(&CollateralTypeId::new(
                        ct.properties.vault,
                        ct.properties.token_id,
                    ))
            })
            .cloned()
            .collect())
    }

    async fn fetch_user_data(&self, user: Address) -> Result<Vec<UserDataResponse>, SdkError> {
        self.simulate_latency().await;
        if let Some(err) = &self.fetch_error {
            return Err(err.clone());
        }
        Ok(self
            .user_data
            .iter()
            .filter(|u| u.user == user || u.is_proxy)
            .cloned()
            .collect())
    }

    async fn call(&self, call: &ContractCall) -> Result<CallOutput, SdkError> {
        self.simulate_latency().await;
        self.record(RecordedCall::Call(call.clone()));
        self.resolve_call(call)
    }

    async fn multicall(&self, calls: &[ContractCall]) -> Result<Vec<CallOutput>, SdkError> {
        self.simulate_latency().await;
        calls
            .iter()
            .map(|call| {
                self.record(RecordedCall::Call(call.clone()));
                self.resolve_call(call)
            })
            .collect()
    }

    async fn dryrun(&self, call: &ContractCall) -> Result<serde_json::Value, SdkError> {
        self.simulate_latency().await;
        self.record(RecordedCall::Dryrun(call.clone()));
        self.dryrun_result.clone()
    }

    async fn send_and_wait(&self, call: &ContractCall) -> Result<TransactionReceipt, SdkError> {
        self.simulate_latency().await;
        self.record(RecordedCall::Send(call.clone()));
        self.send_result.clone()
    }
}
