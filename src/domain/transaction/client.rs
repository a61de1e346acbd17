//! Transactions sub-client: submit, dry-run, proxy and approval setup.
//!
//! One transaction is tracked at a time. A second submission while the first
//! is still `Sent` is rejected instead of queued.

use crate::client::FiatClient;
use crate::domain::collateral_type::CollateralType;
use crate::domain::form::{ModifyPositionData, ModifyPositionStore};
use crate::domain::transaction::{TransactionData, TransactionStatus, TxAction};
use crate::error::{DispatchError, FiatError, TransactionError};
use crate::sdk::{FiatSdk, TransactionReceipt};
use crate::vault::approvals::{
    current_proxy_call, deploy_proxy_call, set_fiat_allowance_call, set_moneta_delegate_call,
    set_underlier_allowance_call, unset_fiat_allowance_call, unset_moneta_delegate_call,
    unset_underlier_allowance_call,
};
use crate::vault::{plan_submission, ActionContext, ContractCall, PlannedSubmission};
use alloy_primitives::{Address, U256};
use tracing::{info, warn};

pub struct Transactions<'a, S: FiatSdk> {
    pub(crate) client: &'a FiatClient<S>,
}

impl<'a, S: FiatSdk> Transactions<'a, S> {
    pub async fn status(&self) -> TransactionData {
        self.client.transaction.read().await.clone()
    }

    /// Send `call` and wait for it to be mined.
    ///
    /// The slot goes back to idle on success and to `Error` on failure.
    pub async fn submit(&self, action: TxAction, call: &ContractCall) -> Result<TransactionReceipt, TransactionError> {
        {
            let mut tx = self.client.transaction.write().await;
            if tx.is_pending() {
                return Err(TransactionError::AlreadyPending);
            }
            *tx = TransactionData::sent(action);
        }
        info!(%action, method = %call.method, "transaction sent");

        let result = match self.client.sdk.send_and_wait(call).await {
            Ok(receipt) if receipt.status => Ok(receipt),
            Ok(receipt) => Err(TransactionError::Failed {
                message: format!("transaction {} reverted", receipt.transaction_hash),
            }),
            Err(err) => Err(TransactionError::from(err)),
        };

        let mut tx = self.client.transaction.write().await;
        match &result {
            Ok(receipt) => {
                info!(%action, hash = %receipt.transaction_hash, "transaction confirmed");
                *tx = TransactionData::default();
            }
            Err(err) => {
                warn!(%action, error = %err, "transaction failed");
                tx.status = Some(TransactionStatus::Error);
            }
        }
        result
    }

    /// Simulate `call` without sending it. Does not touch the status slot.
    pub async fn dryrun(&self, action: TxAction, call: &ContractCall) -> Result<serde_json::Value, TransactionError> {
        info!(%action, method = %call.method, "dry-running transaction");
        Ok(self.client.sdk.dryrun(call).await?)
    }

    /// Plan the change described by the form's active mode.
    ///
    /// Rejects a form that is loading, carries errors or changes nothing,
    /// and a change the proxy lacks the approvals for.
    pub async fn plan_position_change(
        &self,
        store: &ModifyPositionStore,
        data: &ModifyPositionData,
    ) -> Result<PlannedSubmission, FiatError> {
        store.ensure_submittable()?;

        let ctx = self.client.user_context().await;
        let user = ctx.user.ok_or(TransactionError::NotConnected)?;
        let mut action_ctx =
            ActionContext::new(self.client.sdk.contracts(), user, &self.client.config, self.client.now());
        if let Some(proxy) = ctx.proxy() {
            action_ctx = action_ctx.with_proxy(proxy);
        }

        let planned = plan_submission(&action_ctx, store.mode(), store.active(), data)?;
        data.ensure_approved(store.mode(), store.active())?;
        Ok(planned)
    }

    /// Send a planned position change and wait for it to be mined.
    pub async fn submit_position_change(
        &self,
        planned: &PlannedSubmission,
    ) -> Result<TransactionReceipt, FiatError> {
        Ok(self.submit(planned.action, &planned.call).await?)
    }

    // ─── Proxy and approvals ─────────────────────────────────────────────

    /// Deploy a proxy for the connected account and record it.
    pub async fn create_proxy(&self) -> Result<Address, FiatError> {
        let user = self.client.positions().connected_user().await?;
        let contracts = self.client.sdk.contracts();
        self.submit(TxAction::CreateProxy, &deploy_proxy_call(contracts, user))
            .await?;

        let proxy = self
            .client
            .sdk
            .call(&current_proxy_call(contracts, user))
            .await?
            .as_address()?;
        info!(%user, %proxy, "proxy deployed");
        self.client.user_context.write().await.proxies = vec![proxy];
        Ok(proxy)
    }

    async fn proxy(&self) -> Result<Address, TransactionError> {
        self.client
            .user_context()
            .await
            .proxy()
            .ok_or(TransactionError::Dispatch(DispatchError::MissingProxy))
    }

    /// Let the proxy pull `underlier` plus one unit of headroom.
    pub async fn set_underlier_allowance(
        &self,
        ct: &CollateralType,
        underlier: U256,
    ) -> Result<TransactionReceipt, TransactionError> {
        let call = set_underlier_allowance_call(ct, self.proxy().await?, underlier);
        self.submit(TxAction::SetUnderlierAllowance, &call).await
    }

    pub async fn unset_underlier_allowance(&self, ct: &CollateralType) -> Result<TransactionReceipt, TransactionError> {
        let call = unset_underlier_allowance_call(ct, self.proxy().await?);
        self.submit(TxAction::UnsetUnderlierAllowance, &call).await
    }

    /// Let the proxy pull `delta_debt` FIAT plus one FIAT of headroom.
    pub async fn set_fiat_allowance(&self, delta_debt: U256) -> Result<TransactionReceipt, TransactionError> {
        let call = set_fiat_allowance_call(self.client.sdk.contracts(), self.proxy().await?, delta_debt);
        self.submit(TxAction::SetFiatAllowance, &call).await
    }

    pub async fn unset_fiat_allowance(&self) -> Result<TransactionReceipt, TransactionError> {
        let call = unset_fiat_allowance_call(self.client.sdk.contracts(), self.proxy().await?);
        self.submit(TxAction::UnsetFiatAllowance, &call).await
    }

    /// Grant Moneta a Codex delegate from the connected account.
    pub async fn set_moneta_delegate(&self) -> Result<TransactionReceipt, TransactionError> {
        let call = set_moneta_delegate_call(self.client.sdk.contracts());
        self.submit(TxAction::SetMonetaDelegate, &call).await
    }

    pub async fn unset_moneta_delegate(&self) -> Result<TransactionReceipt, TransactionError> {
        let call = unset_moneta_delegate_call(self.client.sdk.contracts());
        self.submit(TxAction::UnsetMonetaDelegate, &call).await
    }
}
