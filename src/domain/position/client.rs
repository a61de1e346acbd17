//! Positions sub-client: account connection, portfolio and form data.

use std::collections::HashMap;

use crate::client::FiatClient;
use crate::domain::collateral_type::CollateralType;
use crate::domain::form::ModifyPositionData;
use crate::domain::position::{positions_of, proxies_of, Position, PositionSummary, UserData};
use crate::error::{FiatError, SdkError, TransactionError};
use crate::sdk::{CallOutput, FiatSdk};
use crate::shared::wad::wad_to_decimal;
use crate::shared::CollateralTypeId;
use crate::vault::approvals::{fiat_balance_call, modify_position_data_calls};
use alloy_primitives::{Address, U256};
use tracing::{debug, warn};

pub struct Positions<'a, S: FiatSdk> {
    pub(crate) client: &'a FiatClient<S>,
}

impl<'a, S: FiatSdk> Positions<'a, S> {
    async fn accounts(&self, user: Address) -> Result<Vec<UserData>, FiatError> {
        let accounts = self.client.sdk.fetch_user_data(user).await?;
        Ok(accounts.into_iter().map(UserData::from).collect())
    }

    /// Make `user` the connected account and resolve its proxies.
    pub async fn connect(&self, user: Address) -> Result<Vec<Position>, FiatError> {
        let accounts = self.accounts(user).await?;
        let proxies = proxies_of(&accounts);
        debug!(%user, proxies = proxies.len(), "connected account");
        {
            let mut ctx = self.client.user_context.write().await;
            ctx.user = Some(user);
            ctx.proxies = proxies;
        }
        Ok(positions_of(&accounts))
    }

    pub async fn disconnect(&self) {
        let mut ctx = self.client.user_context.write().await;
        ctx.user = None;
        ctx.proxies.clear();
    }

    /// Positions held by `user` or its proxies.
    pub async fn list(&self, user: Address) -> Result<Vec<Position>, FiatError> {
        Ok(positions_of(&self.accounts(user).await?))
    }

    /// Table rows for `user`'s positions, newest maturity first.
    ///
    /// Positions whose collateral type cannot be loaded are left out.
    pub async fn summaries(&self, user: Address, now: u64) -> Result<Vec<PositionSummary>, FiatError> {
        let positions = self.list(user).await?;
        if positions.is_empty() {
            return Ok(Vec::new());
        }
        let mut ids: Vec<CollateralTypeId> = Vec::new();
        for id in positions.iter().map(Position::collateral_type_id) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        let cts: HashMap<CollateralTypeId, CollateralType> = self
            .client
            .sdk
            .fetch_collateral_types_and_prices(&ids)
            .await?
            .into_iter()
            .filter_map(|resp| match CollateralType::try_from(resp) {
                Ok(ct) => Some((ct.id(), ct)),
                Err(err) => {
                    warn!(error = %err, "dropping invalid collateral type");
                    None
                }
            })
            .collect();

        let mut summaries = Vec::with_capacity(positions.len());
        for position in &positions {
            let Some(ct) = cts.get(&position.collateral_type_id()) else {
                warn!(position = %position.id(), "no collateral type for position");
                continue;
            };
            summaries.push(PositionSummary::new(position, ct, now)?);
        }
        summaries.sort_by(|a, b| b.maturity.cmp(&a.maturity));
        Ok(summaries)
    }

    /// Collateral type, current position and proxy approvals for the form.
    ///
    /// Without a connected account only the collateral type is filled in.
    pub async fn modify_position_data(&self, id: &CollateralTypeId) -> Result<ModifyPositionData, FiatError> {
        let ct = self
            .client
            .collateral_types()
            .get(id.vault, id.token_id)
            .await?;
        let ctx = self.client.user_context().await;
        let Some(user) = ctx.user else {
            return Ok(ModifyPositionData::new(ct, None));
        };

        let position = self
            .list(user)
            .await?
            .into_iter()
            .find(|p| {
                p.collateral_type_id() == *id && (p.owner == user || ctx.proxies.contains(&p.owner))
            });
        let mut data = ModifyPositionData::new(ct, position);

        if let Some(proxy) = ctx.proxy() {
            let calls = modify_position_data_calls(
                self.client.sdk.contracts(),
                &data.collateral_type,
                user,
                proxy,
            );
            let results = self.client.sdk.multicall(&calls).await?;
            let [allowance, balance, delegate, fiat_allowance] = <[CallOutput; 4]>::try_from(results)
                .map_err(|r| SdkError::Decode(format!("expected 4 results, got {}", r.len())))?;
            data.underlier_allowance = allowance.as_uint()?;
            data.underlier_balance = balance.as_uint()?;
            data.moneta_delegate = is_delegated(&delegate)?;
            data.fiat_allowance = fiat_allowance.as_uint()?;
        }
        Ok(data)
    }

    /// FIAT balance of `user`, e.g. `"1234.50 FIAT"`.
    pub async fn fiat_balance(&self, user: Address) -> Result<String, FiatError> {
        let call = fiat_balance_call(self.client.sdk.contracts(), user);
        let balance = self.client.sdk.call(&call).await?.as_uint()?;
        let value = wad_to_decimal(balance)?.round_dp(2);
        Ok(format!("{:.2} FIAT", value))
    }

    /// Require a connected account.
    pub async fn connected_user(&self) -> Result<Address, FiatError> {
        self.client
            .user_context()
            .await
            .user
            .ok_or(FiatError::Transaction(TransactionError::NotConnected))
    }
}

/// Codex `delegates` returns `1` for a delegate and `0` otherwise.
fn is_delegated(output: &CallOutput) -> Result<bool, SdkError> {
    match output {
        CallOutput::Bool(flag) => Ok(*flag),
        CallOutput::Uint(value) => Ok(*value != U256::ZERO),
        other => Err(SdkError::Decode(format!("unexpected delegates output: {:?}", other))),
    }
}
