//! Collateral types sub-client: fetch, earnable rates, cache.

use crate::client::FiatClient;
use crate::domain::collateral_type::{self, CollateralType};
use crate::error::FiatError;
use crate::sdk::FiatSdk;
use crate::shared::CollateralTypeId;
use crate::vault::previews::earnable_rates;
use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, warn};

/// A cache entry stamped in the future counts as stale.
fn is_fresh(fetched_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    (now - fetched_at).to_std().is_ok_and(|age| age < ttl)
}

/// Sub-client for collateral type queries.
pub struct CollateralTypes<'a, S: FiatSdk> {
    pub(crate) client: &'a FiatClient<S>,
}

impl<'a, S: FiatSdk> CollateralTypes<'a, S> {
    /// All listed collateral types, newest maturity first, with earnable
    /// rates attached. Uses TTL cache.
    ///
    /// Types without metadata are not listed.
    pub async fn list(&self) -> Result<Vec<CollateralType>, FiatError> {
        {
            let cache = self.client.collateral_type_cache.read().await;
            if let Some((cts, fetched_at)) = cache.as_ref() {
                if is_fresh(*fetched_at, Utc::now(), self.client.config.collateral_type_cache_ttl()) {
                    return Ok(cts.clone());
                }
            }
        }

        let responses = self.client.sdk.fetch_collateral_types_and_prices(&[]).await?;
        let mut cts: Vec<CollateralType> = responses
            .into_iter()
            .filter_map(|resp| match CollateralType::try_from(resp) {
                Ok(ct) => Some(ct),
                Err(err) => {
                    warn!(error = %err, "dropping invalid collateral type");
                    None
                }
            })
            .filter(|ct| ct.metadata.is_some())
            .collect();
        cts.sort_by(|a, b| b.properties.maturity.cmp(&a.properties.maturity));

        match earnable_rates(self.client.sdk.as_ref(), &cts, self.client.now()).await {
            Ok(rates) => {
                for (id, rate) in rates {
                    if let Some(ct) = cts.iter_mut().find(|ct| ct.id() == id) {
                        ct.earnable_rate = Some(rate);
                    }
                }
            }
            Err(err) => warn!(error = %err, "earnable rates unavailable"),
        }

        debug!(count = cts.len(), "cached collateral types");
        *self.client.collateral_type_cache.write().await = Some((cts.clone(), Utc::now()));
        Ok(cts)
    }

    /// A single collateral type, listed or not.
    pub async fn get(&self, vault: Address, token_id: U256) -> Result<CollateralType, FiatError> {
        let id = CollateralTypeId::new(vault, token_id);
        {
            let cache = self.client.collateral_type_cache.read().await;
            if let Some((cts, fetched_at)) = cache.as_ref() {
                if is_fresh(*fetched_at, Utc::now(), self.client.config.collateral_type_cache_ttl()) {
                    if let Some(ct) = cts.iter().find(|ct| ct.id() == id) {
                        return Ok(ct.clone());
                    }
                }
            }
        }

        let resp = self
            .client
            .sdk
            .fetch_collateral_types_and_prices(std::slice::from_ref(&id))
            .await?
            .into_iter()
            .find(|resp| CollateralTypeId::new(resp.properties.vault, resp.properties.token_id) == id)
            .ok_or_else(|| FiatError::NotFound(format!("Collateral type not found: {}", id)))?;
        resp.try_into()
            .map_err(|e: collateral_type::ValidationError| FiatError::Validation(e.to_string()))
    }

    pub async fn clear_cache(&self) {
        *self.client.collateral_type_cache.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_freshness() {
        let ttl = Duration::from_secs(60);
        let fetched_at = Utc::now();
        assert!(is_fresh(fetched_at, fetched_at + chrono::Duration::seconds(59), ttl));
        assert!(!is_fresh(fetched_at, fetched_at + chrono::Duration::seconds(60), ttl));
        assert!(!is_fresh(fetched_at, fetched_at - chrono::Duration::seconds(1), ttl));
        assert!(!is_fresh(fetched_at, fetched_at, Duration::ZERO));
    }
}
