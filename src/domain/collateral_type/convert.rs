//! Conversion: CollateralTypeResponse → CollateralType (TryFrom + validation).

use super::wire;
use super::{
    CollateralType, EptData, FcData, FyData, Metadata, Properties, SptData, ValidationError,
};
use crate::shared::CollateralTypeId;
use alloy_primitives::U256;

impl TryFrom<wire::CollateralTypeResponse> for CollateralType {
    type Error = ValidationError;

    fn try_from(source: wire::CollateralTypeResponse) -> Result<Self, Self::Error> {
        let mut errors: Vec<ValidationError> = Vec::new();
        let props = source.properties;
        let id = CollateralTypeId::new(props.vault, props.token_id).to_string();

        let token_scale = props.token_scale.unwrap_or_else(|| {
            errors.push(ValidationError::MissingTokenScale);
            U256::ZERO
        });
        if props.token_scale == Some(U256::ZERO) {
            errors.push(ValidationError::ZeroScale("token scale"));
        }
        let underlier_scale = props.underlier_scale.unwrap_or_else(|| {
            errors.push(ValidationError::MissingUnderlierScale);
            U256::ZERO
        });
        if props.underlier_scale == Some(U256::ZERO) {
            errors.push(ValidationError::ZeroScale("underlier scale"));
        }
        let virtual_rate = source.state.codex.virtual_rate.unwrap_or_else(|| {
            errors.push(ValidationError::MissingVirtualRate);
            U256::ZERO
        });
        if source.state.codex.virtual_rate == Some(U256::ZERO) {
            errors.push(ValidationError::ZeroScale("virtual rate"));
        }
        let fair_price = source.state.collybus.fair_price.unwrap_or_else(|| {
            errors.push(ValidationError::MissingFairPrice);
            U256::ZERO
        });

        if !errors.is_empty() {
            return Err(ValidationError::Multiple(id, errors));
        }

        Ok(CollateralType {
            properties: Properties {
                vault: props.vault,
                token_id: props.token_id,
                name: props.name,
                vault_type: props.vault_type,
                token: props.token,
                token_scale,
                underlier_token: props.underlier_token,
                underlier_scale,
                underlier_symbol: props.underlier_symbol,
                maturity: props.maturity,
                ept_data: props.ept_data.map(|d| EptData {
                    balancer_vault: d.balancer_vault,
                    pool_id: d.pool_id,
                }),
                fc_data: props.fc_data.map(|d| FcData {
                    notional: d.notional,
                    tenor: d.tenor,
                }),
                fy_data: props.fy_data.map(|d| FyData {
                    yield_space_pool: d.yield_space_pool,
                }),
                spt_data: props.spt_data.map(|d| SptData {
                    adapter: d.adapter,
                    maturity: d.maturity,
                    target: d.target,
                    space_pool: d.space_pool,
                    balancer_vault: d.balancer_vault,
                }),
            },
            debt_floor: source.settings.codex.debt_floor.unwrap_or(U256::ZERO),
            debt_ceiling: source.settings.codex.debt_ceiling,
            liquidation_ratio: source.settings.collybus.liquidation_ratio,
            virtual_rate,
            fair_price,
            // No publican entry means no interest accrues.
            interest_per_second: source
                .state
                .publican
                .interest_per_second
                .unwrap_or(crate::shared::WAD),
            metadata: source.metadata.map(|m| {
                let urls = m.urls.unwrap_or_default();
                Metadata {
                    protocol: m.protocol,
                    asset: m.asset,
                    symbol: m.symbol,
                    project_url: urls.project,
                    asset_url: urls.asset,
                }
            }),
            earnable_rate: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collateral_type::VaultKind;
    use crate::shared::VaultType;

    fn response_json() -> serde_json::Value {
        serde_json::json!({
            "properties": {
                "vault": "0x1111111111111111111111111111111111111111",
                "tokenId": "0",
                "name": "VaultEPT_ePyvUSDC",
                "vaultType": "ERC20:EPT",
                "token": "0x1212121212121212121212121212121212121212",
                "tokenScale": "1000000",
                "underlierToken": "0x1313131313131313131313131313131313131313",
                "underlierScale": "1000000",
                "underlierSymbol": "USDC",
                "maturity": "1700000000",
                "eptData": {
                    "balancerVault": "0x2121212121212121212121212121212121212121",
                    "poolId": "0x2222222222222222222222222222222222222222222222222222222222222222"
                }
            },
            "settings": { "codex": { "debtFloor": "1000000000000000000" } },
            "state": {
                "codex": { "virtualRate": "1000000000000000000" },
                "collybus": { "fairPrice": "990000000000000000" },
                "publican": { "interestPerSecond": "1000000000937303470" }
            },
            "metadata": {
                "protocol": "Element",
                "asset": "ePyvUSDC",
                "symbol": "eP:yvUSDC",
                "urls": { "project": "https://element.fi" }
            }
        })
    }

    #[test]
    fn test_convert_full_response() {
        let response: wire::CollateralTypeResponse = serde_json::from_value(response_json()).unwrap();
        let ct = CollateralType::try_from(response).unwrap();
        assert_eq!(ct.properties.vault_type, VaultType::Ept);
        assert_eq!(ct.properties.token_scale, U256::from(1_000_000u64));
        assert_eq!(ct.properties.maturity, 1_700_000_000);
        assert!(matches!(ct.vault_kind(), VaultKind::Ept(_)));
        assert_eq!(ct.symbol(), Some("eP:yvUSDC"));
        assert_eq!(
            ct.metadata.as_ref().and_then(|m| m.project_url.as_deref()),
            Some("https://element.fi")
        );
    }

    #[test]
    fn test_convert_aggregates_errors() {
        let mut json = response_json();
        json["properties"]["tokenScale"] = serde_json::Value::Null;
        json["state"]["codex"]["virtualRate"] = serde_json::Value::Null;
        let response: wire::CollateralTypeResponse = serde_json::from_value(json).unwrap();
        match CollateralType::try_from(response) {
            Err(ValidationError::Multiple(_, errors)) => {
                assert_eq!(
                    errors,
                    vec![ValidationError::MissingTokenScale, ValidationError::MissingVirtualRate]
                );
            }
            other => panic!("expected Multiple, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_vault_type_is_kept() {
        let mut json = response_json();
        json["properties"]["vaultType"] = "ERC721:NFT".into();
        let response: wire::CollateralTypeResponse = serde_json::from_value(json).unwrap();
        let ct = CollateralType::try_from(response).unwrap();
        assert_eq!(ct.vault_kind(), VaultKind::Unsupported("ERC721:NFT"));
    }
}
