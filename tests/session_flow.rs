//! Client and session flows against the mock SDK.

mod common;

use std::time::Duration;

use alloy_primitives::{Address, U256};
use common::*;
use fiat_positions::prelude::*;
use fiat_positions::sdk::mock::MockSdk;
use fiat_positions::shared::wad::to_signed;
use fiat_positions::vault::constants::{
    ALLOWANCE, BALANCE_OF, BUY_COLLATERAL_AND_MODIFY_DEBT, DELEGATES, DEPLOY_FOR,
    GET_CURRENT_PROXY, UNDERLIER_TO_FY_TOKEN,
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

const NOW: u64 = 1_900_000_000;

fn client(sdk: MockSdk, debounce_ms: u64) -> FiatClient<MockSdk> {
    FiatClient::builder()
        .sdk(sdk)
        .config(PositionsConfig::default().debounce_ms(debounce_ms))
        .build()
        .unwrap()
}

fn fy_form_data() -> ModifyPositionData {
    let ct = CollateralType::try_from(fy_collateral_type(0x11, MATURITY, true)).unwrap();
    ModifyPositionData::new(ct, None)
}

fn position_json(vault: u8, owner: Address, collateral: &str, normal_debt: &str) -> serde_json::Value {
    json!({
        "vault": addr(vault),
        "tokenId": "0",
        "owner": owner,
        "collateral": wad(collateral).to_string(),
        "normalDebt": wad(normal_debt).to_string(),
    })
}

// ─── Full flow ───────────────────────────────────────────────────────────────

fn connected_sdk() -> MockSdk {
    mock_sdk()
        .with_collateral_type(fy_collateral_type(0x11, MATURITY, true))
        .with_collateral_type(fy_collateral_type(0x21, MATURITY + 86_400, true))
        .with_collateral_type(fy_collateral_type(0x31, MATURITY, false))
        .with_user_data(user_data(USER, false, json!([])))
        .with_user_data(user_data(PROXY, true, json!([])))
        .with_call_handler(quotes(500))
        .with_call_result_at(UNDERLIER, ALLOWANCE, Ok(CallOutput::Uint(usdc(5000))))
        .with_call_result(BALANCE_OF, Ok(CallOutput::Uint(usdc(2000))))
        .with_call_result(DELEGATES, Ok(CallOutput::Uint(U256::from(1u8))))
        .with_call_result_at(contracts().fiat, ALLOWANCE, Ok(CallOutput::Uint(wad("10000"))))
}

#[tokio::test]
async fn test_create_position_end_to_end() {
    let client = client(connected_sdk(), 0);

    let positions = client.positions().connect(USER).await.unwrap();
    assert!(positions.is_empty());
    assert_eq!(client.user_context().await.proxy(), Some(PROXY));

    let listed = client.collateral_types().list().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].properties.vault, Address::repeat_byte(0x21));
    assert_eq!(listed[1].properties.vault, Address::repeat_byte(0x11));
    let five_percent = to_signed(wad("0.05")).unwrap();
    assert!(listed.iter().all(|ct| ct.earnable_rate == Some(five_percent)));

    let data = client.positions().modify_position_data(&listed[1].id()).await.unwrap();
    assert_eq!(data.position, None);
    assert_eq!(data.underlier_allowance, usdc(5000));
    assert_eq!(data.underlier_balance, usdc(2000));
    assert!(data.moneta_delegate);
    assert_eq!(data.fiat_allowance, wad("10000"));

    let session = client.session(data).unwrap();
    assert!(session.set_mode(Mode::Create).await.unwrap());
    assert!(session.set_underlier("1000").await.unwrap());

    let store = session.snapshot().await;
    assert_eq!(store.status(), FormStatus::Ready);
    assert!(store.feedback().is_empty());
    assert_eq!(store.active().delta_collateral, wad("1048.95"));
    assert_eq!(store.active().delta_debt, wad("874.125"));

    let receipt = assert_ok!(session.submit(&client.transactions()).await);
    assert!(receipt.status);

    let sent = client.sdk().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, BUY_COLLATERAL_AND_MODIFY_DEBT);
    assert_eq!(sent[0].via_proxy, Some(PROXY));
    assert_eq!(sent[0].arg(4), Some(&CallArg::Uint(usdc(1000))));
    assert!(client.transactions().status().await.is_idle());

    let store = session.snapshot().await;
    assert_eq!(store.mode(), Mode::Increase);
    assert_eq!(store.status(), FormStatus::Idle);
    assert_eq!(store.state(Mode::Create).underlier, U256::ZERO);
}

#[tokio::test]
async fn test_listing_is_cached_until_cleared() {
    let client = client(connected_sdk(), 0);

    client.collateral_types().list().await.unwrap();
    client.collateral_types().list().await.unwrap();
    assert_eq!(client.sdk().call_count(UNDERLIER_TO_FY_TOKEN), 2);

    client.collateral_types().clear_cache().await;
    client.collateral_types().list().await.unwrap();
    assert_eq!(client.sdk().call_count(UNDERLIER_TO_FY_TOKEN), 4);
}

#[tokio::test]
async fn test_form_data_without_account_skips_approvals() {
    let client = client(connected_sdk(), 0);
    let id = CollateralType::try_from(fy_collateral_type(0x11, MATURITY, true))
        .unwrap()
        .id();

    let data = client.positions().modify_position_data(&id).await.unwrap();
    assert_eq!(data.underlier_balance, U256::ZERO);
    assert!(!data.moneta_delegate);
    assert!(client.sdk().recorded().is_empty());
}

#[tokio::test]
async fn test_unknown_collateral_type_is_not_found() {
    let client = client(connected_sdk(), 0);
    let err = client
        .collateral_types()
        .get(Address::repeat_byte(0x77), U256::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, FiatError::NotFound(_)));
}

// ─── Debounce and staleness ──────────────────────────────────────────────────

#[tokio::test]
async fn test_rapid_inputs_are_coalesced() {
    let client = client(mock_sdk().with_call_handler(quotes(0)), 50);
    let session = client.session(fy_form_data()).unwrap();

    let (a, b, c) = tokio::join!(
        session.set_underlier("1"),
        session.set_underlier("10"),
        session.set_underlier("100"),
    );
    assert_eq!((a.unwrap(), b.unwrap(), c.unwrap()), (false, false, true));
    assert_eq!(client.sdk().call_count(UNDERLIER_TO_FY_TOKEN), 1);

    let store = session.snapshot().await;
    assert_eq!(store.active().underlier, usdc(100));
    assert_eq!(store.active().delta_collateral, wad("99.9"));
}

#[tokio::test]
async fn test_slow_quote_is_discarded_when_input_moves_on() {
    let sdk = mock_sdk()
        .with_call_handler(quotes(0))
        .with_latency(Duration::from_millis(20));
    let client = client(sdk, 0);
    let session = client.session(fy_form_data()).unwrap();

    let (first, second) = tokio::join!(session.set_underlier("100"), session.set_underlier("200"));
    assert!(!first.unwrap());
    assert!(second.unwrap());
    assert_eq!(client.sdk().call_count(UNDERLIER_TO_FY_TOKEN), 2);

    let store = session.snapshot().await;
    assert_eq!(store.active().underlier, usdc(200));
    assert_eq!(store.active().delta_collateral, wad("199.8"));
    assert_eq!(store.status(), FormStatus::Ready);
}

#[tokio::test]
async fn test_invalid_input_leaves_form_untouched() {
    let client = client(mock_sdk().with_call_handler(quotes(0)), 0);
    let session = client.session(fy_form_data()).unwrap();
    session.set_underlier("5").await.unwrap();
    let before = session.snapshot().await;

    let err = session.set_underlier("abc").await.unwrap_err();
    assert!(matches!(err, FiatError::Validation(_)));
    let after = session.snapshot().await;
    assert_eq!(after.active(), before.active());
    assert_eq!(after.seq(), before.seq());
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_form_errors_block_submission() {
    let sdk = connected_sdk();
    let client = client(sdk, 0);
    client.positions().connect(USER).await.unwrap();
    let session = client.session(fy_form_data()).unwrap();
    session.set_mode(Mode::Create).await.unwrap();
    session.set_underlier("1").await.unwrap();
    assert_eq!(session.snapshot().await.status(), FormStatus::Error);

    let err = session.submit(&client.transactions()).await.unwrap_err();
    assert!(matches!(err, FiatError::Validation(msg) if msg.contains("minimum of 1 FIAT")));
    assert!(client.sdk().sent().is_empty());
}

#[tokio::test]
async fn test_untouched_form_sends_nothing() {
    let client = client(connected_sdk(), 0);
    client.positions().connect(USER).await.unwrap();
    let data = client.positions().modify_position_data(&fy_form_data().collateral_type.id()).await.unwrap();
    let session = client.session(data).unwrap();
    session.set_mode(Mode::Create).await.unwrap();

    let err = assert_err!(session.submit(&client.transactions()).await);
    assert!(matches!(err, FiatError::Validation(msg) if msg == "Nothing to submit"));
    assert!(client.sdk().sent().is_empty());
}

#[tokio::test]
async fn test_missing_approvals_block_submission() {
    let client = client(connected_sdk(), 0);
    client.positions().connect(USER).await.unwrap();

    let session = client.session(fy_form_data()).unwrap();
    session.set_mode(Mode::Create).await.unwrap();
    session.set_underlier("1000").await.unwrap();
    let err = assert_err!(session.submit(&client.transactions()).await);
    assert!(matches!(err, FiatError::Validation(msg) if msg.contains("Moneta delegate")));

    let mut data = fy_form_data();
    data.moneta_delegate = true;
    data.underlier_allowance = usdc(999);
    session.refresh_data(data).await.unwrap();
    let err = assert_err!(session.submit(&client.transactions()).await);
    assert!(matches!(err, FiatError::Validation(msg) if msg.contains("underlier allowance")));

    assert!(client.sdk().sent().is_empty());
}

#[tokio::test]
async fn test_form_is_readable_while_transaction_is_mined() {
    let sdk = connected_sdk().with_latency(Duration::from_millis(200));
    let client = client(sdk, 0);
    client.positions().connect(USER).await.unwrap();
    let data = client.positions().modify_position_data(&fy_form_data().collateral_type.id()).await.unwrap();
    let session = client.session(data).unwrap();
    session.set_mode(Mode::Create).await.unwrap();
    session.set_underlier("1000").await.unwrap();

    let tx = client.transactions();
    let (submitted, (pending, waited, status)) = tokio::join!(session.submit(&tx), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let started = std::time::Instant::now();
        let store = session.snapshot().await;
        let waited = started.elapsed();
        (tx.status().await.is_pending(), waited, store.status())
    });

    assert!(pending);
    assert!(waited < Duration::from_millis(100), "snapshot blocked for {waited:?}");
    assert_eq!(status, FormStatus::Ready);
    assert_ok!(submitted);
    assert_eq!(session.snapshot().await.status(), FormStatus::Idle);
}

#[tokio::test]
async fn test_buying_without_proxy_fails_to_plan() {
    let sdk = connected_sdk();
    let client = FiatClient::builder()
        .sdk(sdk)
        .config(PositionsConfig::default().debounce_ms(0))
        .user(USER)
        .build()
        .unwrap();
    let session = client.session(fy_form_data()).unwrap();
    session.set_mode(Mode::Create).await.unwrap();
    session.set_underlier("1000").await.unwrap();

    let err = session.submit(&client.transactions()).await.unwrap_err();
    assert!(matches!(err, FiatError::Dispatch(DispatchError::MissingProxy)));
    assert!(client.sdk().sent().is_empty());
}

#[tokio::test]
async fn test_second_submission_while_pending_is_rejected() {
    let sdk = mock_sdk().with_latency(Duration::from_millis(20));
    let client = client(sdk, 0);
    let tx = client.transactions();
    let call = ContractCall::new(Contract::ProxyRegistry, contracts().proxy_registry, DEPLOY_FOR, vec![]);

    let (first, second) = tokio::join!(
        tx.submit(TxAction::CreateProxy, &call),
        tx.submit(TxAction::SetMonetaDelegate, &call),
    );
    assert_ok!(first);
    assert_eq!(assert_err!(second), TransactionError::AlreadyPending);
    assert_eq!(client.sdk().sent().len(), 1);
    assert!(tx.status().await.is_idle());
}

#[tokio::test]
async fn test_rejected_transaction_is_silent_and_retryable() {
    let client = client(mock_sdk().with_send_result(Err(SdkError::UserRejected)), 0);
    let tx = client.transactions();
    let call = ContractCall::new(Contract::ProxyRegistry, contracts().proxy_registry, DEPLOY_FOR, vec![]);

    let err = tx.submit(TxAction::CreateProxy, &call).await.unwrap_err();
    assert_eq!(err, TransactionError::Rejected);
    assert_eq!(err.user_message(), None);

    let status = tx.status().await;
    assert_eq!(status.action, Some(TxAction::CreateProxy));
    assert_eq!(status.status, Some(TransactionStatus::Error));

    assert_eq!(tx.submit(TxAction::CreateProxy, &call).await.unwrap_err(), TransactionError::Rejected);
    assert_eq!(client.sdk().sent().len(), 2);
}

#[tokio::test]
async fn test_create_proxy_records_the_new_proxy() {
    let sdk = mock_sdk().with_call_result(GET_CURRENT_PROXY, Ok(CallOutput::Address(PROXY)));
    let client = FiatClient::builder().sdk(sdk).user(USER).build().unwrap();

    let proxy = client.transactions().create_proxy().await.unwrap();
    assert_eq!(proxy, PROXY);
    assert_eq!(client.user_context().await.proxies, vec![PROXY]);

    let sent = client.sdk().sent();
    assert_eq!(sent[0].method, DEPLOY_FOR);
    assert_eq!(sent[0].arg(0), Some(&CallArg::Address(USER)));
}

#[tokio::test]
async fn test_create_proxy_requires_an_account() {
    let client = client(mock_sdk(), 0);
    let err = assert_err!(client.transactions().create_proxy().await);
    assert!(matches!(err, FiatError::Transaction(TransactionError::NotConnected)));
}

// ─── Portfolio ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fiat_balance_is_rounded_to_cents() {
    let sdk = mock_sdk().with_call_result(BALANCE_OF, Ok(CallOutput::Uint(wad("1234.5678"))));
    let client = client(sdk, 0);
    assert_eq!(client.positions().fiat_balance(USER).await.unwrap(), "1234.57 FIAT");
}

#[tokio::test]
async fn test_summaries_are_newest_maturity_first() {
    let sdk = mock_sdk()
        .with_collateral_type(fy_collateral_type(0x11, MATURITY, true))
        .with_collateral_type(fy_collateral_type(0x21, MATURITY + 86_400, true))
        .with_user_data(user_data(
            USER,
            false,
            json!([position_json(0x11, USER, "10", "5"), position_json(0x41, USER, "1", "0")]),
        ))
        .with_user_data(user_data(PROXY, true, json!([position_json(0x21, PROXY, "30", "10")])));
    let client = client(sdk, 0);

    let summaries = client.positions().summaries(USER, NOW).await.unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].position.vault, Address::repeat_byte(0x21));
    assert_eq!(summaries[0].coll_ratio, wad("3"));
    assert_eq!(summaries[1].position.owner, USER);
    assert_eq!(summaries[1].debt, wad("5"));
    assert_eq!(summaries[1].days_until_maturity, (MATURITY - NOW) / 86_400);
}
