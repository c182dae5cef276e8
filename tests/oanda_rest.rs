//! Integration tests for the OANDA v20 REST sink
//!
//! Runs the client against a local wiremock server, so no account or
//! network access is needed.

mod common;

use common::{oanda_responses, test_credentials, ACCOUNT_ID};
use rust_decimal_macros::dec;
use serde_json::json;
use signal_executor::common::errors::ExecutorError;
use signal_executor::common::traits::ExecutionSink;
use signal_executor::common::types::{ExecutionMode, Side, TradeSignal};
use signal_executor::oanda::OandaClient;
use signal_executor::pipeline::PaperBroker;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn account_path() -> String {
    format!("/v3/accounts/{}", ACCOUNT_ID)
}

fn orders_path() -> String {
    format!("/v3/accounts/{}/orders", ACCOUNT_ID)
}

fn client(server: &MockServer) -> OandaClient {
    OandaClient::new(&server.uri(), test_credentials()).expect("Failed to create OANDA client")
}

fn gold_buy() -> TradeSignal {
    TradeSignal::new(Side::Buy, "XAU_USD")
        .with_entry(dec!(1950))
        .with_stop_loss(dec!(1940))
        .with_take_profits(vec![dec!(1960), dec!(1970)])
}

// ============================================================================
// Account
// ============================================================================

#[tokio::test]
async fn test_get_balance() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(account_path()))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(oanda_responses::ACCOUNT, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let balance = client(&server).account_balance().await.unwrap();
    assert_eq!(balance, dec!(10000));
}

#[tokio::test]
async fn test_unauthorized_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(account_path()))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_raw(oanda_responses::UNAUTHORIZED, "application/json"),
        )
        .mount(&server)
        .await;

    let result = client(&server).account_balance().await;
    match result {
        Err(ExecutorError::Authentication(message)) => {
            assert!(message.contains("Insufficient authorization"), "{}", message)
        }
        other => panic!("expected authentication error, got {:?}", other),
    }
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_market_order_body_and_fill() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(orders_path()))
        .and(body_partial_json(json!({
            "order": {
                "type": "MARKET",
                "instrument": "XAU_USD",
                "units": "10",
                "positionFill": "DEFAULT",
                "stopLossOnFill": {"price": "1940"},
                "takeProfitOnFill": {"price": "1960"}
            }
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_raw(oanda_responses::ORDER_FILLED, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let sink = client(&server);
    assert_eq!(sink.mode(), ExecutionMode::Live);

    let outcome = sink.submit_order(&gold_buy(), 10, "Gold Room").await.unwrap();
    assert_eq!(outcome.order_id.as_deref(), Some("44"));
    assert_eq!(outcome.units, 10);
    assert_eq!(outcome.raw["lastTransactionID"], "44");
}

#[tokio::test]
async fn test_rejected_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(orders_path()))
        .respond_with(
            ResponseTemplate::new(400).set_body_raw(oanda_responses::REJECTED, "application/json"),
        )
        .mount(&server)
        .await;

    let result = client(&server).submit_order(&gold_buy(), 10, "Gold Room").await;
    match result {
        Err(ExecutorError::OrderRejected(message)) => {
            assert!(message.starts_with("STOP_LOSS_ON_FILL_PRICE_INVALID"), "{}", message)
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cancelled_order_is_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(orders_path()))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_raw(oanda_responses::ORDER_CANCELLED, "application/json"),
        )
        .mount(&server)
        .await;

    let result = client(&server).submit_order(&gold_buy(), 10, "Gold Room").await;
    match result {
        Err(ExecutorError::OrderRejected(message)) => {
            assert!(message.contains("INSUFFICIENT_MARGIN"), "{}", message)
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(orders_path()))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let result = client(&server).submit_order(&gold_buy(), 10, "Gold Room").await;
    assert!(matches!(result, Err(ExecutorError::InvalidResponse(_))));
}

// ============================================================================
// Dry run against a live balance
// ============================================================================

#[tokio::test]
async fn test_mirroring_paper_broker_never_posts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(account_path()))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(oanda_responses::ACCOUNT, "application/json"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let broker = PaperBroker::mirroring(Arc::new(client(&server)));
    assert_eq!(broker.account_balance().await.unwrap(), dec!(10000));

    let outcome = broker.submit_order(&gold_buy(), 10, "Gold Room").await.unwrap();
    assert_eq!(outcome.order_id.as_deref(), Some("paper-1"));
    assert_eq!(broker.mode(), ExecutionMode::DryRun);
}
