//! Common test utilities and fixtures

#![allow(dead_code)]

use once_cell::sync::Lazy;
use signal_executor::common::types::InboundMessage;
use signal_executor::config::types::ApiCredentials;
use signal_executor::signal::InstrumentMap;
use std::sync::Arc;

/// Default alias table shared across tests
pub static INSTRUMENTS: Lazy<Arc<InstrumentMap>> =
    Lazy::new(|| Arc::new(InstrumentMap::with_defaults()));

/// Account id used against the mock OANDA server
pub const ACCOUNT_ID: &str = "101-004-1234567-001";

pub fn test_credentials() -> ApiCredentials {
    ApiCredentials::new("test-token".to_string(), ACCOUNT_ID.to_string())
}

pub fn message(chat_id: i64, sender: &str, text: &str) -> InboundMessage {
    InboundMessage::new(chat_id, sender, text)
}

/// Sample alerts as they arrive from chat channels
pub mod alerts {
    pub const GOLD_BUY: &str = "GOLD buy @1950 sl 1940 tp1 1960 tp2 1970";

    pub const RANGE_WITHOUT_SIDE: &str = "EURUSD 1.05 - 1.06";

    pub const GOLD_SELL_RANGE: &str = "XAUUSD sell 1950-1955 SL:1960";

    pub const TWO_SIGNALS: &str =
        "#EURUSD buy 1.0850 sl 1.0800 tp 1.0900 #GBPUSD sell 1.2700 sl 1.2750 tp 1.2650";

    pub const TWO_SIGNALS_INLINE: &str =
        "EURUSD buy 1.0850 sl 1.0800 tp 1.0900 GBPUSD sell 1.2700 sl 1.2750 tp 1.2650";

    pub const MULTILINE: &str =
        "🔥 GOLD SELL NOW\n@ 2345.5 - 2348\nSL: 2352\nTP1: 2340\nTP2: 2335";
}

/// Sample OANDA v20 responses
pub mod oanda_responses {
    pub const ACCOUNT: &str = r#"{
        "account": {
            "id": "101-004-1234567-001",
            "currency": "USD",
            "balance": "10000.0000"
        },
        "lastTransactionID": "42"
    }"#;

    pub const ORDER_FILLED: &str = r#"{
        "orderCreateTransaction": {"id": "43", "type": "MARKET_ORDER"},
        "orderFillTransaction": {"id": "44", "type": "ORDER_FILL"},
        "relatedTransactionIDs": ["43", "44"],
        "lastTransactionID": "44"
    }"#;

    pub const ORDER_CANCELLED: &str = r#"{
        "orderCreateTransaction": {"id": "45", "type": "MARKET_ORDER"},
        "orderCancelTransaction": {"id": "46", "type": "ORDER_CANCEL", "reason": "INSUFFICIENT_MARGIN"},
        "lastTransactionID": "46"
    }"#;

    pub const UNAUTHORIZED: &str = r#"{
        "errorMessage": "Insufficient authorization to perform request."
    }"#;

    pub const REJECTED: &str = r#"{
        "errorCode": "STOP_LOSS_ON_FILL_PRICE_INVALID",
        "errorMessage": "The Stop Loss on fill specified is invalid"
    }"#;
}
