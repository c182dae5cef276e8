//! OANDA v20 REST message types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::types::TradeSignal;

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
}

/// How the fill interacts with existing positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionFill {
    Default,
}

/// Price-only dependent order (stop loss / take profit on fill)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceDetails {
    /// Price as a decimal string
    pub price: String,
}

impl PriceDetails {
    pub fn new(price: Decimal) -> Self {
        Self {
            price: price.normalize().to_string(),
        }
    }
}

/// Market order specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOrder {
    pub instrument: String,
    /// Signed units as a string (negative = sell)
    pub units: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub position_fill: PositionFill,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss_on_fill: Option<PriceDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit_on_fill: Option<PriceDetails>,
}

/// Body of `POST /v3/accounts/{id}/orders`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub order: MarketOrder,
}

impl OrderRequest {
    /// Market order for a sized signal
    ///
    /// The stop loss and the first take-profit ride along as on-fill orders.
    pub fn market(signal: &TradeSignal, units: i64) -> Self {
        Self {
            order: MarketOrder {
                instrument: signal.instrument.clone(),
                units: units.to_string(),
                order_type: OrderType::Market,
                position_fill: PositionFill::Default,
                stop_loss_on_fill: signal.sl.map(PriceDetails::new),
                take_profit_on_fill: signal.first_take_profit().map(PriceDetails::new),
            },
        }
    }
}

/// Subset of the account details we read
#[derive(Debug, Clone, Deserialize)]
pub struct AccountDetails {
    pub id: Option<String>,
    pub currency: Option<String>,
    /// Balance as a decimal string
    pub balance: String,
}

/// Response of `GET /v3/accounts/{id}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub account: AccountDetails,
    #[serde(rename = "lastTransactionID", default)]
    pub last_transaction_id: Option<String>,
}

/// A transaction reference inside an order response
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRef {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Set on cancel/reject transactions
    #[serde(default)]
    pub reason: Option<String>,
}

/// Successful response of `POST /v3/accounts/{id}/orders`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreateResponse {
    pub order_create_transaction: Option<TransactionRef>,
    #[serde(default)]
    pub order_fill_transaction: Option<TransactionRef>,
    #[serde(default)]
    pub order_cancel_transaction: Option<TransactionRef>,
    #[serde(rename = "lastTransactionID", default)]
    pub last_transaction_id: Option<String>,
    /// Full response body
    #[serde(skip)]
    pub raw: serde_json::Value,
}

/// Error body returned on 4xx responses
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ErrorResponse {
    pub fn describe(&self) -> String {
        match (&self.error_code, &self.error_message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (None, Some(message)) => message.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => "no error message".to_string(),
        }
    }
}
