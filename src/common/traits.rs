//! Trait definitions for the collaborators around the signal parser

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::errors::Result;
use super::types::{ExecutionMode, InboundMessage, OrderOutcome, TradeSignal};

/// Source of raw chat messages
///
/// Implementations deliver messages one at a time; `Ok(None)` means the
/// source is exhausted and the executor should stop.
#[async_trait]
pub trait MessageSource: Send {
    /// Wait for the next inbound message
    async fn next_message(&mut self) -> Result<Option<InboundMessage>>;

    /// Name used in logs
    fn source_name(&self) -> &'static str;
}

/// Broker-facing side of the pipeline
///
/// The executor reads the balance once per signal before sizing, then hands
/// over the finished `(signal, units)` pair. Retries and timeouts are the
/// sink's business.
#[async_trait]
pub trait ExecutionSink: Send + Sync {
    /// Current account balance in account currency
    async fn account_balance(&self) -> Result<Decimal>;

    /// Submit a market order for `units` (negative = sell)
    ///
    /// # Arguments
    /// * `signal` - The parsed signal (stop-loss and first target are attached)
    /// * `units` - Signed unit count from the sizer
    /// * `source` - Label of the chat the signal came from
    async fn submit_order(
        &self,
        signal: &TradeSignal,
        units: i64,
        source: &str,
    ) -> Result<OrderOutcome>;

    /// Whether submitted orders reach a real account
    fn mode(&self) -> ExecutionMode;

    /// Name of the broker/venue
    fn sink_name(&self) -> &'static str;
}

/// Durable append-only record of every sized signal
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Record one sized signal
    async fn record(
        &self,
        signal: &TradeSignal,
        source: &str,
        units: i64,
        mode: ExecutionMode,
    ) -> Result<()>;
}
