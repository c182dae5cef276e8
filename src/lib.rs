//! Signal Executor Library
//!
//! Turns free-text trade alerts from chat channels into sized market
//! orders, with an OANDA v20 live sink, a paper broker for dry runs and a
//! CSV audit trail.

pub mod common;
pub mod config;
pub mod oanda;
pub mod pipeline;
pub mod signal;
pub mod sizing;

// Re-export commonly used types
pub use common::errors::{ExecutorError, Result};
pub use common::traits::{AuditLog, ExecutionSink, MessageSource};
pub use common::types::{ExecutionMode, InboundMessage, OrderOutcome, Side, TradeSignal};
pub use config::types::AppConfig;
pub use oanda::client::OandaClient;
pub use pipeline::{CsvAuditLog, PaperBroker, SignalExecutor};
pub use signal::{InstrumentMap, SignalParser};

// Sizing types
pub use sizing::{
    BoxedSizeCalculator, RiskParameters, RiskSizeCalculator, SizeCalculator, SizedSignal,
};
