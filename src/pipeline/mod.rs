//! Message pipeline: sources, execution sinks and the audit trail
//!
//! ```text
//! MessageSource ─► ChatFilter ─► SignalParser ─► SizeCalculator ─► ExecutionSink
//!                                                                       │
//!                                                                   AuditLog
//! ```

pub mod audit;
pub mod executor;
pub mod paper;
pub mod source;

pub use audit::{CsvAuditLog, AUDIT_HEADER};
pub use executor::{ExecutedSignal, FailedSignal, MessageReport, RunSummary, SignalExecutor};
pub use paper::{PaperBroker, PaperOrder};
pub use source::{forward_messages, ChannelSource, ChatFilter, JsonLinesSource};
