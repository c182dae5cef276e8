//! Per-message orchestration: filter → parse → size → execute → audit

use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::source::ChatFilter;
use crate::common::errors::Result;
use crate::common::traits::{AuditLog, ExecutionSink, MessageSource};
use crate::common::types::{InboundMessage, OrderOutcome, TradeSignal};
use crate::signal::SignalParser;
use crate::sizing::{BoxedSizeCalculator, SizedSignal};

/// A signal that reached the sink
#[derive(Debug, Clone)]
pub struct ExecutedSignal {
    pub sized: SizedSignal,
    pub outcome: OrderOutcome,
    /// False if the audit row could not be written
    pub audited: bool,
}

/// A signal that failed on balance lookup or submission
#[derive(Debug, Clone)]
pub struct FailedSignal {
    pub signal: TradeSignal,
    pub error: String,
}

/// What happened to one inbound message
#[derive(Debug, Clone, Default)]
pub struct MessageReport {
    /// Source label; `None` when the message was filtered out
    pub source: Option<String>,
    pub executed: Vec<ExecutedSignal>,
    pub failed: Vec<FailedSignal>,
}

impl MessageReport {
    pub fn was_filtered(&self) -> bool {
        self.source.is_none()
    }

    /// Number of signals parsed from the message
    pub fn signal_count(&self) -> usize {
        self.executed.len() + self.failed.len()
    }
}

/// Totals for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub messages: usize,
    pub filtered: usize,
    pub signals: usize,
    pub executed: usize,
    pub failed: usize,
}

impl RunSummary {
    fn add(&mut self, report: &MessageReport) {
        self.messages += 1;
        if report.was_filtered() {
            self.filtered += 1;
        }
        self.signals += report.signal_count();
        self.executed += report.executed.len();
        self.failed += report.failed.len();
    }
}

/// Drives signals from chat text to the execution sink and audit log
pub struct SignalExecutor {
    parser: SignalParser,
    sizer: BoxedSizeCalculator,
    sink: Arc<dyn ExecutionSink>,
    audit: Arc<dyn AuditLog>,
    filter: ChatFilter,
}

impl SignalExecutor {
    pub fn new(
        parser: SignalParser,
        sizer: BoxedSizeCalculator,
        sink: Arc<dyn ExecutionSink>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            parser,
            sizer,
            sink,
            audit,
            filter: ChatFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: ChatFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn parser(&self) -> &SignalParser {
        &self.parser
    }

    /// Handle one inbound message
    ///
    /// Every parsed signal is attempted; a failure on one signal is logged
    /// and reported without affecting its siblings.
    #[instrument(skip(self, message), fields(chat_id = message.chat_id))]
    pub async fn handle_message(&self, message: &InboundMessage) -> MessageReport {
        let Some(source) = self.filter.admit(message) else {
            return MessageReport::default();
        };

        info!("New message from [{}]: {}", source, message.text);

        let signals = self.parser.parse(&message.text);
        let mut report = MessageReport {
            source: Some(source.clone()),
            ..MessageReport::default()
        };

        if signals.is_empty() {
            info!("No actionable trade signals detected.");
            return report;
        }

        for signal in signals {
            info!(?signal, "Parsed signal");
            match self.execute_signal(signal.clone(), &source).await {
                Ok(executed) => report.executed.push(executed),
                Err(e) => {
                    error!(
                        instrument = %signal.instrument,
                        error = %e,
                        "Signal execution failed"
                    );
                    report.failed.push(FailedSignal {
                        signal,
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }

    async fn execute_signal(&self, signal: TradeSignal, source: &str) -> Result<ExecutedSignal> {
        let balance = self.sink.account_balance().await?;
        let sized = self.sizer.size_signal(balance, signal);

        let outcome = self
            .sink
            .submit_order(&sized.signal, sized.units, source)
            .await?;

        let mode = self.sink.mode();
        let audited = match self
            .audit
            .record(&sized.signal, source, sized.units, mode)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    instrument = %sized.signal.instrument,
                    error = %e,
                    "Audit log write failed"
                );
                false
            }
        };

        Ok(ExecutedSignal {
            sized,
            outcome,
            audited,
        })
    }

    /// Process messages until the source is exhausted
    pub async fn run<S: MessageSource + ?Sized>(&self, source: &mut S) -> Result<RunSummary> {
        info!(
            source = source.source_name(),
            sink = self.sink.sink_name(),
            mode = %self.sink.mode(),
            "Signal executor started"
        );

        let mut summary = RunSummary::default();
        while let Some(message) = source.next_message().await? {
            let report = self.handle_message(&message).await;
            summary.add(&report);
        }

        info!(?summary, "Message source closed");
        Ok(summary)
    }
}
