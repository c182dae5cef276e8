//! Integration tests for the message executor
//!
//! The execution sink and audit log are mocked with mockall to check what
//! the executor hands over; the last test runs the real paper broker and CSV
//! audit log end to end.

mod common;

use async_trait::async_trait;
use common::{alerts, message, INSTRUMENTS};
use mockall::mock;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use signal_executor::common::errors::{ExecutorError, Result};
use signal_executor::common::traits::{AuditLog, ExecutionSink};
use signal_executor::common::types::{ExecutionMode, OrderOutcome, TradeSignal};
use signal_executor::pipeline::{
    ChatFilter, CsvAuditLog, JsonLinesSource, PaperBroker, RunSummary, SignalExecutor,
};
use signal_executor::signal::SignalParser;
use signal_executor::sizing::RiskSizeCalculator;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::BufReader;

mock! {
    pub Sink {}

    #[async_trait]
    impl ExecutionSink for Sink {
        async fn account_balance(&self) -> Result<Decimal>;
        async fn submit_order(
            &self,
            signal: &TradeSignal,
            units: i64,
            source: &str,
        ) -> Result<OrderOutcome>;
        fn mode(&self) -> ExecutionMode;
        fn sink_name(&self) -> &'static str;
    }
}

mock! {
    pub Audit {}

    #[async_trait]
    impl AuditLog for Audit {
        async fn record(
            &self,
            signal: &TradeSignal,
            source: &str,
            units: i64,
            mode: ExecutionMode,
        ) -> Result<()>;
    }
}

fn live_sink() -> MockSink {
    let mut sink = MockSink::new();
    sink.expect_mode().return_const(ExecutionMode::Live);
    sink.expect_sink_name().return_const("mock");
    sink.expect_account_balance().returning(|| Ok(dec!(10000)));
    sink
}

fn outcome(units: i64) -> OrderOutcome {
    OrderOutcome {
        order_id: Some("44".to_string()),
        units,
        raw: serde_json::Value::Null,
    }
}

fn executor(sink: MockSink, audit: MockAudit) -> SignalExecutor {
    SignalExecutor::new(
        SignalParser::new(INSTRUMENTS.clone()),
        Box::new(RiskSizeCalculator::default()),
        Arc::new(sink),
        Arc::new(audit),
    )
}

#[test_log::test(tokio::test)]
async fn test_sized_signal_reaches_sink_and_audit() {
    let mut sink = live_sink();
    sink.expect_submit_order()
        .withf(|signal, units, source| {
            signal.instrument == "XAU_USD" && *units == 10 && source == "Gold Room"
        })
        .times(1)
        .returning(|_, units, _| Ok(outcome(units)));

    let mut audit = MockAudit::new();
    audit
        .expect_record()
        .withf(|signal, source, units, mode| {
            signal.tps == vec![dec!(1960), dec!(1970)]
                && source == "Gold Room"
                && *units == 10
                && *mode == ExecutionMode::Live
        })
        .times(1)
        .returning(|_, _, _, _| Ok(()));

    let report = executor(sink, audit)
        .handle_message(&message(1, "Gold Room", alerts::GOLD_BUY))
        .await;

    assert_eq!(report.executed.len(), 1);
    assert!(report.failed.is_empty());
    assert_eq!(report.executed[0].outcome.order_id.as_deref(), Some("44"));
}

#[test_log::test(tokio::test)]
async fn test_rejected_order_does_not_block_sibling() {
    let mut sink = live_sink();
    sink.expect_submit_order()
        .withf(|signal, _, _| signal.instrument == "EUR_USD")
        .times(1)
        .returning(|_, _, _| Err(ExecutorError::OrderRejected("INSUFFICIENT_MARGIN".into())));
    sink.expect_submit_order()
        .withf(|signal, _, _| signal.instrument == "GBP_USD")
        .times(1)
        .returning(|_, units, _| Ok(outcome(units)));

    let mut audit = MockAudit::new();
    audit
        .expect_record()
        .withf(|signal, _, _, _| signal.instrument == "GBP_USD")
        .times(1)
        .returning(|_, _, _, _| Ok(()));

    let report = executor(sink, audit)
        .handle_message(&message(1, "Majors", alerts::TWO_SIGNALS))
        .await;

    assert_eq!(report.signal_count(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].signal.instrument, "EUR_USD");
    assert!(report.failed[0].error.contains("INSUFFICIENT_MARGIN"));

    assert_eq!(report.executed.len(), 1);
    // 10000 * 0.01 / 0.0050 = 20000, negative for a sell
    assert_eq!(report.executed[0].sized.units, -20000);
}

#[test_log::test(tokio::test)]
async fn test_balance_failure_skips_submission() {
    let mut sink = MockSink::new();
    sink.expect_mode().return_const(ExecutionMode::Live);
    sink.expect_account_balance()
        .times(1)
        .returning(|| Err(ExecutorError::Authentication("bad token".into())));
    sink.expect_submit_order().never();

    let mut audit = MockAudit::new();
    audit.expect_record().never();

    let report = executor(sink, audit)
        .handle_message(&message(1, "Gold Room", alerts::GOLD_BUY))
        .await;

    assert!(report.executed.is_empty());
    assert_eq!(report.failed.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_audit_failure_keeps_execution() {
    let mut sink = live_sink();
    sink.expect_submit_order()
        .times(1)
        .returning(|_, units, _| Ok(outcome(units)));

    let mut audit = MockAudit::new();
    audit
        .expect_record()
        .withf(|_, source, units, mode| {
            source == "Gold Room" && *units == -10 && *mode == ExecutionMode::Live
        })
        .times(1)
        .returning(|_, _, _, _| {
            Err(ExecutorError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        });

    let report = executor(sink, audit)
        .handle_message(&message(1, "Gold Room", alerts::GOLD_SELL_RANGE))
        .await;

    assert_eq!(report.executed.len(), 1);
    assert!(!report.executed[0].audited);
}

#[test_log::test(tokio::test)]
async fn test_filtered_chat_never_parsed() {
    let mut sink = MockSink::new();
    sink.expect_account_balance().never();
    sink.expect_submit_order().never();
    let mut audit = MockAudit::new();
    audit.expect_record().never();

    let filter = ChatFilter::new(HashMap::from([(-100, "Gold Room".to_string())]), true);
    let executor = executor(sink, audit).with_filter(filter);

    let report = executor
        .handle_message(&message(-200, "Elsewhere", alerts::GOLD_BUY))
        .await;
    assert!(report.was_filtered());
}

#[test_log::test(tokio::test)]
async fn test_dry_run_over_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let audit_path = dir.path().join("trades_log.csv");

    let broker = Arc::new(PaperBroker::new(dec!(10000)));
    let executor = SignalExecutor::new(
        SignalParser::new(INSTRUMENTS.clone()),
        Box::new(RiskSizeCalculator::default()),
        broker.clone(),
        Arc::new(CsvAuditLog::new(&audit_path)),
    )
    .with_filter(ChatFilter::new(HashMap::new(), true));

    let input = tokio_test::io::Builder::new()
        .read(b"{\"chat_id\": 1, \"sender\": \"Gold Room\", \"text\": \"GOLD buy @1950 sl 1940 tp1 1960 tp2 1970\"}\n")
        .read(b"{\"chat_id\": 1, \"sender\": \"Gold Room\", \"text\": \"EURUSD 1.05 - 1.06\"}\n")
        .read(b"{\"chat_id\": 2, \"sender\": \"Copier\", \"text\": \"XAUUSD sell 1950-1955 SL:1960\", \"forwarded\": true}\n")
        .build();
    let mut source = JsonLinesSource::new(BufReader::new(input));

    let summary = executor.run(&mut source).await.unwrap();
    assert_eq!(
        summary,
        RunSummary {
            messages: 3,
            filtered: 1,
            signals: 1,
            executed: 1,
            failed: 0,
        }
    );

    let orders = broker.orders().await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].request.order.units, "10");

    let mut reader = csv::Reader::from_path(&audit_path).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][1], "Gold Room");
    assert_eq!(&rows[0][2], "XAU_USD");
    assert_eq!(&rows[0][8], "1960|1970");
    assert_eq!(&rows[0][9], "DRY_RUN");
}
