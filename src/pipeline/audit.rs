//! Append-only CSV audit trail

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::common::errors::{ExecutorError, Result};
use crate::common::traits::AuditLog;
use crate::common::types::{ExecutionMode, TradeSignal};

/// Column order of the audit file
pub const AUDIT_HEADER: [&str; 10] = [
    "timestamp",
    "source",
    "instrument",
    "side",
    "units",
    "entry_min",
    "entry_max",
    "stop_loss",
    "take_profits",
    "mode",
];

/// CSV file audit log
///
/// The header is written when the file is new or empty. Rows are appended
/// one at a time under a lock so concurrent signals never interleave.
#[derive(Debug)]
pub struct CsvAuditLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn needs_header(&self) -> bool {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        }
    }
}

fn optional(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Encode one audit row (plus the header when asked)
pub fn encode_row(
    signal: &TradeSignal,
    source: &str,
    units: i64,
    mode: ExecutionMode,
    timestamp: &str,
    with_header: bool,
) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    if with_header {
        wtr.write_record(AUDIT_HEADER)?;
    }

    let take_profits = signal
        .tps
        .iter()
        .map(|tp| tp.to_string())
        .collect::<Vec<_>>()
        .join("|");
    let units = units.to_string();
    let entry_min = optional(signal.entry_min);
    let entry_max = optional(signal.entry_max);
    let stop_loss = optional(signal.sl);

    wtr.write_record([
        timestamp,
        source,
        signal.instrument.as_str(),
        signal.side.as_str(),
        units.as_str(),
        entry_min.as_str(),
        entry_max.as_str(),
        stop_loss.as_str(),
        take_profits.as_str(),
        mode.label(),
    ])?;

    wtr.into_inner()
        .map_err(|e| ExecutorError::Io(e.into_error()))
}

#[async_trait]
impl AuditLog for CsvAuditLog {
    async fn record(
        &self,
        signal: &TradeSignal,
        source: &str,
        units: i64,
        mode: ExecutionMode,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let bytes = encode_row(
            signal,
            source,
            units,
            mode,
            &timestamp,
            self.needs_header().await,
        )?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        debug!(path = %self.path.display(), instrument = %signal.instrument, "Audit row written");
        Ok(())
    }
}
