//! Signal Executor - Main Entry Point
//!
//! Reads chat messages as JSON lines from stdin, parses trade alerts and
//! places sized market orders (or paper orders in dry-run mode).

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use signal_executor::common::channels::create_message_channel_with_size;
use signal_executor::common::traits::ExecutionSink;
use signal_executor::config::load_config;
use signal_executor::pipeline::{
    forward_messages, ChannelSource, ChatFilter, CsvAuditLog, JsonLinesSource, PaperBroker,
    SignalExecutor,
};
use signal_executor::signal::{InstrumentMap, SignalParser};
use signal_executor::sizing::RiskSizeCalculator;
use signal_executor::{AppConfig, InboundMessage, OandaClient};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error), overrides `settings.log_level`
    #[arg(long)]
    log_level: Option<String>,

    /// Send orders to the OANDA account
    #[arg(long, conflicts_with = "dry_run")]
    live: bool,

    /// Log orders without sending them
    #[arg(long)]
    dry_run: bool,

    /// Only print the parsed signals as JSON
    #[arg(long)]
    parse_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables and configuration before logging so the
    // configured level applies
    let mut config = load_config(Some(&args.config)).context("failed to load configuration")?;
    if args.live {
        config.execution.dry_run = false;
    } else if args.dry_run {
        config.execution.dry_run = true;
    }

    // Initialize logging
    let level = match config
        .settings
        .effective_log_level(args.log_level.as_deref())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting signal executor");
    info!("Configuration file: {}", args.config);

    let instruments = Arc::new(InstrumentMap::from_config(&config.instruments));
    info!(aliases = instruments.len(), "Instrument table ready");
    let parser = SignalParser::new(instruments);

    if args.parse_only {
        return parse_only(&parser).await;
    }

    let sink = build_sink(&config)?;
    info!(sink = sink.sink_name(), mode = %sink.mode(), "Execution sink ready");

    let sizer = RiskSizeCalculator::new(config.risk.to_parameters()?);
    let audit = Arc::new(CsvAuditLog::new(&config.execution.audit_log_path));
    let executor = SignalExecutor::new(parser, Box::new(sizer), sink, audit)
        .with_filter(ChatFilter::from_config(&config.source));

    let (tx, rx) = create_message_channel_with_size(config.settings.channel_capacity);
    let reader = tokio::spawn(async move {
        let source = JsonLinesSource::new(BufReader::new(tokio::io::stdin()));
        if let Err(e) = forward_messages(source, tx).await {
            error!("Message reader stopped: {}", e);
        }
    });

    info!("Application initialized successfully");

    let mut source = ChannelSource::new(rx);
    tokio::select! {
        result = executor.run(&mut source) => {
            let summary = result?;
            info!(
                messages = summary.messages,
                executed = summary.executed,
                failed = summary.failed,
                "Input exhausted"
            );
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, cleaning up...");
        }
    }

    reader.abort();
    Ok(())
}

/// Pick the execution sink for the configured mode
fn build_sink(config: &AppConfig) -> Result<Arc<dyn ExecutionSink>> {
    let timeout = Duration::from_secs(config.settings.request_timeout_seconds);

    if !config.execution.dry_run {
        let client = OandaClient::from_config(&config.oanda, timeout)
            .context("live trading needs OANDA credentials")?;
        return Ok(Arc::new(client));
    }

    if config.oanda.credentials().is_some() {
        let account = OandaClient::from_config(&config.oanda, timeout)?;
        info!(account = account.account_id(), "Dry run sized against live balance");
        return Ok(Arc::new(PaperBroker::mirroring(Arc::new(account))));
    }

    warn!(
        balance = %config.execution.paper_balance,
        "No OANDA credentials, dry run uses the paper balance"
    );
    Ok(Arc::new(PaperBroker::new(config.execution.paper_balance)))
}

/// Print one JSON array of signals per input line
///
/// Invalid UTF-8 is replaced rather than ending the run.
async fn parse_only(parser: &SignalParser) -> Result<()> {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let raw = String::from_utf8_lossy(&buf);
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let text = match serde_json::from_str::<InboundMessage>(line) {
            Ok(message) => message.text,
            Err(_) => line.to_string(),
        };
        let signals = parser.parse(&text);
        println!("{}", serde_json::to_string(&signals)?);
    }

    Ok(())
}
