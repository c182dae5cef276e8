//! Types shared by the parser, the sizer and the execution pipeline

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Map a directional keyword to a side
    ///
    /// "buy"/"long" are buys, "sell"/"short" are sells (case-insensitive).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "buy" | "long" => Some(Side::Buy),
            "sell" | "short" => Some(Side::Sell),
            _ => None,
        }
    }

    /// Lowercase label used in the audit trail
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A structured trade instruction extracted from free text
///
/// Built once per detected instrument mention and never mutated afterwards.
/// Entry bounds are kept in the order they appeared in the alert, so a
/// descending range such as `1955-1950` yields `entry_min > entry_max`.
/// Use [`TradeSignal::entry_bounds`] for an ordered view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    pub side: Side,
    /// Canonical broker symbol, e.g. `XAU_USD`
    pub instrument: String,
    pub entry_min: Option<Decimal>,
    pub entry_max: Option<Decimal>,
    /// Stop-loss level
    pub sl: Option<Decimal>,
    /// Take-profit levels in order of appearance
    #[serde(default)]
    pub tps: Vec<Decimal>,
}

impl TradeSignal {
    /// Create a signal with no price levels
    pub fn new(side: Side, instrument: impl Into<String>) -> Self {
        Self {
            side,
            instrument: instrument.into(),
            entry_min: None,
            entry_max: None,
            sl: None,
            tps: Vec::new(),
        }
    }

    /// Set a single entry price (both bounds)
    pub fn with_entry(mut self, price: Decimal) -> Self {
        self.entry_min = Some(price);
        self.entry_max = Some(price);
        self
    }

    /// Set an entry zone, keeping the literal order
    pub fn with_entry_range(mut self, first: Decimal, second: Decimal) -> Self {
        self.entry_min = Some(first);
        self.entry_max = Some(second);
        self
    }

    pub fn with_stop_loss(mut self, sl: Decimal) -> Self {
        self.sl = Some(sl);
        self
    }

    pub fn with_take_profits(mut self, tps: Vec<Decimal>) -> Self {
        self.tps = tps;
        self
    }

    /// Entry zone as `(low, high)` regardless of the order in the alert
    pub fn entry_bounds(&self) -> Option<(Decimal, Decimal)> {
        match (self.entry_min, self.entry_max) {
            (Some(a), Some(b)) => Some((a.min(b), a.max(b))),
            _ => None,
        }
    }

    /// First take-profit, the one attached to the order
    pub fn first_take_profit(&self) -> Option<Decimal> {
        self.tps.first().copied()
    }
}

/// Whether orders are actually sent to the broker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionMode {
    DryRun,
    Live,
}

impl ExecutionMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            ExecutionMode::DryRun
        } else {
            ExecutionMode::Live
        }
    }

    /// Label recorded in the audit log
    pub fn label(&self) -> &'static str {
        match self {
            ExecutionMode::DryRun => "DRY_RUN",
            ExecutionMode::Live => "LIVE",
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A raw chat message as delivered by the message source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Chat/channel identifier
    pub chat_id: i64,
    /// Chat title or username, may be empty
    #[serde(default)]
    pub sender: String,
    /// Message body
    #[serde(default)]
    pub text: String,
    /// Whether the message was forwarded from another chat
    #[serde(default)]
    pub forwarded: bool,
}

impl InboundMessage {
    pub fn new(chat_id: i64, sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            sender: sender.into(),
            text: text.into(),
            forwarded: false,
        }
    }
}

/// Result of a submitted order as reported by the sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderOutcome {
    /// Broker transaction id, if one was assigned
    pub order_id: Option<String>,
    /// Units actually requested
    pub units: i64,
    /// Raw broker response for the logs
    #[serde(default)]
    pub raw: serde_json::Value,
}
