//! Field extraction from a single context window

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

use super::segmenter::ContextWindow;
use crate::common::types::{Side, TradeSignal};

static SIDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(buy|long|sell|short)\b").unwrap());
static PRICE_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@?\s*([\d.,]+)\s*(?:-|to|/)\s*([\d.,]+)").unwrap());
static SINGLE_PRICE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@?\s*([\d.,]+)").unwrap());
static SL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:sl|stoploss|stop loss)[:=\s]*([\d.,]+)").unwrap());
static TP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(tp\d*|target)[:=\s]*([\d.,]+)").unwrap());

/// Which price a numeral was read for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    Entry,
    StopLoss,
    TakeProfit,
}

impl std::fmt::Display for PriceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceField::Entry => write!(f, "entry"),
            PriceField::StopLoss => write!(f, "stop loss"),
            PriceField::TakeProfit => write!(f, "take profit"),
        }
    }
}

/// Extraction failures that abort a single window
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("malformed {field} numeral: {raw:?}")]
    MalformedNumber { field: PriceField, raw: String },
}

/// Parse a numeral as written in an alert
///
/// Thousands separators are dropped (`1,950.5` → `1950.5`); a bare leading
/// or trailing point is accepted (`.5`, `5.`). Anything without a digit,
/// with more than one decimal point, or beyond `Decimal`'s 28 significant
/// digits is rejected.
pub fn parse_number(raw: &str, field: PriceField) -> Result<Decimal, ExtractError> {
    let malformed = || ExtractError::MalformedNumber {
        field,
        raw: raw.to_string(),
    };

    let mut cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) || cleaned.matches('.').count() > 1 {
        return Err(malformed());
    }
    if cleaned.starts_with('.') {
        cleaned.insert(0, '0');
    }
    if cleaned.ends_with('.') {
        cleaned.pop();
    }

    Decimal::from_str(&cleaned).map_err(|_| malformed())
}

/// First directional keyword, if any
pub fn extract_side(text: &str) -> Option<Side> {
    SIDE_RE
        .captures(text)
        .and_then(|caps| Side::from_keyword(&caps[1]))
}

/// Entry zone as `(first, second)` in the order written
///
/// A range (`1950-1955`, `1.05 to 1.06`, `@2000/2010`) wins over a single
/// price, which is reported as both bounds.
pub fn extract_entry(text: &str) -> Result<Option<(Decimal, Decimal)>, ExtractError> {
    if let Some(caps) = PRICE_RANGE_RE.captures(text) {
        let first = parse_number(&caps[1], PriceField::Entry)?;
        let second = parse_number(&caps[2], PriceField::Entry)?;
        return Ok(Some((first, second)));
    }

    match SINGLE_PRICE_RE.captures(text) {
        Some(caps) => {
            let price = parse_number(&caps[1], PriceField::Entry)?;
            Ok(Some((price, price)))
        }
        None => Ok(None),
    }
}

/// Labelled stop-loss (`sl`, `stoploss`, `stop loss`)
pub fn extract_stop_loss(text: &str) -> Result<Option<Decimal>, ExtractError> {
    SL_RE
        .captures(text)
        .map(|caps| parse_number(&caps[1], PriceField::StopLoss))
        .transpose()
}

/// Every labelled target (`tp`, `tp2`, `target`) in order of appearance
///
/// A target that does not parse is skipped; the rest are kept.
pub fn extract_take_profits(text: &str) -> Vec<Decimal> {
    TP_RE
        .captures_iter(text)
        .filter_map(|caps| match parse_number(&caps[2], PriceField::TakeProfit) {
            Ok(price) => Some(price),
            Err(e) => {
                debug!(label = &caps[1], error = %e, "Skipping take profit");
                None
            }
        })
        .collect()
}

/// Turns context windows into signals
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldExtractor;

impl FieldExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Build a signal from one window
    ///
    /// Returns `Ok(None)` when the window has no directional keyword. Targets
    /// fall back to the whole message when the window lists none.
    ///
    /// # Arguments
    /// * `window` - Context window produced by the segmenter
    /// * `full_text` - The whole flattened message
    pub fn extract(
        &self,
        window: &ContextWindow,
        full_text: &str,
    ) -> Result<Option<TradeSignal>, ExtractError> {
        let Some(side) = extract_side(&window.text) else {
            return Ok(None);
        };

        let mut signal = TradeSignal::new(side, window.symbol.clone());

        if let Some((first, second)) = extract_entry(&window.text)? {
            signal = signal.with_entry_range(first, second);
        }
        if let Some(sl) = extract_stop_loss(&window.text)? {
            signal = signal.with_stop_loss(sl);
        }

        let mut tps = extract_take_profits(&window.text);
        if tps.is_empty() {
            tps = extract_take_profits(full_text);
        }

        Ok(Some(signal.with_take_profits(tps)))
    }
}
