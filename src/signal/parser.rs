//! Text → signals pipeline

use std::sync::Arc;
use tracing::{debug, warn};

use super::extractor::{ExtractError, FieldExtractor};
use super::instruments::InstrumentMap;
use super::segmenter::{MessageText, Segmenter};
use crate::common::types::TradeSignal;

/// Why a context window did not become a signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No buy/long/sell/short keyword in the window
    NoDirection,
    /// A matched entry or stop numeral did not parse
    Malformed(ExtractError),
}

/// A window that was dropped, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedWindow {
    pub token: String,
    pub symbol: String,
    pub reason: RejectReason,
}

/// Everything the parser learned from one message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub signals: Vec<TradeSignal>,
    pub rejected: Vec<RejectedWindow>,
}

impl ParseReport {
    /// True when the message produced no actionable signal
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

/// Parses free-text alerts into trade signals
///
/// Stateless apart from the shared, read-only instrument table, so one
/// parser can serve any number of tasks concurrently.
#[derive(Debug, Clone)]
pub struct SignalParser {
    segmenter: Segmenter,
    extractor: FieldExtractor,
}

impl SignalParser {
    pub fn new(instruments: Arc<InstrumentMap>) -> Self {
        Self::with_segmenter(Segmenter::new(instruments))
    }

    pub fn with_segmenter(segmenter: Segmenter) -> Self {
        Self {
            segmenter,
            extractor: FieldExtractor::new(),
        }
    }

    pub fn instruments(&self) -> &InstrumentMap {
        self.segmenter.instruments()
    }

    /// Signals found in `text`, in candidate order
    pub fn parse(&self, text: &str) -> Vec<TradeSignal> {
        self.parse_with_report(text).signals
    }

    /// Like [`SignalParser::parse`], also reporting dropped windows
    ///
    /// A malformed numeral only costs its own window; sibling windows in
    /// the same message are still extracted.
    pub fn parse_with_report(&self, text: &str) -> ParseReport {
        let message = MessageText::new(text);
        let mut report = ParseReport::default();

        for window in self.segmenter.segment(&message) {
            match self.extractor.extract(&window, &message.original) {
                Ok(Some(signal)) => report.signals.push(signal),
                Ok(None) => {
                    debug!(token = %window.token, "No direction in window, discarding");
                    report.rejected.push(RejectedWindow {
                        token: window.token,
                        symbol: window.symbol,
                        reason: RejectReason::NoDirection,
                    });
                }
                Err(e) => {
                    warn!(
                        token = %window.token,
                        symbol = %window.symbol,
                        error = %e,
                        "Dropping window"
                    );
                    report.rejected.push(RejectedWindow {
                        token: window.token,
                        symbol: window.symbol,
                        reason: RejectReason::Malformed(e),
                    });
                }
            }
        }

        report
    }
}

impl Default for SignalParser {
    fn default() -> Self {
        Self::new(Arc::new(InstrumentMap::with_defaults()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Side;
    use crate::signal::extractor::PriceField;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_is_idempotent() {
        let parser = SignalParser::default();
        let text = "#EURUSD buy 1.0500 sl 1.0450 tp 1.0600 #GOLD sell 1950 sl 1960";
        assert_eq!(parser.parse(text), parser.parse(text));
    }

    #[test]
    fn test_malformed_window_isolated() {
        let parser = SignalParser::default();
        let report =
            parser.parse_with_report("#GOLD sell 1950 sl ... #EURUSD buy 1.0500 sl 1.0450");

        assert_eq!(report.signals.len(), 1);
        assert_eq!(report.signals[0].instrument, "EUR_USD");
        assert_eq!(report.signals[0].side, Side::Buy);
        assert_eq!(report.signals[0].sl, Some(dec!(1.0450)));

        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].symbol, "XAU_USD");
        assert!(matches!(
            report.rejected[0].reason,
            RejectReason::Malformed(ExtractError::MalformedNumber {
                field: PriceField::StopLoss,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_spelling_without_side_rejected() {
        let parser = SignalParser::default();
        let report = parser.parse_with_report("#GOLD buy 1950 sl 1940 #XAUUSD update");

        assert_eq!(report.signals.len(), 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].token, "xauusd");
        assert_eq!(report.rejected[0].reason, RejectReason::NoDirection);
    }

    #[test]
    fn test_custom_instrument_table() {
        let map: InstrumentMap = [("btc", "BTC_USD")].into_iter().collect();
        let parser = SignalParser::new(Arc::new(map));

        let signals = parser.parse("BTC long 65000 sl 64000");
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].instrument, "BTC_USD");

        assert!(parser.parse("GOLD buy 1950").is_empty());
    }
}
