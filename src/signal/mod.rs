//! Signal extraction from free-text trade alerts
//!
//! # Pipeline
//!
//! ```text
//! raw text
//!    │
//!    ▼
//! Segmenter ── InstrumentMap (alias → canonical symbol)
//!    │   alias scan, then token sweep → candidates
//!    │   candidate → context window (token .. next '#')
//!    ▼
//! FieldExtractor (per window)
//!    │   side, entry zone, stop loss, targets
//!    ▼
//! Vec<TradeSignal>
//! ```
//!
//! Windows without a direction are dropped. A malformed entry or stop
//! numeral drops only its own window; malformed targets are skipped one by
//! one.
//!
//! # Example
//!
//! ```
//! use signal_executor::signal::SignalParser;
//!
//! let parser = SignalParser::default();
//! let signals = parser.parse("GOLD buy @1950 sl 1940 tp1 1960 tp2 1970");
//!
//! assert_eq!(signals.len(), 1);
//! assert_eq!(signals[0].instrument, "XAU_USD");
//! assert_eq!(signals[0].tps.len(), 2);
//! ```

pub mod extractor;
pub mod instruments;
pub mod parser;
pub mod segmenter;

pub use extractor::{parse_number, ExtractError, FieldExtractor, PriceField};
pub use instruments::{normalize_token, InstrumentMap};
pub use parser::{ParseReport, RejectReason, RejectedWindow, SignalParser};
pub use segmenter::{
    AliasScanMatcher, Candidate, CandidateMatcher, ContextWindow, MessageText, Segmenter,
    TokenSweepMatcher,
};
