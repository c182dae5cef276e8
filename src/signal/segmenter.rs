//! Splits a raw alert into per-instrument context windows
//!
//! Candidates come from a sequence of [`CandidateMatcher`]s: a dictionary
//! scan of every alias, then a sweep over bare alphabetic tokens. Each
//! surviving candidate is turned into a window running from the first
//! mention of its token to the next `#` or the end of the message. Windows
//! may overlap; the extractor treats each one independently.

use regex::{Regex, RegexBuilder};
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

use super::instruments::InstrumentMap;

/// Alphabetic runs of 3-6 letters, optionally followed by a second run
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#?([A-Za-z]{3,6})([A-Za-z]{3,6})?").unwrap());

/// A message flattened to one line, with a lowercased copy for matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText {
    /// Original case, newlines replaced by spaces, trimmed
    pub original: String,
    /// Lowercased `original`
    pub lowered: String,
}

impl MessageText {
    pub fn new(raw: &str) -> Self {
        let original = raw
            .replace(|c: char| c == '\n' || c == '\r', " ")
            .trim()
            .to_string();
        let lowered = original.to_lowercase();
        Self { original, lowered }
    }
}

/// An instrument mention found in the text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// Lowercased token as matched
    pub token: String,
    /// Canonical symbol it normalizes to
    pub symbol: String,
}

impl Candidate {
    pub fn new(token: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            symbol: symbol.into(),
        }
    }
}

/// One pass that proposes instrument candidates
pub trait CandidateMatcher: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Candidates in order of discovery, duplicates allowed
    fn find(&self, text: &MessageText, instruments: &InstrumentMap) -> Vec<Candidate>;
}

/// Substring search of every alias against the lowercased text
#[derive(Debug, Clone, Copy, Default)]
pub struct AliasScanMatcher;

impl CandidateMatcher for AliasScanMatcher {
    fn name(&self) -> &'static str {
        "alias_scan"
    }

    fn find(&self, text: &MessageText, instruments: &InstrumentMap) -> Vec<Candidate> {
        instruments
            .iter()
            .filter(|(alias, _)| text.lowered.contains(alias))
            .map(|(alias, symbol)| Candidate::new(alias, symbol))
            .collect()
    }
}

/// Sweep of bare alphabetic tokens such as `#GOLD` or `XAUUSD`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSweepMatcher;

impl CandidateMatcher for TokenSweepMatcher {
    fn name(&self) -> &'static str {
        "token_sweep"
    }

    fn find(&self, text: &MessageText, instruments: &InstrumentMap) -> Vec<Candidate> {
        TOKEN_RE
            .captures_iter(&text.original)
            .filter_map(|caps| {
                let mut token = caps[1].to_lowercase();
                if let Some(tail) = caps.get(2) {
                    token.push_str(&tail.as_str().to_lowercase());
                }
                let symbol = instruments.normalize(&token)?.to_string();
                Some(Candidate { token, symbol })
            })
            .collect()
    }
}

/// Text slice associated with one instrument mention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    pub token: String,
    pub symbol: String,
    /// From the token up to the next `#` or end of message
    pub text: String,
}

/// Finds instrument mentions and slices the message around them
#[derive(Clone)]
pub struct Segmenter {
    instruments: Arc<InstrumentMap>,
    matchers: Vec<Arc<dyn CandidateMatcher>>,
}

impl Segmenter {
    /// Segmenter with the dictionary scan followed by the token sweep
    pub fn new(instruments: Arc<InstrumentMap>) -> Self {
        Self::with_matchers(
            instruments,
            vec![Arc::new(AliasScanMatcher), Arc::new(TokenSweepMatcher)],
        )
    }

    /// Segmenter with a custom matcher sequence
    pub fn with_matchers(
        instruments: Arc<InstrumentMap>,
        matchers: Vec<Arc<dyn CandidateMatcher>>,
    ) -> Self {
        Self {
            instruments,
            matchers,
        }
    }

    pub fn instruments(&self) -> &InstrumentMap {
        &self.instruments
    }

    /// Run every matcher and merge the results, dropping repeated pairs
    ///
    /// The same symbol reached through two spellings stays as two
    /// candidates.
    pub fn candidates(&self, text: &MessageText) -> Vec<Candidate> {
        let mut merged: Vec<Candidate> = Vec::new();
        for matcher in &self.matchers {
            for candidate in matcher.find(text, &self.instruments) {
                if !merged.contains(&candidate) {
                    debug!(
                        matcher = matcher.name(),
                        token = %candidate.token,
                        symbol = %candidate.symbol,
                        "Instrument candidate"
                    );
                    merged.push(candidate);
                }
            }
        }
        merged
    }

    /// Context windows for every candidate that can be located in the text
    pub fn segment(&self, text: &MessageText) -> Vec<ContextWindow> {
        self.candidates(text)
            .into_iter()
            .filter_map(|candidate| {
                let window = locate_window(&text.original, &candidate.token);
                if window.is_none() {
                    debug!(token = %candidate.token, "No context window for candidate, skipping");
                }
                window.map(|text| ContextWindow {
                    token: candidate.token,
                    symbol: candidate.symbol,
                    text,
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for Segmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.matchers.iter().map(|m| m.name()).collect();
        f.debug_struct("Segmenter")
            .field("instruments", &self.instruments.len())
            .field("matchers", &names)
            .finish()
    }
}

/// First case-insensitive occurrence of `token` followed by at least one
/// character before the next `#`
fn locate_window(text: &str, token: &str) -> Option<String> {
    let pattern = format!(r"({})[^A-Za-z0-9]*([^#]+)", regex::escape(token));
    let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(e) => {
            warn!(token, error = %e, "Could not build window pattern");
            return None;
        }
    };
    re.find(text).map(|m| m.as_str().to_string())
}
