//! Instrument alias table and token normalization

use std::collections::HashMap;

use crate::config::types::InstrumentConfig;

/// Built-in aliases, in scan order
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("eurusd", "EUR_USD"),
    ("usdjpy", "USD_JPY"),
    ("gbpusd", "GBP_USD"),
    ("usdchf", "USD_CHF"),
    ("xauusd", "XAU_USD"),
    ("gold", "XAU_USD"),
    ("silver", "XAG_USD"),
    ("xagusd", "XAG_USD"),
    ("nas100", "NAS100_USD"),
    ("sp500", "SPX500_USD"),
    ("dow", "US30_USD"),
];

/// Normalize a free-text token into alias-table key form
///
/// Whitespace, hyphens and underscores are dropped and the rest lowercased,
/// so `"XAU-USD"`, `"xau_usd"` and `"Xau Usd"` all become `"xauusd"`.
pub fn normalize_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Read-only mapping from normalized alias to canonical broker symbol
///
/// Several aliases may point at the same symbol. Entries keep their
/// insertion order, which is the order the segmenter scans them in.
#[derive(Debug, Clone, Default)]
pub struct InstrumentMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl InstrumentMap {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in forex/metals/index table
    pub fn with_defaults() -> Self {
        DEFAULT_ALIASES
            .iter()
            .map(|(alias, symbol)| (*alias, *symbol))
            .collect()
    }

    /// Build the table described by the configuration
    ///
    /// Configured aliases are applied after the defaults in sorted order so
    /// the scan order does not depend on hash iteration.
    pub fn from_config(config: &InstrumentConfig) -> Self {
        let mut map = if config.replace_defaults {
            Self::new()
        } else {
            Self::with_defaults()
        };

        let mut extra: Vec<_> = config.aliases.iter().collect();
        extra.sort();
        for (alias, symbol) in extra {
            map.insert(alias, symbol);
        }
        map
    }

    /// Add or replace an alias
    ///
    /// Returns false if the alias normalizes to an empty key.
    pub fn insert(&mut self, alias: &str, symbol: impl Into<String>) -> bool {
        let key = normalize_token(alias);
        if key.is_empty() {
            return false;
        }
        let symbol = symbol.into();

        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = symbol,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, symbol));
            }
        }
        true
    }

    /// Look up a free-text token
    ///
    /// Unknown tokens are a normal outcome and yield `None`.
    pub fn normalize(&self, token: &str) -> Option<&str> {
        self.lookup(&normalize_token(token))
    }

    /// Look up an already-normalized key
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    /// `(alias, symbol)` pairs in scan order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(alias, symbol)| (alias.as_str(), symbol.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A: AsRef<str>, S: Into<String>> FromIterator<(A, S)> for InstrumentMap {
    fn from_iter<I: IntoIterator<Item = (A, S)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (alias, symbol) in iter {
            map.insert(alias.as_ref(), symbol);
        }
        map
    }
}
