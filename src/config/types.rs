//! Configuration types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::common::channels::DEFAULT_CHANNEL_SIZE;
use crate::common::errors::{ExecutorError, Result};
use crate::sizing::RiskParameters;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// OANDA broker configuration
    #[serde(default)]
    pub oanda: OandaConfig,
    /// Position sizing parameters
    #[serde(default)]
    pub risk: RiskConfig,
    /// Dry-run / live switches and audit trail location
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Which chats are listened to
    #[serde(default)]
    pub source: SourceConfig,
    /// Extra instrument aliases
    #[serde(default)]
    pub instruments: InstrumentConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// OANDA v20 REST configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OandaConfig {
    /// Personal access token
    #[serde(default)]
    pub api_token: Option<String>,
    /// Account the orders are placed on
    #[serde(default)]
    pub account_id: Option<String>,
    /// Base URL for the REST API (practice by default)
    #[serde(default = "default_oanda_rest_url")]
    pub rest_url: String,
}

impl Default for OandaConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            account_id: None,
            rest_url: default_oanda_rest_url(),
        }
    }
}

impl OandaConfig {
    /// Token and account id, if both are configured
    pub fn credentials(&self) -> Option<ApiCredentials> {
        match (&self.api_token, &self.account_id) {
            (Some(token), Some(account)) if !token.is_empty() && !account.is_empty() => {
                Some(ApiCredentials::new(token.clone(), account.clone()))
            }
            _ => None,
        }
    }
}

fn default_oanda_rest_url() -> String {
    "https://api-fxpractice.oanda.com".to_string()
}

/// Risk-based sizing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Fraction of the balance risked per trade
    #[serde(default = "default_risk_fraction")]
    pub risk_fraction: f64,
    /// Units used when a signal lacks entry or stop
    #[serde(default = "default_units")]
    pub default_units: i64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_fraction: default_risk_fraction(),
            default_units: default_units(),
        }
    }
}

impl RiskConfig {
    /// Validate and convert into sizer parameters
    pub fn to_parameters(&self) -> Result<RiskParameters> {
        if !(self.risk_fraction > 0.0 && self.risk_fraction <= 1.0) {
            return Err(ExecutorError::Configuration(format!(
                "risk_fraction must be in (0, 1], got {}",
                self.risk_fraction
            )));
        }
        if self.default_units < 0 {
            return Err(ExecutorError::Configuration(format!(
                "default_units must not be negative, got {}",
                self.default_units
            )));
        }

        let risk_fraction = Decimal::from_str(&self.risk_fraction.to_string())
            .map_err(|e| ExecutorError::Configuration(format!("risk_fraction: {}", e)))?;

        Ok(RiskParameters::new(risk_fraction, self.default_units))
    }
}

fn default_risk_fraction() -> f64 {
    0.01
}

fn default_units() -> i64 {
    100
}

/// Execution switches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Log orders instead of sending them
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    /// Balance reported by the paper broker when no credentials are set
    #[serde(default = "default_paper_balance")]
    pub paper_balance: Decimal,
    /// CSV audit trail
    #[serde(default = "default_audit_log_path")]
    pub audit_log_path: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            dry_run: default_dry_run(),
            paper_balance: default_paper_balance(),
            audit_log_path: default_audit_log_path(),
        }
    }
}

fn default_dry_run() -> bool {
    true
}

fn default_paper_balance() -> Decimal {
    dec!(10000)
}

fn default_audit_log_path() -> String {
    "trades_log.csv".to_string()
}

/// An allow-listed chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedChat {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// Message source filtering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Chats that are listened to (empty = every chat)
    #[serde(default)]
    pub allowed_chats: Vec<AllowedChat>,
    /// Ignore forwarded messages
    #[serde(default = "default_skip_forwarded")]
    pub skip_forwarded: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            allowed_chats: Vec::new(),
            skip_forwarded: default_skip_forwarded(),
        }
    }
}

fn default_skip_forwarded() -> bool {
    true
}

/// Instrument alias overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Alias -> canonical symbol, added on top of the built-in table
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    /// Start from an empty table instead of the built-in one
    #[serde(default)]
    pub replace_defaults: bool,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error), used when `--log-level`
    /// is not given
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Inbound message buffer
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_seconds: default_request_timeout(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl AppSettings {
    /// Log level from the command line if given, else from the config
    pub fn effective_log_level<'a>(&'a self, cli: Option<&'a str>) -> &'a str {
        cli.unwrap_or(&self.log_level)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_SIZE
}

/// API credentials for authenticated requests
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub api_token: String,
    pub account_id: String,
}

impl ApiCredentials {
    pub fn new(api_token: String, account_id: String) -> Self {
        Self {
            api_token,
            account_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.risk.risk_fraction, 0.01);
        assert_eq!(config.risk.default_units, 100);
        assert!(config.execution.dry_run);
        assert!(config.source.skip_forwarded);
        assert!(config.oanda.credentials().is_none());
    }

    #[test]
    fn test_risk_parameters_conversion() {
        let params = RiskConfig::default().to_parameters().unwrap();
        assert_eq!(params.risk_fraction, dec!(0.01));
        assert_eq!(params.default_units, 100);
    }

    #[test]
    fn test_risk_fraction_out_of_range() {
        let config = RiskConfig {
            risk_fraction: 1.5,
            default_units: 100,
        };
        assert!(matches!(
            config.to_parameters(),
            Err(ExecutorError::Configuration(_))
        ));

        let config = RiskConfig {
            risk_fraction: 0.0,
            default_units: 100,
        };
        assert!(config.to_parameters().is_err());
    }

    #[test]
    fn test_log_level_flag_overrides_config() {
        let settings = AppSettings {
            log_level: "debug".to_string(),
            ..AppSettings::default()
        };
        assert_eq!(settings.effective_log_level(None), "debug");
        assert_eq!(settings.effective_log_level(Some("warn")), "warn");
        assert_eq!(AppSettings::default().channel_capacity, DEFAULT_CHANNEL_SIZE);
    }

    #[test]
    fn test_credentials_require_both_fields() {
        let mut config = OandaConfig {
            api_token: Some("token".to_string()),
            ..OandaConfig::default()
        };
        assert!(config.credentials().is_none());

        config.account_id = Some("101-004-1234567-001".to_string());
        let creds = config.credentials().unwrap();
        assert_eq!(creds.account_id, "101-004-1234567-001");
    }
}
