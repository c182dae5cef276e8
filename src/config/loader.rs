//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{ExecutorError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Bare variables (`OANDA_API_TOKEN`, `OANDA_ACCOUNT_ID`, `OANDA_REST_URL`, `DRY_RUN`)
/// 2. Environment variables (prefixed with APP_, nested with `__`)
/// 3. Configuration file (TOML format)
/// 4. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    // Pick up a local .env before reading the environment
    dotenvy::dotenv().ok();

    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ExecutorError::Configuration(e.to_string()))?;

    let mut app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ExecutorError::Configuration(e.to_string()))?;

    apply_bare_env(&mut app_config)?;
    Ok(app_config)
}

fn apply_bare_env(app_config: &mut AppConfig) -> Result<()> {
    if let Ok(token) = std::env::var("OANDA_API_TOKEN") {
        app_config.oanda.api_token = Some(token);
    }
    if let Ok(account) = std::env::var("OANDA_ACCOUNT_ID") {
        app_config.oanda.account_id = Some(account);
    }
    if let Ok(url) = std::env::var("OANDA_REST_URL") {
        app_config.oanda.rest_url = url;
    }
    if let Ok(value) = std::env::var("DRY_RUN") {
        app_config.execution.dry_run = parse_flag(&value).ok_or_else(|| {
            ExecutorError::Configuration(format!("DRY_RUN must be true/false, got {}", value))
        })?;
    }
    Ok(())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
