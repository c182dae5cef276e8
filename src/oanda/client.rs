//! REST client for the OANDA v20 API

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

use super::messages::{AccountResponse, ErrorResponse, OrderCreateResponse, OrderRequest};
use crate::common::errors::{ExecutorError, Result};
use crate::common::traits::ExecutionSink;
use crate::common::types::{ExecutionMode, OrderOutcome, TradeSignal};
use crate::config::types::{ApiCredentials, OandaConfig};

/// OANDA account client used as the live execution sink
#[derive(Debug, Clone)]
pub struct OandaClient {
    /// HTTP client
    client: Client,
    /// Base URL for the REST API
    base_url: Url,
    /// Token and account id
    credentials: ApiCredentials,
}

impl OandaClient {
    /// Create a new client with the default 30s timeout
    pub fn new(base_url: &str, credentials: ApiCredentials) -> Result<Self> {
        Self::with_timeout(base_url, credentials, Duration::from_secs(30))
    }

    /// Create a new client with custom timeout
    pub fn with_timeout(
        base_url: &str,
        credentials: ApiCredentials,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExecutorError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            credentials,
        })
    }

    /// Build a client from configuration
    ///
    /// Fails if the token or account id is missing.
    pub fn from_config(config: &OandaConfig, timeout: Duration) -> Result<Self> {
        let credentials = config.credentials().ok_or_else(|| {
            ExecutorError::Configuration(
                "OANDA_API_TOKEN and OANDA_ACCOUNT_ID are required for live trading".to_string(),
            )
        })?;
        Self::with_timeout(&config.rest_url, credentials, timeout)
    }

    pub fn account_id(&self) -> &str {
        &self.credentials.account_id
    }

    fn account_url(&self, tail: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ExecutorError::Configuration(format!("not a base URL: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(["v3", "accounts", self.credentials.account_id.as_str()])
            .extend(tail);
        Ok(url)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.credentials.api_token)
    }

    /// Read an error body and classify it
    async fn error_from(response: Response, rejection: bool) -> ExecutorError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.describe())
            .unwrap_or(body);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ExecutorError::Authentication(
                format!("Server returned status {}: {}", status, detail),
            ),
            s if rejection && s.is_client_error() => ExecutorError::OrderRejected(detail),
            _ => ExecutorError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status, detail
            )),
        }
    }

    /// Fetch the account balance
    #[instrument(skip(self), fields(account = %self.credentials.account_id))]
    pub async fn get_balance(&self) -> Result<Decimal> {
        let url = self.account_url(&[])?;
        debug!("Fetching account from: {}", url);

        let response = self
            .client
            .get(url)
            .header("Authorization", self.bearer())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, false).await);
        }

        let account: AccountResponse = response.json().await?;
        Decimal::from_str(&account.account.balance).map_err(|e| {
            ExecutorError::InvalidResponse(format!(
                "Invalid balance {:?}: {}",
                account.account.balance, e
            ))
        })
    }

    /// Place a market order
    #[instrument(
        skip(self, request),
        fields(instrument = %request.order.instrument, units = %request.order.units)
    )]
    pub async fn create_order(&self, request: &OrderRequest) -> Result<OrderCreateResponse> {
        let url = self.account_url(&["orders"])?;
        debug!("Posting order to: {}", url);

        let response = self
            .client
            .post(url)
            .header("Authorization", self.bearer())
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, true).await);
        }

        let body: serde_json::Value = response.json().await?;
        let mut created: OrderCreateResponse = serde_json::from_value(body.clone())?;
        created.raw = body;
        if let Some(cancel) = &created.order_cancel_transaction {
            return Err(ExecutorError::OrderRejected(format!(
                "order {} cancelled: {}",
                cancel.id,
                cancel.reason.as_deref().unwrap_or("no reason given")
            )));
        }
        Ok(created)
    }
}

#[async_trait]
impl ExecutionSink for OandaClient {
    async fn account_balance(&self) -> Result<Decimal> {
        self.get_balance().await
    }

    async fn submit_order(
        &self,
        signal: &TradeSignal,
        units: i64,
        source: &str,
    ) -> Result<OrderOutcome> {
        let request = OrderRequest::market(signal, units);
        let created = self.create_order(&request).await?;

        let order_id = created
            .order_fill_transaction
            .as_ref()
            .or(created.order_create_transaction.as_ref())
            .map(|tx| tx.id.clone());

        info!(
            source,
            instrument = %signal.instrument,
            units,
            order_id = order_id.as_deref().unwrap_or("-"),
            "Order executed"
        );

        Ok(OrderOutcome {
            order_id,
            units,
            raw: created.raw,
        })
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Live
    }

    fn sink_name(&self) -> &'static str {
        "oanda"
    }
}
