//! Simulated execution sink for dry runs

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::common::errors::Result;
use crate::common::traits::ExecutionSink;
use crate::common::types::{ExecutionMode, OrderOutcome, TradeSignal};
use crate::oanda::messages::OrderRequest;

/// Where the paper broker gets its balance from
#[derive(Clone)]
enum BalanceSource {
    Fixed(Decimal),
    /// Read the real account, never trade on it
    Mirror(Arc<dyn ExecutionSink>),
}

/// An order the paper broker accepted
#[derive(Debug, Clone, PartialEq)]
pub struct PaperOrder {
    pub order_id: String,
    pub source: String,
    pub request: OrderRequest,
}

/// Dry-run execution sink
///
/// Orders are logged and recorded, never sent anywhere.
#[derive(Clone)]
pub struct PaperBroker {
    balance: BalanceSource,
    orders: Arc<RwLock<Vec<PaperOrder>>>,
}

impl PaperBroker {
    /// Paper broker with a fixed balance
    pub fn new(balance: Decimal) -> Self {
        Self {
            balance: BalanceSource::Fixed(balance),
            orders: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Paper broker that sizes against a live account's balance
    pub fn mirroring(account: Arc<dyn ExecutionSink>) -> Self {
        Self {
            balance: BalanceSource::Mirror(account),
            orders: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Orders accepted so far
    pub async fn orders(&self) -> Vec<PaperOrder> {
        self.orders.read().await.clone()
    }
}

impl std::fmt::Debug for PaperBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let balance = match &self.balance {
            BalanceSource::Fixed(balance) => balance.to_string(),
            BalanceSource::Mirror(account) => format!("mirror of {}", account.sink_name()),
        };
        f.debug_struct("PaperBroker").field("balance", &balance).finish()
    }
}

#[async_trait]
impl ExecutionSink for PaperBroker {
    async fn account_balance(&self) -> Result<Decimal> {
        match &self.balance {
            BalanceSource::Fixed(balance) => Ok(*balance),
            BalanceSource::Mirror(account) => account.account_balance().await,
        }
    }

    async fn submit_order(
        &self,
        signal: &TradeSignal,
        units: i64,
        source: &str,
    ) -> Result<OrderOutcome> {
        let request = OrderRequest::market(signal, units);
        let raw = serde_json::to_value(&request)?;

        info!(
            "[DRY RUN] {} → {} {} units={} SL={} TP={:?}",
            source,
            signal.side,
            signal.instrument,
            units,
            signal
                .sl
                .map(|sl| sl.to_string())
                .unwrap_or_else(|| "None".to_string()),
            signal
                .tps
                .iter()
                .map(|tp| tp.to_string())
                .collect::<Vec<_>>(),
        );

        let mut orders = self.orders.write().await;
        let order_id = format!("paper-{}", orders.len() + 1);
        orders.push(PaperOrder {
            order_id: order_id.clone(),
            source: source.to_string(),
            request,
        });

        Ok(OrderOutcome {
            order_id: Some(order_id),
            units,
            raw,
        })
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::DryRun
    }

    fn sink_name(&self) -> &'static str {
        "paper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Side;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_paper_broker_records_orders() {
        let broker = PaperBroker::new(dec!(5000));
        assert_eq!(broker.account_balance().await.unwrap(), dec!(5000));
        assert_eq!(broker.mode(), ExecutionMode::DryRun);

        let signal = TradeSignal::new(Side::Sell, "EUR_USD").with_stop_loss(dec!(1.09));
        let outcome = broker.submit_order(&signal, -100, "test chat").await.unwrap();
        assert_eq!(outcome.order_id.as_deref(), Some("paper-1"));
        assert_eq!(outcome.units, -100);

        let orders = broker.orders().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].source, "test chat");
        assert_eq!(orders[0].request.order.units, "-100");
    }

    #[tokio::test]
    async fn test_mirroring_reads_inner_balance() {
        let inner: Arc<dyn ExecutionSink> = Arc::new(PaperBroker::new(dec!(2500.50)));
        let broker = PaperBroker::mirroring(inner);

        assert_eq!(broker.account_balance().await.unwrap(), dec!(2500.50));
        assert!(format!("{:?}", broker).contains("mirror of paper"));
    }
}
