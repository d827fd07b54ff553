// Cache of the latest reference prices, refreshed in the background.
// Nothing in the ledger or blend reads from it.

use crate::error::EngineError;
use crate::gateways::MarketDataGateway;
use chrono::{DateTime, Utc};
use shared::models::ReferencePrices;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Default)]
pub struct MarketDataStore {
    latest: Option<ReferencePrices>,
    /// Display-only; cleared by the next successful refresh.
    last_error: Option<String>,
    last_attempt: Option<DateTime<Utc>>,
}

impl MarketDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<&ReferencePrices> {
        self.latest.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_attempt(&self) -> Option<DateTime<Utc>> {
        self.last_attempt
    }

    pub fn record_success(&mut self, prices: ReferencePrices) {
        self.last_attempt = Some(Utc::now());
        self.latest = Some(prices);
        self.last_error = None;
    }

    /// Keeps the previous quotes.
    pub fn record_failure(&mut self, error: &EngineError) {
        self.last_attempt = Some(Utc::now());
        self.last_error = Some(error.to_string());
    }
}

pub async fn refresh_reference_prices(
    gateway: &dyn MarketDataGateway,
    store: &RwLock<MarketDataStore>,
) -> Result<(), EngineError> {
    match gateway.fetch_reference_prices().await {
        Ok(prices) => {
            tracing::info!(quotes = prices.quotes.len(), "Refreshed reference prices");
            store.write().await.record_success(prices);
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Reference price refresh failed");
            store.write().await.record_failure(&e);
            Err(e)
        }
    }
}

pub fn spawn_market_data_poller(
    gateway: Arc<dyn MarketDataGateway>,
    store: Arc<RwLock<MarketDataStore>>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            // failures are already recorded in the store
            let _ = refresh_reference_prices(gateway.as_ref(), &store).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Instrument, InstrumentQuote};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedGateway {
        calls: AtomicUsize,
        fail_after: usize,
    }

    #[tonic::async_trait]
    impl MarketDataGateway for ScriptedGateway {
        async fn fetch_reference_prices(&self) -> Result<ReferencePrices, EngineError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call >= self.fail_after {
                return Err(EngineError::MarketDataError("upstream down".to_string()));
            }
            let quote = InstrumentQuote {
                symbol: Instrument::UsdMxn.symbol().to_string(),
                price: 17.0 + call as f64,
                change: 0.0,
                change_percent: 0.0,
                timestamp: Utc::now(),
                currency: "MXN".to_string(),
                historical: Vec::new(),
            };
            Ok(ReferencePrices {
                quotes: BTreeMap::from([(Instrument::UsdMxn, quote)]),
                fetched_at: Utc::now(),
            })
        }
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_quotes() {
        let gateway = ScriptedGateway { calls: AtomicUsize::new(0), fail_after: 1 };
        let store = RwLock::new(MarketDataStore::new());

        refresh_reference_prices(&gateway, &store).await.unwrap();
        assert!(refresh_reference_prices(&gateway, &store).await.is_err());

        let store = store.read().await;
        let latest = store.latest().unwrap();
        assert_eq!(latest.quotes[&Instrument::UsdMxn].price, 17.0);
        assert!(store.last_error().unwrap().contains("upstream down"));
        assert!(store.last_attempt().is_some());
    }

    #[tokio::test]
    async fn test_success_clears_error() {
        let mut store = MarketDataStore::new();
        store.record_failure(&EngineError::MarketDataError("boom".into()));
        assert!(store.last_error().is_some());

        let gateway = ScriptedGateway { calls: AtomicUsize::new(0), fail_after: 5 };
        let store = RwLock::new(store);
        refresh_reference_prices(&gateway, &store).await.unwrap();
        assert_eq!(store.read().await.last_error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_refreshes_on_interval() {
        let gateway = Arc::new(ScriptedGateway { calls: AtomicUsize::new(0), fail_after: 10 });
        let store = Arc::new(RwLock::new(MarketDataStore::new()));
        let handle = spawn_market_data_poller(gateway.clone(), store.clone(), Duration::from_secs(300));

        tokio::time::sleep(Duration::from_secs(601)).await;
        handle.abort();
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 3);
        let price = store.read().await.latest().unwrap().quotes[&Instrument::UsdMxn].price;
        assert_eq!(price, 19.0);
    }
}
