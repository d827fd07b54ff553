// Reference prices from the public Yahoo Finance chart endpoint.

use super::MarketDataGateway;
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::models::{Instrument, InstrumentQuote, PricePoint, ReferencePrices};
use std::collections::BTreeMap;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct YahooChartClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooChartClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::MarketDataError(format!("failed to build HTTP client: {}", e)))?;
        Ok(YahooChartClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}?interval=1d&range=30d", self.base_url, symbol)
    }

    async fn fetch_quote(&self, instrument: Instrument) -> Result<InstrumentQuote, EngineError> {
        let symbol = instrument.symbol();
        let url = self.chart_url(symbol);
        tracing::debug!(%symbol, %url, "Fetching chart");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EngineError::MarketDataError(format!("failed to fetch {} data: {}", symbol, e)))?;
        if !response.status().is_success() {
            return Err(EngineError::MarketDataError(format!(
                "failed to fetch {} data: HTTP {}",
                symbol,
                response.status()
            )));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| EngineError::MarketDataError(format!("invalid response for {}: {}", symbol, e)))?;
        parse_chart_response(&body, symbol)
    }
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}

/// Maps one chart payload to a quote. Missing meta fields read as zero;
/// history entries with a null close are dropped.
pub fn parse_chart_response(body: &Value, symbol: &str) -> Result<InstrumentQuote, EngineError> {
    let result = body
        .pointer("/chart/result/0")
        .filter(|r| !r.is_null())
        .ok_or_else(|| EngineError::MarketDataError(format!("invalid response for {}", symbol)))?;
    let meta = &result["meta"];
    let number = |key: &str| meta[key].as_f64().unwrap_or(0.0);

    let closes = result
        .pointer("/indicators/quote/0/close")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let historical = result["timestamp"]
        .as_array()
        .map(|stamps| {
            stamps
                .iter()
                .zip(closes.iter())
                .filter_map(|(stamp, close)| {
                    Some(PricePoint {
                        date: timestamp(stamp.as_i64()?)?,
                        price: close.as_f64()?,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(InstrumentQuote {
        symbol: symbol.to_string(),
        price: number("regularMarketPrice"),
        change: number("regularMarketChange"),
        change_percent: number("regularMarketChangePercent"),
        timestamp: meta["regularMarketTime"].as_i64().and_then(timestamp).unwrap_or_else(Utc::now),
        currency: meta["currency"].as_str().unwrap_or("USD").to_string(),
        historical,
    })
}

#[tonic::async_trait]
impl MarketDataGateway for YahooChartClient {
    async fn fetch_reference_prices(&self) -> Result<ReferencePrices, EngineError> {
        let (gasoline, heating_oil, usd_mxn) = tokio::try_join!(
            self.fetch_quote(Instrument::Gasoline),
            self.fetch_quote(Instrument::HeatingOil),
            self.fetch_quote(Instrument::UsdMxn),
        )?;
        let quotes = BTreeMap::from([
            (Instrument::Gasoline, gasoline),
            (Instrument::HeatingOil, heating_oil),
            (Instrument::UsdMxn, usd_mxn),
        ]);
        Ok(ReferencePrices {
            quotes,
            fetched_at: Utc::now(),
        })
    }
}
