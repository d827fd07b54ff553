// Reference price RPC handler. Reads the poller's cache only.

use super::helpers::{to_millis, to_proto_quotes};
use super::MyPricingEngine;
use crate::services::proto::ReferencePricesResponse;
use tonic::{Response, Status};

pub async fn handle_get_reference_prices(engine: &MyPricingEngine) -> Result<Response<ReferencePricesResponse>, Status> {
    let store = engine.market_data_store.read().await;
    let (quotes, fetched_at) = match store.latest() {
        Some(prices) => (to_proto_quotes(prices), to_millis(prices.fetched_at)),
        None => (Vec::new(), 0),
    };
    let error = store.last_error().unwrap_or_default().to_string();
    Ok(Response::new(ReferencePricesResponse {
        quotes,
        fetched_at,
        stale: !error.is_empty(),
        error,
    }))
}
