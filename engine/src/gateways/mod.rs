// Seams to the outside world: identity, preset persistence and reference
// market data. The service layer only sees these traits.

pub mod auth;
pub mod presets;
pub mod yahoo;

pub use auth::StaticTokenAuth;
pub use presets::InMemoryPresetStore;
pub use yahoo::YahooChartClient;

use crate::error::EngineError;
use shared::models::{Preset, PresetId, PresetKind, PresetSnapshot, ReferencePrices, UserId};

#[tonic::async_trait]
pub trait AuthGateway: Send + Sync {
    /// Resolves a bearer token to the user it belongs to.
    async fn authenticate(&self, token: &str) -> Result<UserId, EngineError>;
}

/// Partial update; `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetUpdate {
    pub name: Option<String>,
    pub snapshot: Option<PresetSnapshot>,
}

#[tonic::async_trait]
pub trait PresetGateway: Send + Sync {
    /// The user's presets of one kind, oldest first.
    async fn list(&self, user: &UserId, kind: PresetKind) -> Result<Vec<Preset>, EngineError>;

    async fn get(&self, user: &UserId, id: PresetId) -> Result<Preset, EngineError>;

    async fn create(&self, user: &UserId, name: &str, snapshot: PresetSnapshot) -> Result<Preset, EngineError>;

    async fn update(&self, user: &UserId, id: PresetId, update: PresetUpdate) -> Result<Preset, EngineError>;

    async fn delete(&self, user: &UserId, id: PresetId) -> Result<(), EngineError>;
}

#[tonic::async_trait]
pub trait MarketDataGateway: Send + Sync {
    async fn fetch_reference_prices(&self) -> Result<ReferencePrices, EngineError>;
}
