pub mod proto {
    tonic::include_proto!("pricing");
}

pub mod pricing_service;

pub use proto::pricing_engine_server::{PricingEngine, PricingEngineServer};
pub use proto::*;
