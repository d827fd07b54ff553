pub mod export;
pub mod market_data;
