// Engine library root

pub mod blend;
pub mod config;
pub mod conversion;
pub mod data;
pub mod error;
pub mod gateways;
pub mod ledger;
pub mod reorder;
pub mod services;
