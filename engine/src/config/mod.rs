// Engine configuration module
pub mod settings;

pub use settings::{AuthSettings, CalculatorSettings, EngineSettings, MarketDataSettings, PresetStoreSettings};
