// Engine settings, loaded from a JSON file. Every field has a default, so a
// partial file (or none at all) is valid.
use crate::error::EngineError;
use serde::Deserialize;
use shared::models::{DecimalPlaces, UserId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    pub host: String,
    pub port: u16,
    /// Used when RUST_LOG is not set.
    pub log_filter: String,
    pub auth: AuthSettings,
    pub presets: PresetStoreSettings,
    pub market_data: MarketDataSettings,
    pub calculator: CalculatorSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            host: "127.0.0.1".to_string(),
            port: 50051,
            log_filter: "info".to_string(),
            auth: AuthSettings::default(),
            presets: PresetStoreSettings::default(),
            market_data: MarketDataSettings::default(),
            calculator: CalculatorSettings::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AuthSettings {
    /// Bearer token -> user id.
    pub tokens: HashMap<String, UserId>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PresetStoreSettings {
    /// JSON file the preset store is persisted to. In-memory only when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MarketDataSettings {
    pub enabled: bool,
    pub base_url: String,
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        MarketDataSettings {
            enabled: true,
            base_url: "https://query1.finance.yahoo.com".to_string(),
            refresh_interval_secs: 300,
            request_timeout_secs: 10,
        }
    }
}

impl MarketDataSettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CalculatorSettings {
    pub base_concept_name: String,
    pub new_concept_name: String,
    pub decimal_places: DecimalPlaces,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        CalculatorSettings {
            base_concept_name: "Molecule Price".to_string(),
            new_concept_name: "New Cost".to_string(),
            decimal_places: DecimalPlaces::Four,
        }
    }
}

impl EngineSettings {
    /// Reads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        let settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    EngineError::ConfigError(format!("Failed to read config file '{}': {}", path.display(), e))
                })?;
                Self::from_json_str(&raw)?
            }
            None => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, EngineError> {
        serde_json::from_str(raw).map_err(|e| EngineError::ConfigError(format!("Invalid config JSON: {}", e)))
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.port == 0 {
            return Err(EngineError::ConfigError("port must be non-zero".to_string()));
        }
        if self.market_data.enabled && self.market_data.refresh_interval_secs == 0 {
            return Err(EngineError::ConfigError(
                "market_data.refresh_interval_secs must be non-zero".to_string(),
            ));
        }
        if self.market_data.enabled && self.market_data.request_timeout_secs == 0 {
            return Err(EngineError::ConfigError(
                "market_data.request_timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.calculator.base_concept_name.trim().is_empty() {
            return Err(EngineError::ConfigError("calculator.base_concept_name must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_file() {
        let settings = EngineSettings::load(None).unwrap();
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(settings.listen_addr(), "127.0.0.1:50051");
        assert_eq!(settings.market_data.refresh_interval(), Duration::from_secs(300));
        assert_eq!(settings.calculator.base_concept_name, "Molecule Price");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"port": 6000, "auth": {{"tokens": {{"abc": "alice"}}}}, "calculator": {{"decimal_places": 2}}}}"#
        )
        .unwrap();
        let settings = EngineSettings::load(Some(file.path())).unwrap();
        assert_eq!(settings.port, 6000);
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.auth.tokens.get("abc").map(String::as_str), Some("alice"));
        assert_eq!(settings.calculator.decimal_places, DecimalPlaces::Two);
        assert_eq!(settings.calculator.new_concept_name, "New Cost");
        assert!(settings.market_data.enabled);
    }

    #[test]
    fn test_invalid_decimal_places_rejected() {
        let err = EngineSettings::from_json_str(r#"{"calculator": {"decimal_places": 3}}"#).unwrap_err();
        assert!(err.to_string().contains("decimal places must be 2 or 4"));
    }

    #[test]
    fn test_validation_errors() {
        let mut settings = EngineSettings::default();
        settings.port = 0;
        assert!(matches!(settings.validate(), Err(EngineError::ConfigError(_))));

        let mut settings = EngineSettings::default();
        settings.market_data.refresh_interval_secs = 0;
        assert!(settings.validate().is_err());
        settings.market_data.enabled = false;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_request_timeout_rejected() {
        let settings = EngineSettings::from_json_str(r#"{"market_data": {"request_timeout_secs": 0}}"#).unwrap();
        assert!(matches!(settings.validate(), Err(EngineError::ConfigError(_))));
        assert!(EngineSettings::load(None).unwrap().validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = EngineSettings::load(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
    }
}
