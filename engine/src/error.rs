use shared::models::{ConceptId, PresetId, ProductId};
use thiserror::Error;

/// Rule violations on the concept ledger. None of these mutate state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Concept {0} not found")]
    ConceptNotFound(ConceptId),

    #[error("The base concept cannot be removed")]
    BaseConceptRemoval,

    #[error("The base concept cannot be renamed")]
    BaseConceptRename,

    #[error("The ledger must keep at least one concept")]
    LastConcept,
}

/// Rule violations on the blend product list.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlendError {
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    #[error("The blend must keep at least one product")]
    LastProduct,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    #[error("CSV export error: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid preset: {0}")]
    InvalidPreset(String),

    #[error("Preset {0} not found")]
    PresetNotFound(PresetId),

    #[error("Market data error: {0}")]
    MarketDataError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Blend(#[from] BlendError),

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl From<EngineError> for tonic::Status {
    fn from(err: EngineError) -> Self {
        tracing::error!("Mapping EngineError to tonic::Status: {:?}", err);
        match err {
            EngineError::ConfigError(msg) => tonic::Status::failed_precondition(format!("Configuration error: {}", msg)),
            EngineError::IoError { source } => tonic::Status::internal(format!("I/O error: {}", source)),
            EngineError::JsonError { source } => tonic::Status::internal(format!("JSON error: {}", source)),
            EngineError::CsvError { source } => tonic::Status::internal(format!("CSV export error: {}", source)),
            EngineError::Unauthenticated(msg) => tonic::Status::unauthenticated(msg),
            EngineError::InvalidPreset(msg) => tonic::Status::invalid_argument(format!("Invalid preset: {}", msg)),
            EngineError::PresetNotFound(id) => tonic::Status::not_found(format!("Preset {} not found", id)),
            EngineError::MarketDataError(msg) => tonic::Status::unavailable(format!("Market data error: {}", msg)),
            EngineError::InvalidArgument(msg) => tonic::Status::invalid_argument(msg),
            EngineError::Ledger(LedgerError::ConceptNotFound(id)) => {
                tonic::Status::not_found(format!("Concept {} not found", id))
            }
            EngineError::Ledger(rule) => tonic::Status::failed_precondition(rule.to_string()),
            EngineError::Blend(BlendError::ProductNotFound(id)) => {
                tonic::Status::not_found(format!("Product {} not found", id))
            }
            EngineError::Blend(rule) => tonic::Status::failed_precondition(rule.to_string()),
            EngineError::AnyhowError(source) => tonic::Status::internal(format!("An internal error occurred: {}", source)),
        }
    }
}
