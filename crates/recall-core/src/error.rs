use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for the Recall engine.
///
/// Provider failures are recovered internally (deterministic embedding
/// fallback, templated responses) and should not normally surface to
/// callers. `DimensionMismatch` is the exception: it indicates the
/// embedding provider changed mid-process and the affected operation must
/// abort rather than silently degrade.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecallError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Provider unavailable: {0}")]
    Provider(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Content item not found: {0}")]
    NotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for RecallError {
    fn from(err: toml::de::Error) -> Self {
        RecallError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for RecallError {
    fn from(err: toml::ser::Error) -> Self {
        RecallError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RecallError {
    fn from(err: serde_json::Error) -> Self {
        RecallError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Recall operations.
pub type Result<T> = std::result::Result<T, RecallError>;
