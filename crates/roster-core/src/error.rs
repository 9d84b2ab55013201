use thiserror::Error;

/// Top-level error type for the Roster system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for RosterError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RosterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("ETL error: {0}")]
    Etl(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for RosterError {
    fn from(err: toml::de::Error) -> Self {
        RosterError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for RosterError {
    fn from(err: toml::ser::Error) -> Self {
        RosterError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RosterError {
    fn from(err: serde_json::Error) -> Self {
        RosterError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Roster operations.
pub type Result<T> = std::result::Result<T, RosterError>;
