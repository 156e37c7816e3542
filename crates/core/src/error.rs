//! Error types for the market-unify system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the market-unify system.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (invalid or missing data).
    #[error("Data error: {0}")]
    Data(String),

    /// Quote source failed to produce a batch.
    #[error("Source error ({source_id}): {message}")]
    Source { source_id: String, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create a source error.
    pub fn source_failed(source_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Error::Source {
            source_id: source_id.into(),
            message: msg.into(),
        }
    }

    /// Whether this error stems from configuration rather than data.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}
