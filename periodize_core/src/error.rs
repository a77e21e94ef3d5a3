//! Error types for the periodize_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for periodize_core operations
///
/// Only conditions that abort a generation call live here. Missing maxima,
/// equipment fallbacks and awkward week partitions are reported as warnings
/// in [`crate::Validation`] instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A caller supplied value is out of range or an unknown tag
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Named methodology template does not exist in the catalog
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    Catalog(String),

    /// Generation state error
    #[error("State error: {0}")]
    State(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
