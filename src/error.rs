//! Error types for the financial advisor engine

use thiserror::Error;

/// Result type alias for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {

    // =============================
    // Request Errors
    // =============================

    /// Malformed or out-of-domain input, rejected at the boundary.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A mandatory reference dataset (rule table, classifier) is not loaded.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    // =============================
    // Reference Data Errors
    // =============================

    #[error("Rule table error: {0}")]
    RuleTable(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AdvisorError {
    /// True for errors caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AdvisorError::Validation(_))
    }
}
