//! Shared error types for the crate

use thiserror::Error;

/// Main error type for cogsplit operations
#[derive(Debug, Error)]
pub enum Error {
    /// Structural problems in a method model under construction
    #[error("Invalid method model: {0}")]
    InvalidModel(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Cache import errors
    #[error("Import error at line {line}: {message}")]
    Import { line: usize, message: String },

    /// Wrapped external errors
    #[error(transparent)]
    External(#[from] anyhow::Error),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a model validation error
    pub fn invalid_model(message: impl Into<String>) -> Self {
        Self::InvalidModel(message.into())
    }

    /// Create an import error with line context
    pub fn import(line: usize, message: impl Into<String>) -> Self {
        Self::Import {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
