//! Error types for SoulBot

use thiserror::Error;

/// The main error type for SoulBot operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Journal persistence errors
    #[error("Journal error: {0}")]
    Journal(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// A specialized Result type for SoulBot operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
