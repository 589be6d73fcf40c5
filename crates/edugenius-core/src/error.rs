//! Unified error type for the EduGenius stack.

use thiserror::Error;

/// Result alias used across all EduGenius crates.
pub type Result<T> = std::result::Result<T, EduGeniusError>;

#[derive(Error, Debug)]
pub enum EduGeniusError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("API key missing for provider: {0}")]
    ApiKeyMissing(String),

    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for EduGeniusError {
    fn from(e: std::io::Error) -> Self {
        EduGeniusError::Other(e.to_string())
    }
}
