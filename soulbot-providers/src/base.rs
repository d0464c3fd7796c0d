//! Base trait for model backends

use async_trait::async_trait;
use thiserror::Error;

pub use soulbot_core::config::GenerationParams;
pub use soulbot_core::session::{Message, Role};

/// Error type for backend operations
///
/// Every variant means the backend could not produce a reply.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProviderError {
    /// True when the server could not be reached at all (refused, DNS, timeout)
    pub fn is_connection_failure(&self) -> bool {
        match self {
            ProviderError::HttpError(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// A language-model backend that turns a role-tagged message sequence into text
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Generate a reply for `messages`.
    ///
    /// May take as long as the model needs; callers must not assume bounded
    /// latency.
    async fn chat(&self, messages: Vec<Message>, params: &GenerationParams)
        -> ProviderResult<String>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> ProviderResult<()> {
        Ok(())
    }

    /// Name of the model requests are sent to
    fn model_name(&self) -> String;
}
