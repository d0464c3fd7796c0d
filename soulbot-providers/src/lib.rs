//! Model backend integrations for SoulBot
//!
//! This crate defines the [`ChatBackend`] seam the companion talks to and
//! an HTTP client for Ollama-compatible local model servers.

pub mod base;
pub mod ollama;

pub use base::{ChatBackend, GenerationParams, Message, ProviderError, ProviderResult, Role};
pub use ollama::OllamaClient;
