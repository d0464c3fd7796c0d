//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Persona instructions seeded as the first message of every session
pub const DEFAULT_IDENTITY: &str = "You are SoulBot, an AI emotional wellness companion. \
Your name is always 'SoulBot'. If the user asks your name, who you are, or what you are, \
reply EXACTLY: \"I'm SoulBot, your AI emotional wellness companion.\" \
Speak gently, supportively, and warmly.";

/// Root configuration for SoulBot
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Model backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Session and context window configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// Generation parameters per request kind
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Journal configuration
    #[serde(default)]
    pub journal: JournalConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "~/.soulbot/logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}

/// Local model server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the Ollama-compatible server
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Model name passed with every request
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Context length requested from the server (`num_ctx`)
    #[serde(default = "default_context_tokens")]
    pub context_tokens: u32,
}

fn default_api_base() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.1".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

fn default_context_tokens() -> u32 {
    2048
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            request_timeout_secs: default_request_timeout(),
            context_tokens: default_context_tokens(),
        }
    }
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of recent messages sent as context
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Per-message character cap inside the context window
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
    /// Per-message character cap when printing the conversation
    #[serde(default = "default_display_message_chars")]
    pub display_message_chars: usize,
    /// Identity message; empty disables it
    #[serde(default = "default_identity")]
    pub identity: String,
}

fn default_window_size() -> usize {
    6
}

fn default_max_message_chars() -> usize {
    800
}

fn default_display_message_chars() -> usize {
    1000
}

fn default_identity() -> String {
    DEFAULT_IDENTITY.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            max_message_chars: default_max_message_chars(),
            display_message_chars: default_display_message_chars(),
            identity: default_identity(),
        }
    }
}

/// Sampling parameters for one backend request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Upper bound on generated tokens
    pub max_output_tokens: u32,
    /// Sampling temperature in [0, 1]
    pub temperature: f32,
    /// Nucleus sampling cutoff in [0, 1]
    pub top_p: f32,
    /// Disable adaptive (mirostat) sampling for steadier output
    #[serde(default = "default_stable_decoding")]
    pub stable_decoding: bool,
}

fn default_stable_decoding() -> bool {
    true
}

impl GenerationParams {
    pub const fn new(max_output_tokens: u32, temperature: f32, top_p: f32) -> Self {
        Self {
            max_output_tokens,
            temperature,
            top_p,
            stable_decoding: true,
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::new(120, 0.7, 0.9)
    }
}

/// Generation parameters for each kind of request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Primary chat reply
    #[serde(default = "default_chat_params")]
    pub chat: GenerationParams,
    /// Follow-up request that finishes a cut-off reply
    #[serde(default = "default_continuation_params")]
    pub continuation: GenerationParams,
    #[serde(default = "default_affirmation_params")]
    pub affirmation: GenerationParams,
    #[serde(default = "default_meditation_params")]
    pub meditation: GenerationParams,
    #[serde(default = "default_cbt_params")]
    pub cbt: GenerationParams,
    /// Emotion classifier
    #[serde(default = "default_emotion_params")]
    pub emotion: GenerationParams,
    /// Upper bound on continuation requests per reply
    #[serde(default = "default_max_continuations")]
    pub max_continuations: u32,
}

fn default_chat_params() -> GenerationParams {
    GenerationParams::new(240, 0.6, 0.85)
}

fn default_continuation_params() -> GenerationParams {
    GenerationParams::new(160, 0.6, 0.9)
}

fn default_affirmation_params() -> GenerationParams {
    GenerationParams::new(60, 0.5, 0.9)
}

fn default_meditation_params() -> GenerationParams {
    GenerationParams::new(300, 0.55, 0.9)
}

fn default_cbt_params() -> GenerationParams {
    GenerationParams::new(120, 0.7, 0.9)
}

fn default_emotion_params() -> GenerationParams {
    GenerationParams::new(30, 0.7, 0.9)
}

fn default_max_continuations() -> u32 {
    2
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            chat: default_chat_params(),
            continuation: default_continuation_params(),
            affirmation: default_affirmation_params(),
            meditation: default_meditation_params(),
            cbt: default_cbt_params(),
            emotion: default_emotion_params(),
            max_continuations: default_max_continuations(),
        }
    }
}

/// Journal settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Path of the journal file
    #[serde(default = "default_journal_path")]
    pub path: String,
}

fn default_journal_path() -> String {
    "~/.soulbot/journals.json".to_string()
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: default_journal_path(),
        }
    }
}
