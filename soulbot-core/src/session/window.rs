//! Context window bounds

use crate::config::SessionConfig;

/// Bounds applied when deriving a context window from the session log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    /// Number of most recent messages kept
    pub window_size: usize,
    /// Per-message character cap
    pub max_message_chars: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_size: 6,
            max_message_chars: 800,
        }
    }
}

impl From<&SessionConfig> for WindowConfig {
    fn from(config: &SessionConfig) -> Self {
        Self {
            window_size: config.window_size,
            max_message_chars: config.max_message_chars,
        }
    }
}
