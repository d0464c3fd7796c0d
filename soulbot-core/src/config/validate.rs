//! Configuration validation rules.

use super::schema::{Config, GenerationParams};

/// Smallest per-message cap that still leaves a non-empty head and tail
const MIN_MESSAGE_CHARS: usize = 40;

fn check_params(name: &str, params: &GenerationParams, errors: &mut Vec<String>) {
    if params.max_output_tokens == 0 {
        errors.push(format!("generation.{}.max_output_tokens must be > 0", name));
    }
    if !(0.0..=1.0).contains(&params.temperature) {
        errors.push(format!("generation.{}.temperature must be in [0.0, 1.0]", name));
    }
    if !(0.0..=1.0).contains(&params.top_p) {
        errors.push(format!("generation.{}.top_p must be in [0.0, 1.0]", name));
    }
}

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.backend.api_base.trim().is_empty() {
        errors.push("backend.api_base must not be empty".to_string());
    }
    if config.backend.model.trim().is_empty() {
        errors.push("backend.model must not be empty".to_string());
    }
    if config.backend.request_timeout_secs == 0 {
        errors.push("backend.request_timeout_secs must be > 0".to_string());
    }
    if config.backend.context_tokens == 0 {
        errors.push("backend.context_tokens must be > 0".to_string());
    }

    if config.session.window_size == 0 {
        errors.push("session.window_size must be > 0".to_string());
    }
    if config.session.max_message_chars < MIN_MESSAGE_CHARS {
        errors.push(format!(
            "session.max_message_chars must be >= {}",
            MIN_MESSAGE_CHARS
        ));
    }
    if config.session.display_message_chars < MIN_MESSAGE_CHARS {
        errors.push(format!(
            "session.display_message_chars must be >= {}",
            MIN_MESSAGE_CHARS
        ));
    }

    let generation = &config.generation;
    check_params("chat", &generation.chat, &mut errors);
    check_params("continuation", &generation.continuation, &mut errors);
    check_params("affirmation", &generation.affirmation, &mut errors);
    check_params("meditation", &generation.meditation, &mut errors);
    check_params("cbt", &generation.cbt, &mut errors);
    check_params("emotion", &generation.emotion, &mut errors);

    if generation.continuation.max_output_tokens >= generation.chat.max_output_tokens {
        errors.push(
            "generation.continuation.max_output_tokens must be smaller than generation.chat.max_output_tokens"
                .to_string(),
        );
    }
    if generation.max_continuations > 2 {
        errors.push("generation.max_continuations must be <= 2".to_string());
    }

    if config.journal.path.trim().is_empty() {
        errors.push("journal.path must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}
