//! Wellness tools built on single backend requests
//!
//! Each tool degrades to a fixed fallback instead of returning an error,
//! so a down backend never interrupts the conversation.

use once_cell::sync::Lazy;
use regex::Regex;
use soulbot_core::mood::Emotion;
use soulbot_providers::{ChatBackend, GenerationParams};
use tracing::{debug, warn};

use crate::context::ContextBuilder;

pub const AFFIRMATION_FALLBACK: &str = "Could not generate affirmation right now.";
pub const MEDITATION_FALLBACK: &str = "Could not generate meditation right now.";
pub const CBT_FALLBACK: &str = "CBT tool unavailable.";

static JSON_OBJECT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").ok());

/// Result of a tool call: generated text, or the fallback when the backend failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    Generated(String),
    Fallback(&'static str),
}

impl ToolOutput {
    pub fn text(&self) -> &str {
        match self {
            ToolOutput::Generated(text) => text.as_str(),
            ToolOutput::Fallback(text) => text,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, ToolOutput::Generated(_))
    }
}

async fn run_tool(
    backend: &dyn ChatBackend,
    name: &str,
    messages: Vec<soulbot_providers::Message>,
    params: &GenerationParams,
    fallback: &'static str,
) -> ToolOutput {
    match backend.chat(messages, params).await {
        Ok(text) => ToolOutput::Generated(text.trim().to_string()),
        Err(e) => {
            warn!("{} request failed: {}", name, e);
            ToolOutput::Fallback(fallback)
        }
    }
}

/// One short positive affirmation
pub async fn affirmation(backend: &dyn ChatBackend, params: &GenerationParams) -> ToolOutput {
    let messages = ContextBuilder::new().affirmation_messages();
    run_tool(backend, "affirmation", messages, params, AFFIRMATION_FALLBACK).await
}

/// A short guided meditation script
pub async fn meditation(backend: &dyn ChatBackend, params: &GenerationParams) -> ToolOutput {
    let messages = ContextBuilder::new().meditation_messages();
    run_tool(backend, "meditation", messages, params, MEDITATION_FALLBACK).await
}

/// Name the cognitive distortion in `thought` and reframe it
pub async fn cbt_reframe(
    backend: &dyn ChatBackend,
    thought: &str,
    params: &GenerationParams,
) -> soulbot_core::Result<ToolOutput> {
    if thought.trim().is_empty() {
        return Err(soulbot_core::Error::Validation(
            "thought must not be empty".to_string(),
        ));
    }
    let messages = ContextBuilder::new().cbt_messages(thought);
    Ok(run_tool(backend, "cbt", messages, params, CBT_FALLBACK).await)
}

/// Classify the emotion in `text`; any failure yields [`Emotion::Neutral`]
pub async fn detect_emotion(
    backend: &dyn ChatBackend,
    text: &str,
    params: &GenerationParams,
) -> Emotion {
    let messages = ContextBuilder::new().emotion_messages(text);
    match backend.chat(messages, params).await {
        Ok(raw) => parse_emotion(&raw),
        Err(e) => {
            warn!("emotion request failed: {}", e);
            Emotion::Neutral
        }
    }
}

/// Extract an emotion label from classifier output.
///
/// When the first `{...}` object parses as JSON its `emotion` field decides,
/// and anything unusable there is neutral. Only output without parseable
/// JSON is scanned for a known label on its first line.
pub fn parse_emotion(raw: &str) -> Emotion {
    let raw = raw.trim();

    let json = JSON_OBJECT
        .as_ref()
        .and_then(|re| re.find(raw))
        .and_then(|m| serde_json::from_str::<serde_json::Value>(m.as_str()).ok());

    if let Some(value) = json {
        let label = value.get("emotion").and_then(|v| v.as_str());
        return match label.and_then(|l| l.parse::<Emotion>().ok().or_else(|| Emotion::scan(l))) {
            Some(emotion) => emotion,
            None => {
                debug!("classifier returned no usable label: {}", raw);
                Emotion::Neutral
            }
        };
    }

    let first_line = raw.lines().next().unwrap_or_default();
    Emotion::scan(first_line).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use soulbot_providers::{Message, ProviderError, ProviderResult};
    use std::sync::Mutex;

    struct FixedBackend {
        reply: Option<String>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl FixedBackend {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn down() -> Self {
            Self {
                reply: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for FixedBackend {
        async fn chat(
            &self,
            messages: Vec<Message>,
            _params: &GenerationParams,
        ) -> ProviderResult<String> {
            self.seen.lock().unwrap().push(messages);
            self.reply
                .clone()
                .ok_or_else(|| ProviderError::ApiError("connection refused".to_string()))
        }

        fn model_name(&self) -> String {
            "fixed".to_string()
        }
    }

    #[test]
    fn test_parse_emotion_json() {
        assert_eq!(parse_emotion(r#"{"emotion": "anxious"}"#), Emotion::Anxious);
        assert_eq!(
            parse_emotion("Sure! Here you go:\n{\n  \"emotion\": \"Tired\"\n}\nHope that helps"),
            Emotion::Tired
        );
    }

    #[test]
    fn test_parse_emotion_token_scan() {
        assert_eq!(parse_emotion("Sad\nbecause of the message"), Emotion::Sad);
        assert_eq!(parse_emotion("The user seems happy"), Emotion::Happy);
    }

    #[test]
    fn test_parse_emotion_defaults_to_neutral() {
        assert_eq!(parse_emotion(""), Emotion::Neutral);
        assert_eq!(parse_emotion("I cannot tell"), Emotion::Neutral);
        assert_eq!(parse_emotion(r#"{"emotion": "melancholy"}"#), Emotion::Neutral);
        assert_eq!(parse_emotion(r#"{"mood": 3}"#), Emotion::Neutral);
    }

    #[test]
    fn test_parsed_json_without_emotion_key_is_neutral() {
        assert_eq!(parse_emotion(r#"{"mood":"sad"}"#), Emotion::Neutral);
        assert_eq!(parse_emotion(r#"{"emotion": 5, "note": "happy"}"#), Emotion::Neutral);
    }

    #[test]
    fn test_unparseable_json_falls_back_to_scan() {
        assert_eq!(parse_emotion(r#"{emotion: sad"#), Emotion::Sad);
        assert_eq!(parse_emotion("angry {not json}"), Emotion::Angry);
    }

    #[tokio::test]
    async fn test_affirmation_trims_output() {
        let backend = FixedBackend::ok("  You are enough.\n");
        let out = affirmation(&backend, &GenerationParams::default()).await;
        assert_eq!(out, ToolOutput::Generated("You are enough.".to_string()));
    }

    #[tokio::test]
    async fn test_tools_fall_back_when_backend_is_down() {
        let backend = FixedBackend::down();
        let params = GenerationParams::default();

        assert_eq!(
            affirmation(&backend, &params).await,
            ToolOutput::Fallback(AFFIRMATION_FALLBACK)
        );
        assert_eq!(meditation(&backend, &params).await.text(), MEDITATION_FALLBACK);
        assert_eq!(
            cbt_reframe(&backend, "I ruin everything", &params)
                .await
                .unwrap()
                .text(),
            CBT_FALLBACK
        );
        assert_eq!(detect_emotion(&backend, "ugh", &params).await, Emotion::Neutral);
    }

    #[tokio::test]
    async fn test_cbt_rejects_empty_thought() {
        let backend = FixedBackend::ok("Distortion: none");
        assert!(cbt_reframe(&backend, "  ", &GenerationParams::default())
            .await
            .is_err());
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_detect_emotion_sends_single_prompt() {
        let backend = FixedBackend::ok(r#"{"emotion":"excited"}"#);
        let emotion = detect_emotion(&backend, "I got the job!", &GenerationParams::default()).await;

        assert_eq!(emotion, Emotion::Excited);
        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0][0].content.contains("I got the job!"));
    }
}
