//! Prompt and request assembly

use soulbot_core::mood::Emotion;
use soulbot_core::utils::truncate_message;
use soulbot_providers::Message;

/// Character cap applied to user text embedded in tool prompts
pub const TOOL_INPUT_CHARS: usize = 600;

/// Exact reply to questions about the assistant's name
pub const IDENTITY_ANSWER: &str = "I'm SoulBot, your AI emotional wellness companion.";

/// Phrases that trigger [`IDENTITY_ANSWER`] without contacting the backend
const NAME_QUERIES: [&str; 5] = [
    "what is your name",
    "who are you",
    "your name",
    "what's your name",
    "whats your name",
];

const CONTINUATION_PROMPT: &str = "Please continue the previous response only, and finish \
the remaining content. If the previous response was complete, respond with nothing.";

const AFFIRMATION_PROMPT: &str = "Give one short positive affirmation only.";

const MEDITATION_PROMPT: &str =
    "Give a calming 2-minute meditation script. Keep it concise and easy to read.";

/// Builds the message sequences sent to the backend
#[derive(Debug, Clone, Default)]
pub struct ContextBuilder;

impl ContextBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Context window plus a request to finish the previous answer
    pub fn continuation_messages(&self, window: &[Message]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(window.len() + 1);
        messages.extend_from_slice(window);
        messages.push(Message::user(CONTINUATION_PROMPT));
        messages
    }

    pub fn affirmation_messages(&self) -> Vec<Message> {
        vec![Message::user(AFFIRMATION_PROMPT)]
    }

    pub fn meditation_messages(&self) -> Vec<Message> {
        vec![Message::user(MEDITATION_PROMPT)]
    }

    /// Single-message prompt asking the model to reframe a negative thought
    pub fn cbt_messages(&self, thought: &str) -> Vec<Message> {
        let prompt = format!(
            r#"You are a CBT assistant.
User's negative thought: "{}"

Identify the cognitive distortion and reframe it.

Format:
Distortion: <type>
Reframed Thought: <new thought>"#,
            truncate_message(thought, TOOL_INPUT_CHARS)
        );
        vec![Message::user(prompt)]
    }

    /// Single-message prompt asking the model to label the user's emotion as JSON
    pub fn emotion_messages(&self, text: &str) -> Vec<Message> {
        let labels = Emotion::ALL
            .iter()
            .map(|e| format!("\"{}\"", e))
            .collect::<Vec<_>>()
            .join(" | ");
        let prompt = format!(
            r#"You are an emotion classifier.
Analyze the user's message and return ONLY valid JSON.

Format:
{{
    "emotion": {}
}}

User message: "{}"

Return JSON only."#,
            labels,
            truncate_message(text, TOOL_INPUT_CHARS)
        );
        vec![Message::user(prompt)]
    }

    /// Whether `input` asks who the assistant is
    pub fn is_identity_question(&self, input: &str) -> bool {
        let lower = input.trim().to_lowercase();
        NAME_QUERIES.iter().any(|q| lower.contains(q))
    }
}
