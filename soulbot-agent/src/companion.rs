//! Conversation companion: the per-turn reply loop

use soulbot_core::badges::BadgeProgress;
use soulbot_core::config::{Config, GenerationConfig, GenerationParams};
use soulbot_core::mood::{Emotion, MoodLog};
use soulbot_core::session::{Message, Session, WindowConfig};
use soulbot_core::utils::preview;
use soulbot_providers::{ChatBackend, ProviderResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::context::{ContextBuilder, IDENTITY_ANSWER};
use crate::tools::{self, ToolOutput};
use crate::truncation::{PunctuationHeuristic, TruncationDetector};

/// Shown instead of a reply when the backend cannot answer
pub const OFFLINE_NOTICE: &str =
    "SoulBot is offline right now. Please make sure the local model server is running.";

/// Hard cap on continuation requests per turn
const MAX_CONTINUATIONS: u32 = 2;

/// Outcome of a conversation turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The backend answered; `continuations` counts the follow-up requests
    /// whose text was appended
    Complete { text: String, continuations: u32 },
    /// The primary request failed and nothing was recorded for the assistant
    Offline { notice: &'static str },
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Complete { text, .. } => text,
            Reply::Offline { notice } => notice,
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, Reply::Offline { .. })
    }
}

/// Owns one conversation and talks to the backend on its behalf
pub struct Companion {
    session: Session,
    backend: Arc<dyn ChatBackend>,
    generation: GenerationConfig,
    detector: Box<dyn TruncationDetector>,
    context: ContextBuilder,
    badges: BadgeProgress,
    mood: MoodLog,
}

impl Companion {
    /// Create a companion with a fresh session built from `config`
    pub fn new(backend: Arc<dyn ChatBackend>, config: &Config) -> Self {
        let window = WindowConfig::from(&config.session);
        let session = if config.session.identity.trim().is_empty() {
            Session::new(window)
        } else {
            Session::with_identity(window, config.session.identity.clone())
        };
        Self::with_session(backend, session, config.generation.clone())
    }

    /// Create a companion around an existing session
    pub fn with_session(
        backend: Arc<dyn ChatBackend>,
        session: Session,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            session,
            backend,
            generation,
            detector: Box::new(PunctuationHeuristic),
            context: ContextBuilder::new(),
            badges: BadgeProgress::default(),
            mood: MoodLog::new(),
        }
    }

    /// Replace the truncation detector
    pub fn with_detector(mut self, detector: impl TruncationDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn badges(&self) -> &BadgeProgress {
        &self.badges
    }

    pub fn mood_log(&self) -> &MoodLog {
        &self.mood
    }

    pub fn model_name(&self) -> String {
        self.backend.model_name()
    }

    /// Check that the backend is reachable and ready
    pub async fn health_check(&self) -> ProviderResult<()> {
        self.backend.health_check().await
    }

    /// The bounded message window for the next request
    pub fn build_context_window(&self) -> Vec<Message> {
        self.session.build_context_window()
    }

    /// Send one request to the backend
    pub async fn request_completion(
        &self,
        window: Vec<Message>,
        params: &GenerationParams,
    ) -> ProviderResult<String> {
        self.backend.chat(window, params).await
    }

    /// Answer a turn, short-circuiting questions about the assistant's name
    pub async fn respond(&mut self, input: &str) -> soulbot_core::Result<Reply> {
        if let Some(answer) = self.answer_identity_question(input)? {
            return Ok(Reply::Complete {
                text: answer,
                continuations: 0,
            });
        }
        self.generate_reply(input).await
    }

    /// Record a name question and its fixed answer without calling the backend.
    ///
    /// Returns `None` when `input` is not a name question or the session has
    /// no identity.
    pub fn answer_identity_question(
        &mut self,
        input: &str,
    ) -> soulbot_core::Result<Option<String>> {
        if self.session.identity().is_none() || !self.context.is_identity_question(input) {
            return Ok(None);
        }
        self.session.append_user_turn(input)?;
        self.session.append_assistant_turn(IDENTITY_ANSWER);
        self.badges.record_session();
        Ok(Some(IDENTITY_ANSWER.to_string()))
    }

    /// Run one conversation turn.
    ///
    /// The user message is appended first and stays in the log even when the
    /// backend is down. A reply that looks cut off gets up to two continuation
    /// requests; their failures are absorbed and the partial reply is kept.
    pub async fn generate_reply(&mut self, input: &str) -> soulbot_core::Result<Reply> {
        self.session.append_user_turn(input)?;
        self.badges.record_session();

        let window = self.session.build_context_window();
        debug!("Context window has {} messages", window.len());

        let mut reply = match self
            .request_completion(window.clone(), &self.generation.chat)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Backend unavailable for primary request: {}", e);
                return Ok(Reply::Offline {
                    notice: OFFLINE_NOTICE,
                });
            }
        };

        let limit = self.generation.max_continuations.min(MAX_CONTINUATIONS);
        let mut continuations = 0;
        while continuations < limit && self.detector.is_likely_truncated(&reply) {
            let messages = self.context.continuation_messages(&window);
            let more = match self
                .request_completion(messages, &self.generation.continuation)
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    warn!("Continuation request failed, keeping partial reply: {}", e);
                    break;
                }
            };
            if more.trim().is_empty() {
                debug!("Continuation was empty, treating reply as complete");
                break;
            }
            reply = join_continuation(&reply, &more);
            continuations += 1;
        }

        info!(
            "Reply ({} continuations): {}",
            continuations,
            preview(&reply, 120)
        );
        self.session.append_assistant_turn(reply.clone());
        Ok(Reply::Complete {
            text: reply,
            continuations,
        })
    }

    /// A short affirmation; successful ones count toward badges
    pub async fn affirmation(&mut self) -> ToolOutput {
        let output = tools::affirmation(self.backend.as_ref(), &self.generation.affirmation).await;
        if output.is_generated() {
            self.badges.record_affirmation();
        }
        output
    }

    pub async fn meditation(&self) -> ToolOutput {
        tools::meditation(self.backend.as_ref(), &self.generation.meditation).await
    }

    pub async fn cbt_reframe(&self, thought: &str) -> soulbot_core::Result<ToolOutput> {
        tools::cbt_reframe(self.backend.as_ref(), thought, &self.generation.cbt).await
    }

    /// Classify `text` and add the result to the mood log
    pub async fn detect_emotion(&mut self, text: &str) -> Emotion {
        let emotion =
            tools::detect_emotion(self.backend.as_ref(), text, &self.generation.emotion).await;
        self.mood.record(emotion);
        emotion
    }

    /// Count a saved journal entry toward badges
    pub fn record_journal(&mut self) {
        self.badges.record_journal();
    }
}

/// Join a reply and its continuation with exactly one space
fn join_continuation(reply: &str, more: &str) -> String {
    format!("{} {}", reply.trim_end(), more.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use soulbot_core::config::SessionConfig;
    use soulbot_providers::{ProviderError, Role};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const CALM: &str =
        "You are not alone in feeling this way, and it's okay to feel anxious sometimes.";
    const CUT: &str = "Take a deep breath and remember that this feeling will pass, just like clouds drifting across the sky and eventually giving way to";

    enum Step {
        Reply(&'static str),
        Fail,
    }

    /// Backend that plays back a fixed script and records every request
    struct ScriptedBackend {
        script: Mutex<VecDeque<Step>>,
        calls: Mutex<Vec<(Vec<Message>, u32)>>,
    }

    impl ScriptedBackend {
        fn new(steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(steps.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(Vec<Message>, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn chat(
            &self,
            messages: Vec<Message>,
            params: &GenerationParams,
        ) -> ProviderResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push((messages, params.max_output_tokens));
            match self.script.lock().unwrap().pop_front() {
                Some(Step::Reply(text)) => Ok(text.to_string()),
                Some(Step::Fail) | None => {
                    Err(ProviderError::ApiError("connection refused".to_string()))
                }
            }
        }

        fn model_name(&self) -> String {
            "scripted".to_string()
        }
    }

    fn companion(backend: Arc<ScriptedBackend>) -> Companion {
        Companion::new(backend, &Config::default())
    }

    #[tokio::test]
    async fn test_complete_reply_needs_no_continuation() {
        let backend = ScriptedBackend::new(vec![Step::Reply(CALM)]);
        let mut companion = companion(backend.clone());

        let reply = companion.generate_reply("I feel anxious").await.unwrap();

        assert_eq!(
            reply,
            Reply::Complete {
                text: CALM.to_string(),
                continuations: 0
            }
        );
        assert_eq!(backend.calls().len(), 1);
        let visible: Vec<_> = companion.session().visible_messages().collect();
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].content, "I feel anxious");
        assert_eq!(visible[1].role, Role::Assistant);
        assert_eq!(visible[1].content, CALM);
    }

    #[tokio::test]
    async fn test_truncated_reply_is_continued() {
        let backend = ScriptedBackend::new(vec![Step::Reply(CUT), Step::Reply("clear skies again.")]);
        let mut companion = companion(backend.clone());

        let reply = companion.generate_reply("I can't calm down").await.unwrap();

        assert_eq!(reply.text(), format!("{} clear skies again.", CUT));
        let calls = backend.calls();
        assert_eq!(calls.len(), 2);

        let (primary, primary_budget) = &calls[0];
        let (continuation, continuation_budget) = &calls[1];
        assert_eq!(&continuation[..primary.len()], &primary[..]);
        assert_eq!(continuation.len(), primary.len() + 1);
        assert!(continuation_budget < primary_budget);

        let last = companion.session().messages().last().unwrap();
        assert_eq!(last.content, reply.text());
    }

    #[tokio::test]
    async fn test_failed_continuation_keeps_partial_reply() {
        let backend = ScriptedBackend::new(vec![Step::Reply(CUT), Step::Fail]);
        let mut companion = companion(backend.clone());

        let reply = companion.generate_reply("help").await.unwrap();

        assert_eq!(
            reply,
            Reply::Complete {
                text: CUT.to_string(),
                continuations: 0
            }
        );
        assert_eq!(backend.calls().len(), 2);
        assert_eq!(companion.session().messages().last().unwrap().content, CUT);
    }

    #[tokio::test]
    async fn test_continuations_are_bounded() {
        let backend = ScriptedBackend::new(vec![
            Step::Reply(CUT),
            Step::Reply("and then some more words without an ending"),
            Step::Reply("and still the model keeps going on and"),
            Step::Reply("never reached"),
        ]);
        let mut companion = companion(backend.clone());

        let reply = companion.generate_reply("tell me a story").await.unwrap();

        assert_eq!(backend.calls().len(), 3);
        assert!(matches!(reply, Reply::Complete { continuations: 2, .. }));
        assert!(!reply.text().contains("never reached"));
    }

    #[tokio::test]
    async fn test_configured_limit_cannot_exceed_two() {
        let backend = ScriptedBackend::new(vec![
            Step::Reply(CUT),
            Step::Reply("more text that trails off into"),
            Step::Reply("even more text that trails off into"),
            Step::Reply("never reached"),
        ]);
        let mut config = Config::default();
        config.generation.max_continuations = 10;
        let mut companion = Companion::new(backend.clone(), &config)
            .with_detector(|_: &str| true);

        companion.generate_reply("go on").await.unwrap();
        assert_eq!(backend.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_continuation_stops_loop() {
        let backend = ScriptedBackend::new(vec![Step::Reply(CUT), Step::Reply("  \n")]);
        let mut companion = companion(backend.clone());

        let reply = companion.generate_reply("hi").await.unwrap();

        assert_eq!(reply.text(), CUT);
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_join_never_fuses_words() {
        let backend = ScriptedBackend::new(vec![Step::Reply(CUT), Step::Reply("clear skies.")]);
        let mut companion = companion(backend);

        let reply = companion.generate_reply("hi").await.unwrap();
        assert!(reply.text().contains("giving way to clear skies."));
        assert!(!reply.text().contains("toclear"));

        assert_eq!(join_continuation("ends here  ", "  next"), "ends here next");
    }

    #[tokio::test]
    async fn test_backend_down_returns_offline_notice() {
        let backend = ScriptedBackend::new(vec![Step::Fail]);
        let mut companion = companion(backend.clone());
        let before = companion.session().len();

        let reply = companion.generate_reply("are you there?").await.unwrap();

        assert!(reply.is_offline());
        assert_eq!(reply.text(), OFFLINE_NOTICE);
        assert_eq!(backend.calls().len(), 1);
        // The user message stays, no assistant turn is recorded
        assert_eq!(companion.session().len(), before + 1);
        assert_eq!(
            companion.session().messages().last().unwrap().role,
            Role::User
        );
    }

    #[tokio::test]
    async fn test_log_is_append_only() {
        let backend = ScriptedBackend::new(vec![
            Step::Reply(CALM),
            Step::Fail,
            Step::Reply(CALM),
        ]);
        let mut companion = companion(backend);

        let mut snapshots: Vec<Vec<Message>> = Vec::new();
        for input in ["one", "two", "three"] {
            companion.generate_reply(input).await.unwrap();
            let current = companion.session().messages().to_vec();
            if let Some(previous) = snapshots.last() {
                assert_eq!(&current[..previous.len()], &previous[..]);
            }
            snapshots.push(current);
        }
        assert_eq!(companion.session().len(), 1 + 2 + 1 + 2);
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected_without_backend_call() {
        let backend = ScriptedBackend::new(vec![Step::Reply(CALM)]);
        let mut companion = companion(backend.clone());

        assert!(companion.generate_reply("   ").await.is_err());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_identity_stays_in_window() {
        let script = (0..10).map(|_| Step::Reply(CALM)).collect();
        let backend = ScriptedBackend::new(script);
        let mut companion = companion(backend.clone());

        for i in 0..10 {
            companion.generate_reply(&format!("turn {}", i)).await.unwrap();
        }

        let (last_request, _) = backend.calls().pop().unwrap();
        let window_size = SessionConfig::default().window_size;
        assert_eq!(last_request.len(), window_size + 1);
        assert_eq!(last_request[0].role, Role::System);
    }

    #[tokio::test]
    async fn test_identity_question_skips_backend() {
        let backend = ScriptedBackend::new(vec![]);
        let mut companion = companion(backend.clone());

        let reply = companion.respond("Hey, what's your name?").await.unwrap();

        assert_eq!(reply.text(), IDENTITY_ANSWER);
        assert!(backend.calls().is_empty());
        assert_eq!(companion.session().visible_messages().count(), 2);
    }

    #[tokio::test]
    async fn test_identity_question_without_identity_goes_to_backend() {
        let backend = ScriptedBackend::new(vec![Step::Reply("I am a helpful model.")]);
        let mut config = Config::default();
        config.session.identity = String::new();
        let mut companion = Companion::new(backend.clone(), &config);

        let reply = companion.respond("who are you").await.unwrap();
        assert_eq!(reply.text(), "I am a helpful model.");
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_tools_update_badges_and_mood() {
        let backend = ScriptedBackend::new(vec![
            Step::Reply("You are enough."),
            Step::Fail,
            Step::Reply(r#"{"emotion": "stressed"}"#),
        ]);
        let mut companion = companion(backend);

        assert!(companion.affirmation().await.is_generated());
        assert!(!companion.affirmation().await.is_generated());
        assert_eq!(companion.badges().affirmations, 1);

        let emotion = companion.detect_emotion("deadlines everywhere").await;
        assert_eq!(emotion, Emotion::Stressed);
        assert_eq!(companion.mood_log().entries().len(), 1);
    }
}
