//! Ollama HTTP client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::base::{ChatBackend, GenerationParams, Message, ProviderError, ProviderResult};
use soulbot_core::config::BackendConfig;

/// `/api/chat` request body
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: RequestOptions,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    num_predict: u32,
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    mirostat: Option<u8>,
    num_ctx: u32,
}

/// `/api/chat` response body (non-streaming)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// `/api/tags` response body
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Normalize a base URL by stripping trailing slashes and a `/v1` suffix
fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().trim_end_matches('/').to_string();
    if url.ends_with("/v1") {
        url.truncate(url.len() - 3);
    }
    url
}

/// Client for an Ollama-compatible local model server
pub struct OllamaClient {
    client: Client,
    api_base: String,
    model: String,
    context_tokens: u32,
}

impl OllamaClient {
    /// Create a new client
    pub fn new(api_base: impl AsRef<str>, model: impl Into<String>) -> Self {
        Self::with_options(api_base, model, Duration::from_secs(120), 2048)
    }

    /// Create a new client with an explicit timeout and context length
    pub fn with_options(
        api_base: impl AsRef<str>,
        model: impl Into<String>,
        timeout: Duration,
        context_tokens: u32,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_base: normalize_base_url(api_base.as_ref()),
            model: model.into(),
            context_tokens,
        }
    }

    /// Create a client from the backend section of the config
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::with_options(
            &config.api_base,
            config.model.clone(),
            Duration::from_secs(config.request_timeout_secs),
            config.context_tokens,
        )
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Names of the models installed on the server
    pub async fn list_models(&self) -> ProviderResult<Vec<String>> {
        let url = format!("{}/api/tags", self.api_base);
        let response = self.client.get(&url).send().await?;
        let response = Self::check_status(response).await?;
        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn build_request<'a>(
        &'a self,
        messages: &'a [Message],
        params: &GenerationParams,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: RequestOptions {
                num_predict: params.max_output_tokens,
                temperature: params.temperature,
                top_p: params.top_p,
                mirostat: params.stable_decoding.then_some(0),
                num_ctx: self.context_tokens,
            },
        }
    }

    async fn check_status(response: reqwest::Response) -> ProviderResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let detail = serde_json::from_str::<ErrorBody>(&error_text)
            .map(|body| body.error)
            .unwrap_or(error_text);
        Err(ProviderError::ApiError(format!("HTTP {}: {}", status, detail)))
    }

    fn parse_response(response: ChatResponse) -> ProviderResult<String> {
        if let Some(error) = response.error {
            return Err(ProviderError::ApiError(error));
        }

        let message = response
            .message
            .ok_or_else(|| ProviderError::InvalidResponse("No message in response".to_string()))?;

        if response.done_reason.as_deref() == Some("length") {
            debug!(
                "Generation stopped at the token limit after {:?} tokens",
                response.eval_count
            );
        }
        Ok(message.content)
    }
}

#[async_trait]
impl ChatBackend for OllamaClient {
    async fn chat(
        &self,
        messages: Vec<Message>,
        params: &GenerationParams,
    ) -> ProviderResult<String> {
        let request = self.build_request(&messages, params);
        debug!(
            "Sending chat request to {} with model {} ({} messages, num_predict {})",
            self.api_base,
            self.model,
            messages.len(),
            params.max_output_tokens
        );

        let url = format!("{}/api/chat", self.api_base);
        let response = self.client.post(&url).json(&request).send().await?;
        let response = Self::check_status(response).await?;

        let response_data: ChatResponse = response.json().await?;
        Self::parse_response(response_data)
    }

    async fn health_check(&self) -> ProviderResult<()> {
        let models = self.list_models().await?;
        let wanted = self.model.as_str();
        let installed = models
            .iter()
            .any(|name| name == wanted || name.strip_suffix(":latest") == Some(wanted));
        if !installed {
            warn!("Model {} is not installed on {}", self.model, self.api_base);
            return Err(ProviderError::ConfigError(format!(
                "model {} is not installed; run `ollama pull {}`",
                self.model, self.model
            )));
        }
        Ok(())
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::from_config(&BackendConfig::default())
    }
}
