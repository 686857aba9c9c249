//! Thin client for an OpenAI-compatible chat-completions endpoint.
//!
//! The client issues exactly one HTTP request per call and never retries; retry policy
//! belongs to the pipeline so that map, reduce, and answer calls share one set of rules.
//! Failures are always surfaced as typed errors — the client never substitutes
//! placeholder text that could be mistaken for generated output.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced while requesting a completion.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// No credential was configured; detected at construction, before any network call.
    #[error("No completion API credential configured")]
    MissingCredential,
    /// Provider rejected the call with a non-success status.
    #[error("Completion provider returned {status}: {body}")]
    Provider {
        /// HTTP status code reported by the provider.
        status: u16,
        /// Response body captured for diagnostics.
        body: String,
    },
    /// Success response did not match the expected shape.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
    /// Request never produced a response.
    #[error("Failed to reach completion provider: {0}")]
    Transport(#[from] reqwest::Error),
}

impl CompletionError {
    /// Whether a caller may reasonably retry the failed call.
    ///
    /// Rate limits and server-side failures are transient; a malformed body or a dropped
    /// connection is worth one more attempt. Missing credentials and other 4xx rejections
    /// are fatal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::MissingCredential => false,
            Self::Provider { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedResponse(_) | Self::Transport(_) => true,
        }
    }
}

/// Provider settings passed explicitly into the client constructor.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Chat-completions endpoint URL.
    pub api_url: String,
    /// Bearer credential, when configured.
    pub api_key: Option<String>,
    /// Model identifier sent with every request.
    pub model: String,
}

/// One completion exchange with the provider.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Optional system instruction prepended to the conversation.
    pub system_prompt: Option<String>,
    /// User content to summarize or answer from.
    pub user_prompt: String,
    /// Output token budget for the call.
    pub max_tokens: u32,
    /// Sampling temperature for the call.
    pub temperature: f32,
}

/// Interface implemented by completion backends.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Issue one completion call and return the generated text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

/// Reqwest-backed client for OpenAI-compatible chat-completions endpoints.
#[derive(Debug)]
pub struct ChatClient {
    http: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// Construct a client from explicit provider settings.
    ///
    /// Fails fast with [`CompletionError::MissingCredential`] when no credential is
    /// configured; no network call is made.
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let api_key = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(CompletionError::MissingCredential)?;
        let http = Client::builder().user_agent("docbrief/0.1").build()?;
        tracing::debug!(url = %config.api_url, model = %config.model, "Initialized completion client");
        Ok(Self {
            http,
            api_url: config.api_url,
            api_key,
            model: config.model,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl ChatResponse {
    /// Extract the generated text, reporting exactly which field was missing.
    fn into_text(self) -> Result<String, CompletionError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::MalformedResponse("response has no choices".into()))?;
        choice.message.content.ok_or_else(|| {
            CompletionError::MalformedResponse("choice message has no content".into())
        })
    }
}

#[async_trait]
impl CompletionClient for ChatClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system_prompt {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": request.user_prompt }));

        let payload = json!({
            "model": self.model,
            "messages": messages,
            "max_completion_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status, "Completion provider rejected the call");
            return Err(CompletionError::Provider { status, body });
        }

        let body: ChatResponse = response.json().await.map_err(|error| {
            CompletionError::MalformedResponse(format!("failed to decode response body: {error}"))
        })?;
        body.into_text()
    }
}
