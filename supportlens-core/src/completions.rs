//! Completion backend for SupportLens.
//!
//! Provides a `CompletionBackend` trait with a single production
//! implementation, `AnthropicClient`, which calls the Anthropic Messages
//! API. Both the support-agent chat reply and trace classification go
//! through this trait, so tests can swap in a deterministic stub.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Messages API protocol version, sent on every request.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

// ============================================================================
// CompletionBackend trait
// ============================================================================

/// Abstraction over the text completion provider.
///
/// One prompt in, one text answer out, no conversation state between
/// calls. A failed call surfaces as an error rather than a made-up
/// answer; callers decide what a failure means for them.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send a single-turn prompt and return the model's text answer.
    async fn complete(
        &self,
        system: Option<&str>,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, CompletionError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// Error types
// ============================================================================

/// Completion call errors.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Response contained no text content")]
    EmptyResponse,

    #[error("Missing API key")]
    MissingApiKey,
}

// ============================================================================
// Config types
// ============================================================================

/// Anthropic client configuration.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
}

impl AnthropicConfig {
    /// Build a config, falling back to the ANTHROPIC_API_KEY environment
    /// variable when no key is passed explicitly.
    pub fn new(api_key: Option<String>, model: String) -> Self {
        let api_key = api_key
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .unwrap_or_default();

        Self { api_key, model }
    }
}

// ============================================================================
// Messages API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<MessageParam>,
}

#[derive(Debug, Serialize)]
struct MessageParam {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ============================================================================
// AnthropicClient
// ============================================================================

/// Anthropic completion client, one HTTP call per completion.
///
/// No retry layer: a transient API failure is reported to the caller,
/// which owns the policy (the trace endpoint turns it into a 502, it
/// never silently degrades into a fallback category).
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Result<Self, CompletionError> {
        Self::with_base_url(config, "https://api.anthropic.com".to_string())
    }

    /// Create a client with a custom base URL (for testing / integration)
    pub fn with_base_url(config: AnthropicConfig, base_url: String) -> Result<Self, CompletionError> {
        if config.api_key.is_empty() {
            return Err(CompletionError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    async fn complete_once(
        &self,
        system: Option<&str>,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, CompletionError> {
        let url = format!("{}/v1/messages", self.base_url);

        let request = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens,
            system: system.map(str::to_string),
            messages: vec![MessageParam {
                role: "user".to_string(),
                content: user.to_string(),
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error)
                .map(|e| e.message)
                .unwrap_or(error_body);

            tracing::error!(code = status.as_u16(), message = %message, "Messages API error");

            return Err(CompletionError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let messages_response: MessagesResponse = response.json().await?;

        messages_response
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .ok_or(CompletionError::EmptyResponse)
    }
}

#[async_trait]
impl CompletionBackend for AnthropicClient {
    async fn complete(
        &self,
        system: Option<&str>,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, CompletionError> {
        self.complete_once(system, user, max_tokens).await
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

// ============================================================================
// TESTS
// ============================================================================
