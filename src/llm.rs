//! Answer generation over an OpenAI-compatible chat completion service.
//!
//! The retrieval engine never depends on this module. The chat use case
//! talks to it through [`AnswerGenerator`], which never fails: an
//! unconfigured or unreachable service yields a fixed notice string instead.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the service API key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Response text when no service is configured.
pub const NOT_AVAILABLE: &str = "LLM service not available.";

/// Errors from the answer-generation subsystem.
#[derive(Debug, Error, Diagnostic)]
pub enum LlmError {
    #[error("answer service is not configured")]
    #[diagnostic(
        code(ayur::llm::not_configured),
        help("Set the GROQ_API_KEY environment variable to enable answer generation.")
    )]
    NotConfigured,

    #[error("{message}")]
    #[diagnostic(
        code(ayur::llm::request_failed),
        help("Check network access to the answer service and that the API key is valid.")
    )]
    RequestFailed { message: String },

    #[error("failed to parse answer service response: {message}")]
    #[diagnostic(
        code(ayur::llm::parse_error),
        help("The service returned an unexpected response format.")
    )]
    ParseError { message: String },
}

/// Connection and sampling settings for the answer service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_model() -> String {
    "gemma2-9b-it".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    1500
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Produces a natural-language answer from prompts and grounding text.
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer. `context` is empty when there is no grounding.
    fn generate(&self, system_prompt: &str, user_message: &str, context: &str) -> String;
}

/// One chat message in a completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// "system", "user" or "assistant".
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Request messages: system prompt, optional grounding, then the user turn.
pub fn build_messages(system_prompt: &str, user_message: &str, context: &str) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_prompt)];
    if !context.is_empty() {
        messages.push(ChatMessage::system(format!(
            "Knowledge Graph Context:\n{context}"
        )));
    }
    messages.push(ChatMessage::user(user_message));
    messages
}

/// Client for the Groq chat completion API.
pub struct GroqClient {
    config: LlmConfig,
    api_key: Option<String>,
}

impl GroqClient {
    /// Create a client. Without an API key every request is refused.
    pub fn new(config: LlmConfig, api_key: Option<String>) -> Self {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_some() {
            tracing::info!(model = %config.model, "answer service initialized");
        } else {
            tracing::warn!("answer service not configured");
        }
        Self { config, api_key }
    }

    /// Create a client reading the API key from [`API_KEY_ENV`].
    pub fn from_env(config: LlmConfig) -> Self {
        Self::new(config, std::env::var(API_KEY_ENV).ok())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send one chat completion request and return the answer text.
    pub fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let Some(ref api_key) = self.api_key else {
            return Err(LlmError::NotConfigured);
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .build();

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });

        let body_str = serde_json::to_string(&body).map_err(|e| LlmError::RequestFailed {
            message: format!("JSON serialize error: {e}"),
        })?;

        let resp = agent
            .post(&url)
            .set("Content-Type", "application/json")
            .set("Authorization", &format!("Bearer {api_key}"))
            .send_string(&body_str)
            .map_err(|e: ureq::Error| LlmError::RequestFailed {
                message: e.to_string(),
            })?;

        let resp_str = resp.into_string().map_err(|e| LlmError::ParseError {
            message: e.to_string(),
        })?;

        parse_completion(&resp_str)
    }
}

/// Extract the first choice's message content from a completion response.
fn parse_completion(body: &str) -> Result<String, LlmError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| LlmError::ParseError {
            message: e.to_string(),
        })?;

    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| LlmError::ParseError {
            message: "missing 'choices[0].message.content' field".into(),
        })
}

impl AnswerGenerator for GroqClient {
    fn generate(&self, system_prompt: &str, user_message: &str, context: &str) -> String {
        match self.complete(&build_messages(system_prompt, user_message, context)) {
            Ok(answer) => answer,
            Err(LlmError::NotConfigured) => NOT_AVAILABLE.to_string(),
            Err(e) => {
                tracing::error!(error = %e, "answer generation failed");
                format!("Error calling LLM: {e}")
            }
        }
    }
}

impl std::fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("configured", &self.is_configured())
            .finish()
    }
}
