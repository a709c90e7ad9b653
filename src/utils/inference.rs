//! Chat-completion providers.
//!
//! The rest of the service only knows about the [`Provider`] trait. The one
//! real implementation talks to Hugging Face's OpenAI-compatible router, and
//! tests swap in their own.

use crate::config::InferenceConfig;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// One message in a chat-completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// What to ask the model and how to sample.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Anything that can turn a list of chat messages into text.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns the raw content of the first completion choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AppError>;

    /// Model identifier, for logs and the health endpoint.
    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Hugging Face serverless inference, via the router's
/// `/v1/chat/completions` endpoint.
pub struct HuggingFaceProvider {
    client: Client,
    endpoint: String,
    model: String,
    api_token: String,
}

impl HuggingFaceProvider {
    pub fn new(config: &InferenceConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("reportdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Service(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Hugging Face provider: endpoint={}, model={}",
            config.endpoint,
            config.model
        );

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_token: config.api_token.clone(),
        })
    }
}

#[async_trait]
impl Provider for HuggingFaceProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AppError> {
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };

        tracing::debug!(
            "Sending completion request: {} messages, max_tokens={}",
            request.messages.len(),
            request.max_tokens
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Inference request failed: {}", e);
                AppError::Service(format!("request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Inference endpoint returned {}: {}", status, error_text);
            return Err(AppError::Service(format!("endpoint returned {}", status)));
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse completion response: {}", e);
            AppError::Service(format!("unreadable response: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Service("response contained no completion".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
