use crate::error::AppError;
use crate::utils::inference::{ChatMessage, CompletionRequest, Provider};
use std::sync::Arc;

pub const SYSTEM_PROMPT: &str = "You are a seasoned financial analyst. \
When given a stock ticker or company name, \
produce a concise, professional financial report \
covering key metrics, recent performance, and outlook. \
Make it short, around 200 words.";

/// Turns a user's question into a short financial report.
///
/// Every call is a fresh single-turn conversation: the fixed analyst prompt
/// followed by the user's message. Sampling is greedy so the same question
/// gets the same answer (as far as the provider honours temperature 0).
pub struct ReportEngine {
    provider: Arc<dyn Provider>,
    max_tokens: u32,
}

impl ReportEngine {
    pub fn new(provider: Arc<dyn Provider>, max_tokens: u32) -> Self {
        Self {
            provider,
            max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub fn request_for(&self, message: &str) -> CompletionRequest {
        CompletionRequest {
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(message)],
            max_tokens: self.max_tokens,
            temperature: 0.0,
        }
    }

    /// One provider round trip. No retries, no caching.
    pub async fn generate(&self, message: &str) -> Result<String, AppError> {
        let request = self.request_for(message);
        let reply = self.provider.complete(&request).await?;

        let reply = reply.trim();
        if reply.is_empty() {
            return Err(AppError::Service("model returned an empty reply".to_string()));
        }

        Ok(reply.to_string())
    }
}
