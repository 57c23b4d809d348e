//! LLM provider abstraction for instruction synthesis.
//!
//! This module provides a trait-based abstraction over chat-completion
//! providers with a fake implementation for testing.

mod fake;
mod openai;
mod types;

pub use fake::FakeProvider;
pub use openai::OpenAiProvider;
pub use types::{ChatMessage, ChatRequest, Role};

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Trait for LLM providers.
///
/// Implementations should be stateless and thread-safe. The provider is
/// responsible for making one completion call and returning the model's
/// text response; responses are never cached.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Send a chat request to the LLM and get the text response.
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError>;

    /// Get the provider name (e.g., "openai", "fake").
    fn provider_name(&self) -> &'static str;

    /// Get the model name (e.g., "gpt-4-turbo-preview").
    fn model_name(&self) -> &str;
}

/// Create a provider from environment variables.
///
/// - `GALLEY_LLM_PROVIDER`: "openai" | "fake" (default "openai")
/// - `OPENAI_API_KEY`: API key, required for the openai provider
/// - `GALLEY_LLM_MODEL`: Model name (default "gpt-4-turbo-preview")
/// - `GALLEY_LLM_BASE_URL`: API base URL (default "https://api.openai.com/v1")
pub fn create_provider_from_env() -> Result<Box<dyn LlmProvider>, LlmError> {
    let provider = std::env::var("GALLEY_LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());

    match provider.as_str() {
        "openai" => {
            let api_key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| LlmError::NotConfigured("OPENAI_API_KEY not set".to_string()))?;
            let model = std::env::var("GALLEY_LLM_MODEL")
                .unwrap_or_else(|_| openai::DEFAULT_MODEL.to_string());
            let provider = match std::env::var("GALLEY_LLM_BASE_URL") {
                Ok(base_url) => OpenAiProvider::with_base_url(api_key, model, base_url),
                Err(_) => OpenAiProvider::new(api_key, model),
            };
            Ok(Box::new(provider))
        }
        "fake" => Ok(Box::new(FakeProvider::default())),
        other => Err(LlmError::NotConfigured(format!(
            "Unknown provider: {}",
            other
        ))),
    }
}
