//! OpenAI-compatible chat-completions provider.

use super::{ChatRequest, LlmError, LlmProvider, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default model for instruction synthesis.
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API provider.
#[derive(Debug)]
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Create a new provider with the given API key and model.
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL.to_string())
    }

    /// Create a provider against a custom OpenAI-compatible endpoint.
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            base_url,
            client: reqwest::Client::new(),
        }
    }
}

/// OpenAI API request format.
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiApiError {
    message: String,
}

/// Error response from the OpenAI API.
#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiApiError,
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn build_request(model: &str, request: &ChatRequest) -> OpenAiRequest {
    OpenAiRequest {
        model: model.to_string(),
        messages: request
            .messages
            .iter()
            .map(|m| OpenAiMessage {
                role: role_str(m.role),
                content: m.content.clone(),
            })
            .collect(),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        response_format: request.json_response.then_some(ResponseFormat {
            format_type: "json_object",
        }),
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        let api_request = build_request(&self.model, &request);

        tracing::debug!(model = %self.model, "Calling chat completions API");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(LlmError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if status != 200 {
            // Try to parse error response
            if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(&body) {
                return Err(LlmError::ApiError {
                    status,
                    message: error_response.error.message,
                });
            }
            return Err(LlmError::ApiError {
                status,
                message: body,
            });
        }

        let response: OpenAiResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::ParseError(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::ParseError("No content in response".to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    #[test]
    fn test_build_request_json_mode() {
        let request = ChatRequest {
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            max_tokens: Some(256),
            temperature: None,
            json_response: true,
        };

        let wire = serde_json::to_value(build_request("gpt-4-turbo-preview", &request)).unwrap();

        assert_eq!(wire["model"], "gpt-4-turbo-preview");
        assert_eq!(wire["messages"][0]["role"], "system");
        assert_eq!(wire["messages"][1]["content"], "hi");
        assert_eq!(wire["response_format"]["type"], "json_object");
        assert_eq!(wire["max_tokens"], 256);
        assert!(wire.get("temperature").is_none());
    }

    #[test]
    fn test_build_request_plain_mode_omits_response_format() {
        let request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            ..Default::default()
        };

        let wire = serde_json::to_value(build_request("gpt-4-turbo-preview", &request)).unwrap();

        assert!(wire.get("response_format").is_none());
    }
}
