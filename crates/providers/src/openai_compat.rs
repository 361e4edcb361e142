//! OpenAI-compatible completion engine.
//!
//! Talks to the plain-text `/completions` endpoint (prompt in, continuation
//! out) exposed by OpenAI and most self-hosted servers that mimic it.

use async_trait::async_trait;
use replybot_core::engine::{Completion, CompletionEngine, CompletionParams, Usage};
use replybot_core::error::EngineError;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// An engine backed by an OpenAI-compatible HTTP API.
pub struct OpenAiCompletionEngine {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompletionEngine {
    /// Create a new engine with the given per-request timeout.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::NotConfigured(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Build the JSON request body for a completion call.
    fn request_body(params: &CompletionParams) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": params.model,
            "prompt": params.prompt,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });

        if let Some(top_p) = params.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }

        body
    }

    /// Map a non-success HTTP status to an engine error.
    fn status_error(status: u16, body: String) -> EngineError {
        match status {
            429 => EngineError::RateLimited {
                retry_after_secs: 5,
            },
            401 | 403 => EngineError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ),
            _ => EngineError::ApiError {
                status_code: status,
                message: body,
            },
        }
    }

    /// Pull the first choice out of a parsed response.
    fn into_completion(api_response: ApiResponse, requested_model: &str) -> Result<Completion, EngineError> {
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(Completion {
            text: choice.text,
            model: api_response
                .model
                .unwrap_or_else(|| requested_model.to_string()),
            usage,
        })
    }
}

#[async_trait]
impl CompletionEngine for OpenAiCompletionEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, params: CompletionParams) -> Result<Completion, EngineError> {
        let url = format!("{}/completions", self.base_url);
        let body = Self::request_body(&params);

        debug!(engine = %self.name, model = %params.model, max_tokens = params.max_tokens, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::Timeout(e.to_string())
                } else {
                    EngineError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(engine = %self.name, status, body = %error_body, "Engine returned error");
            return Err(Self::status_error(status, error_body));
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| EngineError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        Self::into_completion(api_response, &params.model)
    }

    async fn health_check(&self) -> Result<bool, EngineError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| EngineError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_keeps_name_and_url() {
        let engine = OpenAiCompletionEngine::new(
            "openai",
            "https://api.openai.com/v1",
            "sk-test",
            Duration::from_secs(120),
        )
        .unwrap();
        assert_eq!(engine.name(), "openai");
        assert!(engine.base_url.contains("api.openai.com"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let engine = OpenAiCompletionEngine::new(
            "local",
            "http://localhost:8000/v1/",
            "",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(engine.base_url, "http://localhost:8000/v1");
    }

    #[test]
    fn body_carries_sampling_params() {
        let params = CompletionParams::new("davinci", "Rook:", 55, 0.9);
        let body = OpenAiCompletionEngine::request_body(&params);
        assert_eq!(body["model"], "davinci");
        assert_eq!(body["prompt"], "Rook:");
        assert_eq!(body["max_tokens"], 55);
        assert!(body.get("top_p").is_none());
    }

    #[test]
    fn classifier_body_includes_top_p() {
        let params = CompletionParams::new("content-filter-alpha-c4", "x", 1, 0.0).with_top_p(0.0);
        let body = OpenAiCompletionEngine::request_body(&params);
        assert_eq!(body["top_p"], 0.0);
        assert_eq!(body["temperature"], 0.0);
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            OpenAiCompletionEngine::status_error(429, String::new()),
            EngineError::RateLimited { .. }
        ));
        assert!(matches!(
            OpenAiCompletionEngine::status_error(401, String::new()),
            EngineError::AuthenticationFailed(_)
        ));
        match OpenAiCompletionEngine::status_error(500, "boom".into()) {
            EngineError::ApiError {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("Expected ApiError, got: {other:?}"),
        }
    }

    #[test]
    fn parse_completion_response() {
        let data = r#"{
            "id": "cmpl-1",
            "object": "text_completion",
            "model": "davinci:2020-05-03",
            "choices": [{"text": " Sure thing.", "index": 0, "finish_reason": "length"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        let completion = OpenAiCompletionEngine::into_completion(parsed, "davinci").unwrap();
        assert_eq!(completion.text, " Sure thing.");
        assert_eq!(completion.model, "davinci:2020-05-03");
        assert_eq!(completion.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn missing_model_falls_back_to_requested() {
        let parsed: ApiResponse = serde_json::from_str(r#"{"choices": [{"text": "0"}]}"#).unwrap();
        let completion =
            OpenAiCompletionEngine::into_completion(parsed, "content-filter-alpha-c4").unwrap();
        assert_eq!(completion.text, "0");
        assert_eq!(completion.model, "content-filter-alpha-c4");
    }

    #[test]
    fn empty_choices_is_an_error() {
        let parsed: ApiResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(OpenAiCompletionEngine::into_completion(parsed, "ada").is_err());
    }
}
