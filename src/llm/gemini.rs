//! Google Gemini client.

use super::{LlmHttpConfig, LlmProvider, build_http_client};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Google Gemini LLM client.
pub struct GeminiClient {
    /// API key.
    api_key: Option<String>,
    /// API endpoint.
    endpoint: String,
    /// Model to use.
    model: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";

    /// Creates a new Gemini client, reading `GOOGLE_API_KEY` from the
    /// environment.
    #[must_use]
    pub fn new() -> Self {
        let api_key = std::env::var("GOOGLE_API_KEY").ok();
        Self {
            api_key,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            model: Self::DEFAULT_MODEL.to_string(),
            client: build_http_client(LlmHttpConfig::from_env()),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets HTTP client timeouts for LLM requests.
    #[must_use]
    pub fn with_http_config(mut self, config: LlmHttpConfig) -> Self {
        self.client = build_http_client(config);
        self
    }

    /// Validates that the client is configured with an API key.
    fn validate(&self) -> Result<()> {
        let key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::MissingCredentials("GOOGLE_API_KEY not set".to_string()))?;

        if key.trim().is_empty() {
            return Err(Error::MissingCredentials(
                "GOOGLE_API_KEY is empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Makes a generateContent request to the Gemini API.
    fn request(&self, prompt: &str) -> Result<String> {
        self.validate()?;

        tracing::info!(provider = "gemini", model = %self.model, "Making LLM request");

        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::MissingCredentials("GOOGLE_API_KEY not set".to_string()))?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig { temperature: 0.7 },
        };

        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| {
                let error_kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connect"
                } else if e.is_request() {
                    "request"
                } else {
                    "unknown"
                };
                tracing::error!(
                    provider = "gemini",
                    model = %self.model,
                    error = %e,
                    error_kind = error_kind,
                    "LLM request failed"
                );
                Error::OperationFailed {
                    operation: "gemini_request".to_string(),
                    cause: format!("{error_kind} error: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(
                provider = "gemini",
                model = %self.model,
                status = %status,
                body = %body,
                "LLM API returned error status"
            );
            return Err(Error::OperationFailed {
                operation: "gemini_request".to_string(),
                cause: format!("API returned status: {status} - {body}"),
            });
        }

        let response: GenerateContentResponse = response.json().map_err(|e| {
            tracing::error!(
                provider = "gemini",
                model = %self.model,
                error = %e,
                "Failed to parse LLM response"
            );
            Error::OperationFailed {
                operation: "gemini_response".to_string(),
                cause: e.to_string(),
            }
        })?;

        // Extract text from the first candidate's first part
        response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| Error::OperationFailed {
                operation: "gemini_response".to_string(),
                cause: "No text content in response".to_string(),
            })
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        self.request(prompt)
    }
}

/// Request to the generateContent API.
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

/// Generation parameters.
#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// A content block in the conversation.
#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

/// A text part within a content block.
#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

/// Response from the generateContent API.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// A response candidate.
#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
