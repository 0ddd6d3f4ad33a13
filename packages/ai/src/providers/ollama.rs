//! Ollama provider implementation.
//!
//! Talks to a local (or remote) Ollama server via `/api/generate` with
//! streaming disabled.

use serde::{Deserialize, Serialize};

use super::{LlmProvider, REQUEST_TIMEOUT};
use crate::AiError;

/// Default Ollama endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Ollama API provider.
pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Creates a new Ollama provider.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be constructed.
    #[must_use]
    pub fn new(base_url: String, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build Ollama HTTP client");
        Self {
            base_url,
            model,
            client,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait::async_trait]
impl LlmProvider for OllamaProvider {
    async fn chat(&self, system_prompt: &str, message: &str) -> Result<String, AiError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt: message,
            system: system_prompt,
            stream: false,
        };

        let resp = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(AiError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let response: GenerateResponse = serde_json::from_str(&body)?;

        let text = response.response.trim();
        if text.is_empty() {
            return Err(AiError::Provider {
                message: "Empty response from Ollama".to_string(),
            });
        }

        Ok(text.to_string())
    }
}
