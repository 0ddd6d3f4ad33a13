//! LLM provider trait and implementations.
//!
//! Supports Google Gemini and Ollama via a common trait.

pub mod gemini;
pub mod ollama;

use std::time::Duration;

use crate::AiError;

/// Bounded timeout for LLM completion requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends a single-turn completion request and returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails.
    async fn chat(&self, system_prompt: &str, message: &str) -> Result<String, AiError>;
}

/// Creates an LLM provider based on environment variables.
///
/// If `AI_PROVIDER` is explicitly set ("gemini" or "ollama"), uses that
/// provider. Otherwise auto-detects:
///
/// 1. `GEMINI_API_KEY` set -> Gemini
/// 2. Otherwise -> Ollama at `OLLAMA_BASE_URL` (default
///    `http://localhost:11434`)
///
/// # Errors
///
/// Returns [`AiError::Config`] if the explicitly requested provider is not
/// configured or unknown.
pub fn create_provider_from_env() -> Result<Box<dyn LlmProvider>, AiError> {
    let provider = std::env::var("AI_PROVIDER").unwrap_or_else(|_| detect_provider());

    match provider.to_lowercase().as_str() {
        "gemini" => {
            let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| AiError::Config {
                message: "GEMINI_API_KEY environment variable not set".to_string(),
            })?;
            let model =
                std::env::var("AI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());
            Ok(Box::new(gemini::GeminiProvider::new(api_key, model)))
        }
        "ollama" => {
            let base_url = std::env::var("OLLAMA_BASE_URL")
                .unwrap_or_else(|_| ollama::DEFAULT_BASE_URL.to_string());
            let model = std::env::var("AI_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
            Ok(Box::new(ollama::OllamaProvider::new(base_url, model)))
        }
        other => Err(AiError::Config {
            message: format!("Unknown AI provider: {other}. Use 'gemini' or 'ollama'."),
        }),
    }
}

/// Auto-detects which provider to use based on available credentials.
fn detect_provider() -> String {
    if std::env::var("GEMINI_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: Gemini (GEMINI_API_KEY found)");
        return "gemini".to_string();
    }

    log::info!("No GEMINI_API_KEY found; defaulting to Ollama");
    "ollama".to_string()
}
