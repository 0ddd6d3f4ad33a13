#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! LLM provider abstraction for conversational replies.
//!
//! Supports Google Gemini and any local Ollama server via a common trait.
//! The assistant only needs single-turn completions (a system prompt plus
//! one user message), so the trait surface is deliberately small. Providers
//! are selected from environment variables with auto-detection, and all
//! requests carry a bounded 30 s timeout.

pub mod providers;

use civic_lens_models::ErrorKind;
use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to the LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider returned a non-success status.
    #[error("Provider returned HTTP {status}: {message}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// Upstream error text, if any.
        message: String,
    },

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

impl AiError {
    /// Classifies this error into the shared failure taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(e) if e.is_timeout() => ErrorKind::UpstreamTimeout,
            Self::Status { status, .. } if matches!(status, 401 | 403 | 429) => {
                ErrorKind::UpstreamQuotaOrAuth
            }
            Self::Http(_) | Self::Status { .. } => ErrorKind::UpstreamUnavailable,
            Self::Json(_) | Self::Provider { .. } | Self::Config { .. } => ErrorKind::Internal,
        }
    }
}
