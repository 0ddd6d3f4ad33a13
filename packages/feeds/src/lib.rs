#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Weather and news feed clients.
//!
//! News comes from `NewsAPI` when an API key is configured, with Google
//! News RSS as a keyless fallback. Weather comes from weatherapi.com.
//! Requests carry a bounded 10 s timeout and failures surface as tagged
//! [`FeedError`]s.

pub mod news;
pub mod weather;

use std::time::Duration;

use civic_lens_models::ErrorKind;
use thiserror::Error;

/// Bounded timeout for feed requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from feed operations.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream returned a non-success status.
    #[error("Feed API error: {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// A required API key is not configured.
    #[error("Missing API key: {name}")]
    MissingApiKey {
        /// Name of the environment variable.
        name: &'static str,
    },

    /// No articles were found after all strategies.
    #[error("No articles found")]
    NoArticles,
}

impl FeedError {
    /// Classifies this error into the shared failure taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(e) if e.is_timeout() => ErrorKind::UpstreamTimeout,
            Self::Status { status } if matches!(status, 401 | 403 | 429) => {
                ErrorKind::UpstreamQuotaOrAuth
            }
            Self::Http(_) | Self::Status { .. } => ErrorKind::UpstreamUnavailable,
            Self::MissingApiKey { .. } => ErrorKind::UpstreamQuotaOrAuth,
            Self::Parse { .. } => ErrorKind::Internal,
            Self::NoArticles => ErrorKind::NotFound,
        }
    }
}
