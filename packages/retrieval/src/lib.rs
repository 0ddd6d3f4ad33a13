#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hybrid issue retrieval: semantic vector search with a deterministic
//! geographic + keyword fallback.
//!
//! The pipeline is a linear fallback chain. The semantic stage embeds an
//! enriched query and asks the vector index for nearest neighbors; any
//! transport or index error there degrades to zero results rather than
//! failing the call. The fallback stage scans stored reports with
//! area-term and query-token filters, sorted by great-circle distance when
//! the caller supplied coordinates. A final exclusion filter drops results
//! from places outside the deployment's service area.
//!
//! Every result set carries a provenance tag so callers and tests can tell
//! real semantic hits from heuristic fallback hits.

pub mod config;
pub mod embedder;
pub mod engine;
pub mod enrich;
pub mod vector;

use civic_lens_models::ErrorKind;
use thiserror::Error;

/// Errors from the retrieval collaborators (embedding, vector index).
///
/// The engine itself never surfaces these to callers — a failing semantic
/// stage yields zero results and control moves to the fallback — but the
/// index-sync path does, since a sync that silently indexed nothing would
/// be worse than an error.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The collaborator returned a non-success status.
    #[error("Upstream returned HTTP {status}: {message}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// Upstream error text, if any.
        message: String,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// The embedding service returned a vector of the wrong dimensionality.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The configured vector size.
        expected: usize,
        /// What the service returned.
        actual: usize,
    },
}

impl RetrievalError {
    /// Classifies this error into the shared failure taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(e) if e.is_timeout() => ErrorKind::UpstreamTimeout,
            Self::Status { status, .. } if matches!(status, 401 | 403 | 429) => {
                ErrorKind::UpstreamQuotaOrAuth
            }
            Self::Http(_) | Self::Status { .. } => ErrorKind::UpstreamUnavailable,
            Self::Parse { .. } | Self::DimensionMismatch { .. } => ErrorKind::Internal,
        }
    }
}
