//! Text embedding via an Ollama embeddings endpoint.
//!
//! The embedding model handle is process-wide and initialized at most once
//! through a [`OnceLock`], so concurrent first requests never construct two
//! clients or race on initialization.

use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::RetrievalError;

/// Default Ollama endpoint for embeddings.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default embedding model. Produces 384-dimensional vectors.
pub const DEFAULT_MODEL: &str = "all-minilm";

/// Embedding vector dimensionality the index is built for.
pub const EMBEDDING_DIM: usize = 384;

/// Bounded timeout for embedding requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

static SHARED: OnceLock<Embedder> = OnceLock::new();

/// The process-wide embedder, built from `OLLAMA_BASE_URL` and
/// `EMBEDDING_MODEL` environment variables on first use.
pub fn shared_embedder() -> &'static Embedder {
    SHARED.get_or_init(|| {
        let base_url =
            std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        log::info!("Initializing embedder: model={model} url={base_url}");
        Embedder::new(base_url, model)
    })
}

/// Ollama-backed embedding client.
pub struct Embedder {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

impl Embedder {
    /// Creates an embedding client.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be constructed.
    #[must_use]
    pub fn new(base_url: String, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build embedder HTTP client");
        Self {
            base_url,
            model,
            client,
        }
    }

    /// Embeds one text into a fixed-dimensionality vector.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] if the request fails or the returned
    /// vector has the wrong dimensionality.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let request = EmbeddingsRequest {
            model: &self.model,
            prompt: text,
        };

        let resp = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RetrievalError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let response: EmbeddingsResponse =
            resp.json().await.map_err(|e| RetrievalError::Parse {
                message: format!("Unexpected embeddings response: {e}"),
            })?;

        if response.embedding.len() != EMBEDDING_DIM {
            return Err(RetrievalError::DimensionMismatch {
                expected: EMBEDDING_DIM,
                actual: response.embedding.len(),
            });
        }

        Ok(response.embedding)
    }
}
