//! Qdrant vector index client over its REST API.
//!
//! Newer Qdrant servers expose `points/query`; older ones only have
//! `points/search`. Queries try the new endpoint first and fall back to the
//! legacy one, so the same binary works against either server generation.
//! Collection creation tolerates the create-vs-create race by re-checking
//! existence when creation fails.

use std::time::Duration;

use civic_lens_models::{IssueRecord, ReportRecord};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::RetrievalError;
use crate::embedder::{EMBEDDING_DIM, Embedder};

/// Default Qdrant endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:6333";

/// Default collection name.
pub const DEFAULT_COLLECTION: &str = "issues";

/// Bounded timeout for index requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Qdrant-backed vector index.
pub struct VectorIndex {
    base_url: String,
    collection: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct QueryResponse {
    result: QueryResult,
}

#[derive(Deserialize)]
struct QueryResult {
    #[serde(default)]
    points: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Deserialize)]
struct ScoredPoint {
    score: Option<f32>,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Serialize)]
struct UpsertRequest {
    points: Vec<Point>,
}

#[derive(Serialize)]
struct Point {
    id: serde_json::Value,
    vector: Vec<f32>,
    payload: serde_json::Value,
}

impl VectorIndex {
    /// Creates a client against the default local Qdrant instance,
    /// honoring `QDRANT_URL` and `QDRANT_COLLECTION` environment variables.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be constructed.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("QDRANT_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let collection =
            std::env::var("QDRANT_COLLECTION").unwrap_or_else(|_| DEFAULT_COLLECTION.to_string());
        Self::new(base_url, collection)
    }

    /// Creates a client against a specific Qdrant endpoint and collection.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be constructed.
    #[must_use]
    pub fn new(base_url: String, collection: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build vector index HTTP client");
        Self {
            base_url,
            collection,
            client,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }

    /// Ensures the collection exists, creating it with the configured
    /// vector size and cosine distance when absent.
    ///
    /// A failed creation is re-checked against existence, so two callers
    /// racing to create the same collection both succeed.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] if the collection neither exists nor can
    /// be created.
    pub async fn ensure_collection(&self) -> Result<(), RetrievalError> {
        if self.collection_exists().await? {
            return Ok(());
        }

        let body = json!({
            "vectors": { "size": EMBEDDING_DIM, "distance": "Cosine" }
        });

        let resp = self
            .client
            .put(self.collection_url())
            .json(&body)
            .send()
            .await?;

        if resp.status().is_success() {
            return Ok(());
        }

        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_default();

        // Lost a create race to another caller.
        if self.collection_exists().await? {
            return Ok(());
        }

        Err(RetrievalError::Status { status, message })
    }

    async fn collection_exists(&self) -> Result<bool, RetrievalError> {
        let resp = self.client.get(self.collection_url()).send().await?;
        Ok(resp.status().is_success())
    }

    /// Deletes the collection. Absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] if the request cannot be sent.
    pub async fn delete_collection(&self) -> Result<(), RetrievalError> {
        self.client.delete(self.collection_url()).send().await?;
        Ok(())
    }

    /// Indexes a single report.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] if embedding or the upsert fails.
    pub async fn index_report(
        &self,
        embedder: &Embedder,
        report: &ReportRecord,
    ) -> Result<(), RetrievalError> {
        self.ensure_collection().await?;

        let vector = embedder.embed(&embedding_content(report)).await?;
        let point = Point {
            id: point_id(report),
            vector,
            payload: serde_json::to_value(report).map_err(|e| RetrievalError::Parse {
                message: format!("Failed to serialize report payload: {e}"),
            })?,
        };

        self.upsert(vec![point]).await
    }

    /// Rebuilds the collection from the given reports and returns how many
    /// were indexed.
    ///
    /// The collection is dropped and recreated first to avoid stale
    /// duplicates. Reports without a title or description are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] if embedding or the batch upsert fails.
    pub async fn sync_reports(
        &self,
        embedder: &Embedder,
        reports: &[ReportRecord],
    ) -> Result<usize, RetrievalError> {
        if let Err(e) = self.delete_collection().await {
            log::warn!("Failed to drop collection before sync: {e}");
        }
        self.ensure_collection().await?;

        let mut points = Vec::new();
        for report in reports {
            if report.title.is_empty() || report.description.is_empty() {
                continue;
            }

            let vector = embedder.embed(&embedding_content(report)).await?;
            points.push(Point {
                id: point_id(report),
                vector,
                payload: serde_json::to_value(report).map_err(|e| RetrievalError::Parse {
                    message: format!("Failed to serialize report payload: {e}"),
                })?,
            });
        }

        let indexed = points.len();
        if indexed > 0 {
            self.upsert(points).await?;
        }

        Ok(indexed)
    }

    async fn upsert(&self, points: Vec<Point>) -> Result<(), RetrievalError> {
        let resp = self
            .client
            .put(format!("{}/points?wait=true", self.collection_url()))
            .json(&UpsertRequest { points })
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

        Ok(())
    }

    /// Nearest-neighbor query, best score first.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] if both the current and legacy query
    /// endpoints fail.
    pub async fn query(&self, vector: &[f32], limit: usize) -> Result<Vec<IssueRecord>, RetrievalError> {
        match self.query_points(vector, limit).await {
            Ok(hits) if !hits.is_empty() => Ok(hits),
            Ok(_) => self.legacy_search(vector, limit).await,
            Err(e) => {
                log::debug!("points/query failed, trying legacy search: {e}");
                self.legacy_search(vector, limit).await
            }
        }
    }

    async fn query_points(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<IssueRecord>, RetrievalError> {
        let body = json!({
            "query": vector,
            "limit": limit,
            "with_payload": true,
        });

        let resp = self
            .client
            .post(format!("{}/points/query", self.collection_url()))
            .json(&body)
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

        let response: QueryResponse = resp.json().await.map_err(|e| RetrievalError::Parse {
            message: format!("Unexpected query response: {e}"),
        })?;

        Ok(response
            .result
            .points
            .iter()
            .map(|p| issue_from_payload(&p.payload, p.score))
            .collect())
    }

    async fn legacy_search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<IssueRecord>, RetrievalError> {
        let body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });

        let resp = self
            .client
            .post(format!("{}/points/search", self.collection_url()))
            .json(&body)
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

        let response: SearchResponse = resp.json().await.map_err(|e| RetrievalError::Parse {
            message: format!("Unexpected search response: {e}"),
        })?;

        Ok(response
            .result
            .iter()
            .map(|p| issue_from_payload(&p.payload, p.score))
            .collect())
    }
}

/// The text embedded for one report.
#[must_use]
pub fn embedding_content(report: &ReportRecord) -> String {
    format!(
        "Report ID: {}. Title: {}. Description: {}. Location: {}. Type: {} - {}.",
        report.report_id,
        report.title,
        report.description,
        report.location.as_deref().unwrap_or(""),
        report.report_type.as_ref(),
        report.specific_type,
    )
}

/// Stable point id for a report.
///
/// Numeric storage ids become integer point ids; a UUID-shaped report id is
/// used directly; anything else gets a deterministic UUIDv5 in the URL
/// namespace so re-syncing never duplicates points.
#[must_use]
pub fn point_id(report: &ReportRecord) -> serde_json::Value {
    if !report.id.is_empty() && report.id.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(numeric) = report.id.parse::<u64>() {
            return json!(numeric);
        }
    }

    let report_id = report.report_id.trim();
    if let Ok(parsed) = Uuid::parse_str(report_id) {
        return json!(parsed.to_string());
    }

    let base_name = if report_id.is_empty() {
        format!("{}|{}", report.title, report.created_at)
    } else {
        report_id.to_string()
    };

    json!(Uuid::new_v5(&Uuid::NAMESPACE_URL, base_name.as_bytes()).to_string())
}

/// Maps a hit payload to an [`IssueRecord`], tolerating absent fields.
#[must_use]
pub fn issue_from_payload(payload: &serde_json::Value, score: Option<f32>) -> IssueRecord {
    let text = |key: &str| {
        payload
            .get(key)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let id = {
        let id = text("id");
        if id.is_empty() { text("reportId") } else { id }
    };

    IssueRecord {
        id,
        title: text("title"),
        description: text("description"),
        location: {
            let location = text("location");
            if location.is_empty() {
                None
            } else {
                Some(location)
            }
        },
        latitude: payload.get("latitude").and_then(serde_json::Value::as_f64),
        longitude: payload.get("longitude").and_then(serde_json::Value::as_f64),
        score,
    }
}

#[cfg(test)]
mod tests {
    use civic_lens_models::{ReportStatus, ReportType};

    use super::*;

    fn report(id: &str, report_id: &str) -> ReportRecord {
        ReportRecord {
            id: id.to_string(),
            report_id: report_id.to_string(),
            report_type: ReportType::NonEmergency,
            title: "Pothole on the lake road".to_string(),
            description: "Deep pothole near the bus stop".to_string(),
            specific_type: "pothole".to_string(),
            location: Some("Bhimtal, Uttarakhand".to_string()),
            latitude: Some(29.3938),
            longitude: Some(79.4538),
            status: ReportStatus::Pending,
            is_anonymous: true,
            reporter_name: None,
            reporter_email: None,
            reporter_phone: None,
            reporter_user_id: None,
            department_id: None,
            department_name: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn numeric_storage_id_becomes_integer_point_id() {
        let id = point_id(&report("42", "abc123"));
        assert_eq!(id, json!(42));
    }

    #[test]
    fn uuid_report_id_is_used_directly() {
        let id = point_id(&report("", "4d14ffa4-138d-4bd0-8f1a-5c9b2c7d8e9f"));
        assert_eq!(id, json!("4d14ffa4-138d-4bd0-8f1a-5c9b2c7d8e9f"));
    }

    #[test]
    fn other_report_ids_get_deterministic_uuid5() {
        let a = point_id(&report("", "CIV-2025-0042"));
        let b = point_id(&report("", "CIV-2025-0042"));
        assert_eq!(a, b);
        assert_ne!(a, point_id(&report("", "CIV-2025-0043")));
    }

    #[test]
    fn embedding_content_includes_key_fields() {
        let content = embedding_content(&report("1", "abc"));
        assert!(content.contains("Report ID: abc"));
        assert!(content.contains("Pothole on the lake road"));
        assert!(content.contains("Bhimtal, Uttarakhand"));
    }

    #[test]
    fn payload_mapping_prefers_id_and_tolerates_gaps() {
        let payload = json!({
            "reportId": "abc123",
            "title": "Water leakage",
        });
        let issue = issue_from_payload(&payload, Some(0.87));
        assert_eq!(issue.id, "abc123");
        assert_eq!(issue.title, "Water leakage");
        assert!(issue.location.is_none());
        assert_eq!(issue.score, Some(0.87));
    }
}
