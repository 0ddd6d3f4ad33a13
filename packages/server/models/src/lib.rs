#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the CivicLens server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the storage row types to allow independent evolution of the API
//! contract.

use civic_lens_models::{Coordinates, ReportRecord, ReportStatus, ReportType};
use serde::{Deserialize, Serialize};

/// Body for `POST /api/chat`.
///
/// Coordinates are validated during deserialization; out-of-range values
/// reject the whole request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
    /// The user's device location, if shared.
    pub location: Option<Coordinates>,
}

/// Body for `POST /api/reports/create`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    /// Client-supplied user-facing identifier; generated when absent.
    pub report_id: Option<String>,
    /// Emergency vs. non-emergency.
    #[serde(rename = "type")]
    pub report_type: ReportType,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Finer-grained issue type (e.g. "POTHOLE").
    pub specific_type: String,
    /// Free-text location description.
    pub location: Option<String>,
    /// Latitude, if geotagged.
    pub latitude: Option<f64>,
    /// Longitude, if geotagged.
    pub longitude: Option<f64>,
    /// Whether the reporter withheld identity. Defaults to anonymous.
    #[serde(default = "default_anonymous")]
    pub is_anonymous: bool,
    /// Reporter display name.
    pub reporter_name: Option<String>,
    /// Reporter contact email.
    pub reporter_email: Option<String>,
    /// Reporter contact phone.
    pub reporter_phone: Option<String>,
    /// Reporter account id, if signed in.
    pub reporter_user_id: Option<i64>,
    /// Assigned department id.
    pub department_id: Option<i64>,
    /// Assigned department name.
    pub department_name: Option<String>,
}

const fn default_anonymous() -> bool {
    true
}

/// Response from `POST /api/reports`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportResponse {
    /// Whether the report was stored.
    pub success: bool,
    /// The generated user-facing identifier.
    pub report_id: String,
    /// The stored record.
    pub report: ReportRecord,
}

/// Query parameters for `GET /api/reports`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListParams {
    /// Filter by lifecycle status.
    pub status: Option<ReportStatus>,
    /// Filter by report type.
    #[serde(rename = "type")]
    pub report_type: Option<ReportType>,
    /// Filter by reporter account id.
    pub reporter_user_id: Option<i64>,
    /// Filter by reporter email.
    pub reporter_email: Option<String>,
    /// Filter by assigned department name.
    pub department_name: Option<String>,
}

/// Body for `PUT /api/reports/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    /// The new lifecycle status.
    pub status: ReportStatus,
}

/// Response from `POST /api/sync-index`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncIndexResponse {
    /// Whether the rebuild completed.
    pub success: bool,
    /// Number of reports embedded and indexed.
    pub indexed: usize,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_rejects_out_of_range_coordinates() {
        let ok: ChatRequest = serde_json::from_str(
            r#"{"message": "weather here", "location": {"lat": 29.4, "lon": 79.5}}"#,
        )
        .unwrap();
        assert!(ok.location.is_some());

        let bad = serde_json::from_str::<ChatRequest>(
            r#"{"message": "weather here", "location": {"lat": 200.0, "lon": 79.5}}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn create_report_defaults_to_anonymous() {
        let req: CreateReportRequest = serde_json::from_str(
            r#"{
                "type": "NON_EMERGENCY",
                "title": "Pothole",
                "description": "Deep pothole",
                "specificType": "POTHOLE"
            }"#,
        )
        .unwrap();
        assert!(req.is_anonymous);
        assert_eq!(req.report_type, ReportType::NonEmergency);
    }

    #[test]
    fn list_params_parse_status_filter() {
        let params: ReportListParams =
            serde_json::from_str(r#"{"status": "IN_PROGRESS"}"#).unwrap();
        assert_eq!(params.status, Some(ReportStatus::InProgress));
    }
}
