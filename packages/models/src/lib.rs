#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core domain types shared across the CivicLens assistant.
//!
//! Defines the validated coordinate value type, the closed intent taxonomy,
//! report and retrieval record shapes, and the uniform response envelope
//! every assistant branch produces.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A validated WGS84 coordinate pair.
///
/// Construction validates ranges once at the boundary; downstream code can
/// rely on `lat ∈ [-90, 90]` and `lon ∈ [-180, 180]` without re-checking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    lat: f64,
    lon: f64,
}

/// Unvalidated wire shape for [`Coordinates`] deserialization.
#[derive(Debug, Clone, Copy, Deserialize)]
struct RawCoordinates {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = InvalidCoordinatesError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lon)
    }
}

impl Coordinates {
    /// Creates a coordinate pair after range validation.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinatesError`] if latitude is outside
    /// `[-90, 90]` or longitude is outside `[-180, 180]`.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InvalidCoordinatesError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(InvalidCoordinatesError { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lon(self) -> f64 {
        self.lon
    }
}

/// Error returned when constructing [`Coordinates`] from out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("invalid coordinates ({lat}, {lon}): expected lat in [-90, 90], lon in [-180, 180]")]
pub struct InvalidCoordinatesError {
    /// The rejected latitude.
    pub lat: f64,
    /// The rejected longitude.
    pub lon: f64,
}

/// Address fields produced by reverse geocoding.
///
/// All fields are optional — upstream geocoders omit whatever they don't
/// know. Consumed by query enrichment and the response composer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInfo {
    /// City (or town/village fallback).
    pub city: Option<String>,
    /// State or province.
    pub state: Option<String>,
    /// Country name.
    pub country: Option<String>,
    /// Postal code.
    pub postcode: Option<String>,
    /// Full display address string.
    pub display_name: Option<String>,
}

/// The categorical purpose assigned to one user message.
///
/// Classification is total: every message maps to exactly one intent, with
/// [`Intent::GeneralChat`] as the default.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    /// Status lookup of an existing report by identifier.
    TrackReport,
    /// National (India) headlines.
    IndiaNews,
    /// News for the user's vicinity or a named place.
    LocalNews,
    /// Current weather conditions.
    Weather,
    /// Search over stored community issue reports.
    LocalIssues,
    /// "Where am I" style queries.
    LocationQuery,
    /// Generic report/complaint assistance.
    Reports,
    /// A bare confirmation token ("yes", "ok", ...).
    Confirmation,
    /// Anything else — free-form conversation.
    GeneralChat,
}

impl Intent {
    /// The tag placed in the [`ResponseEnvelope`] for this intent.
    ///
    /// Several intents share an envelope tag: both news branches and the
    /// confirmation branch report as `news`, tracking and generic report
    /// queries as `reports`, and location queries as `general`.
    #[must_use]
    pub const fn envelope_tag(self) -> &'static str {
        match self {
            Self::TrackReport | Self::Reports => "reports",
            Self::IndiaNews | Self::LocalNews | Self::Confirmation => "news",
            Self::Weather => "weather",
            Self::LocalIssues => "local_issues",
            Self::LocationQuery | Self::GeneralChat => "general",
        }
    }
}

/// Lifecycle status of a stored report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ReportStatus {
    /// Submitted, not yet triaged.
    Pending,
    /// Assigned and being worked.
    InProgress,
    /// Fixed or otherwise closed out.
    Resolved,
    /// Closed without action.
    Dismissed,
}

impl Default for ReportStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Broad report classification.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ReportType {
    /// Requires immediate dispatch.
    Emergency,
    /// Routine civic issue.
    NonEmergency,
}

/// A persisted community issue report.
///
/// Owned by the storage layer; the assistant core only reads these.
/// `report_id` is the user-facing identifier and is matched
/// case-insensitively (and hyphen-insensitively by the resolver).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    /// Storage primary key.
    pub id: String,
    /// User-facing unique identifier (UUID-like or numeric).
    pub report_id: String,
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
    /// Latitude, if geotagged. `(0, 0)` means unknown, not the equator.
    pub latitude: Option<f64>,
    /// Longitude, if geotagged.
    pub longitude: Option<f64>,
    /// Current lifecycle status.
    pub status: ReportStatus,
    /// Whether the reporter withheld identity.
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
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
    /// Last update timestamp (ISO 8601).
    pub updated_at: String,
}

/// A retrieval-result view of a report.
///
/// `score` is present only for semantic-search hits; fallback results carry
/// no similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
    /// Report identifier.
    pub id: String,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Free-text location description.
    pub location: Option<String>,
    /// Latitude, if geotagged.
    pub latitude: Option<f64>,
    /// Longitude, if geotagged.
    pub longitude: Option<f64>,
    /// Cosine similarity score (semantic results only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl From<&ReportRecord> for IssueRecord {
    fn from(report: &ReportRecord) -> Self {
        Self {
            id: report.report_id.clone(),
            title: report.title.clone(),
            description: report.description.clone(),
            location: report.location.clone(),
            latitude: report.latitude,
            longitude: report.longitude,
            score: None,
        }
    }
}

/// Which retrieval stage produced a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Provenance {
    /// Embedding nearest-neighbor hits from the vector index.
    Semantic,
    /// Deterministic geographic/keyword scan.
    Fallback,
}

/// An ordered, capped sequence of retrieval results with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalResult {
    /// Matching issues, best first.
    pub issues: Vec<IssueRecord>,
    /// Which stage produced the set.
    pub provenance: Provenance,
}

/// Classified upstream/processing failure kinds.
///
/// Collaborator errors are converted to one of these at the point of call;
/// raw transport errors never cross the assistant boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input (out-of-range coordinates, empty identifier).
    Validation,
    /// Report or location absent.
    NotFound,
    /// Collaborator call exceeded its deadline.
    UpstreamTimeout,
    /// Connection refused or non-2xx from a collaborator.
    UpstreamUnavailable,
    /// Quota exhausted or credentials rejected.
    UpstreamQuotaOrAuth,
    /// Unexpected internal failure.
    Internal,
}

impl ErrorKind {
    /// The fixed user-facing message for this error class.
    ///
    /// Collaborator-internal error text is never surfaced verbatim.
    #[must_use]
    pub const fn friendly_message(self) -> &'static str {
        match self {
            Self::Validation => "That request looks malformed. Please check the values and try again.",
            Self::NotFound => "I couldn't find what you asked for.",
            Self::UpstreamTimeout => {
                "The service is taking too long to respond. Please try again."
            }
            Self::UpstreamUnavailable => {
                "I'm unable to reach that service right now. Please try again later."
            }
            Self::UpstreamQuotaOrAuth => {
                "The service quota has been exceeded or credentials are invalid. Please check the configuration."
            }
            Self::Internal => {
                "An error occurred while processing your request. Please try again later."
            }
        }
    }
}

/// The uniform result contract every assistant branch produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// Whether the branch succeeded.
    pub success: bool,
    /// Branch payload (shape varies by intent).
    pub data: serde_json::Value,
    /// Human-readable summary.
    pub message: String,
    /// Envelope intent tag (see [`Intent::envelope_tag`]).
    pub intent: String,
    /// Machine-readable error code for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Actionable follow-ups for the user on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl ResponseEnvelope {
    /// Builds a success envelope.
    #[must_use]
    pub fn success(intent: Intent, data: serde_json::Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            intent: intent.envelope_tag().to_string(),
            error: None,
            suggestions: None,
        }
    }

    /// Builds a failure envelope with a machine-readable error code.
    #[must_use]
    pub fn failure(intent: Intent, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: serde_json::Value::Null,
            message: message.into(),
            intent: intent.envelope_tag().to_string(),
            error: Some(error.into()),
            suggestions: None,
        }
    }

    /// Attaches user-facing suggestions (typically on failure).
    #[must_use]
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = Some(suggestions);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_validate_ranges() {
        assert!(Coordinates::new(29.3938, 79.4538).is_ok());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
        assert!(Coordinates::new(90.1, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(200.0, 79.0).is_err());
    }

    #[test]
    fn coordinates_deserialization_rejects_out_of_range() {
        let ok: Result<Coordinates, _> = serde_json::from_str(r#"{"lat":29.0,"lon":79.0}"#);
        assert!(ok.is_ok());
        let bad: Result<Coordinates, _> = serde_json::from_str(r#"{"lat":200.0,"lon":79.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn report_status_parses_case_insensitively() {
        assert_eq!(
            "pending".parse::<ReportStatus>().unwrap(),
            ReportStatus::Pending
        );
        assert_eq!(
            "IN_PROGRESS".parse::<ReportStatus>().unwrap(),
            ReportStatus::InProgress
        );
        assert!("UNKNOWN_STATE".parse::<ReportStatus>().is_err());
    }

    #[test]
    fn envelope_tags_group_intents() {
        assert_eq!(Intent::TrackReport.envelope_tag(), "reports");
        assert_eq!(Intent::Reports.envelope_tag(), "reports");
        assert_eq!(Intent::IndiaNews.envelope_tag(), "news");
        assert_eq!(Intent::Confirmation.envelope_tag(), "news");
        assert_eq!(Intent::LocationQuery.envelope_tag(), "general");
    }

    #[test]
    fn envelope_omits_empty_optionals() {
        let env = ResponseEnvelope::success(Intent::Weather, serde_json::json!({}), "ok");
        let json = serde_json::to_string(&env).unwrap();
        assert!(!json.contains("suggestions"));
        assert!(!json.contains("\"error\""));
    }
}
