#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location resolution via Nominatim / OpenStreetMap.
//!
//! Thin delegations to the public Nominatim instance with a bounded 10 s
//! timeout. Every transport error or non-200 status is converted into a
//! tagged [`GeocodeError`] — raw `reqwest` failures never cross this
//! boundary. Nominatim has strict rate limits (1 request per second for the
//! public instance); the caller is responsible for pacing.
//!
//! See <https://nominatim.org/release-docs/develop/api/Reverse/>

pub mod nominatim;

use std::time::Duration;

use civic_lens_models::{Coordinates, ErrorKind, LocationInfo};
use thiserror::Error;

/// Default Nominatim endpoint.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Bounded timeout for geocoding requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The full result of one reverse-geocode call.
///
/// Query enrichment consumes the locality candidates and area names; the
/// response composer consumes the [`LocationInfo`]. Both come from the same
/// upstream response so a single call serves both.
#[derive(Debug, Clone, Default)]
pub struct ReverseGeocode {
    /// Normalized address fields.
    pub info: LocationInfo,
    /// Locality-level names in preference order
    /// (city, town, village, suburb), deduplicated.
    pub locality_candidates: Vec<String>,
    /// Broader area names (state, district, region) for query widening.
    pub area_names: Vec<String>,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream returned a non-200 status.
    #[error("Geocoding API error: {status}")]
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
}

impl GeocodeError {
    /// Classifies this error into the shared failure taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(e) if e.is_timeout() => ErrorKind::UpstreamTimeout,
            Self::Http(_) | Self::Status { .. } => ErrorKind::UpstreamUnavailable,
            Self::Parse { .. } => ErrorKind::Internal,
        }
    }
}

/// Nominatim-backed location resolver.
pub struct Geocoder {
    client: reqwest::Client,
    base_url: String,
}

impl Geocoder {
    /// Creates a resolver against the public Nominatim instance.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be constructed (TLS
    /// backend initialization failure).
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    /// Creates a resolver against a specific Nominatim endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be constructed.
    #[must_use]
    pub fn with_base_url(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("CivicLens/1.0")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build geocoder HTTP client");
        Self { client, base_url }
    }

    /// Resolves coordinates to address fields.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request fails, the upstream returns
    /// a non-200 status, or the response cannot be parsed.
    pub async fn reverse_geocode(
        &self,
        coords: Coordinates,
    ) -> Result<ReverseGeocode, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);
        let lat = coords.lat().to_string();
        let lon = coords.lon().to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(GeocodeError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        nominatim::parse_reverse_response(&body)
    }

    /// Resolves a place name to coordinates and address fields.
    ///
    /// Returns `Ok(None)` when Nominatim has no match for the name.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request fails, the upstream returns
    /// a non-200 status, or the response cannot be parsed.
    pub async fn geocode(
        &self,
        name: &str,
    ) -> Result<Option<(Coordinates, LocationInfo)>, GeocodeError> {
        let url = format!("{}/search", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[("q", name), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(GeocodeError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        nominatim::parse_search_response(&body)
    }

    /// Broader area names (state, district, region) around the given
    /// coordinates, used for query widening.
    ///
    /// Failures are downgraded to an empty list — widening is best-effort.
    pub async fn nearby_area_names(&self, coords: Coordinates) -> Vec<String> {
        match self.reverse_geocode(coords).await {
            Ok(reverse) => reverse.area_names,
            Err(e) => {
                log::warn!("nearby_area_names lookup failed: {e}");
                Vec::new()
            }
        }
    }
}

impl Default for Geocoder {
    fn default() -> Self {
        Self::new()
    }
}
