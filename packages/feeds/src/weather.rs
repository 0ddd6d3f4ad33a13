//! Current weather via weatherapi.com.

use civic_lens_models::Coordinates;
use serde::{Deserialize, Serialize};

use crate::{FeedError, REQUEST_TIMEOUT};

const API_BASE: &str = "https://api.weatherapi.com/v1";

/// Normalized current-conditions summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherInfo {
    /// Air temperature, Celsius.
    pub temperature: f64,
    /// Apparent temperature, Celsius.
    pub feels_like: f64,
    /// Relative humidity, percent.
    pub humidity: i64,
    /// Condition text ("Partly cloudy", ...).
    pub description: String,
    /// Resolved place name.
    pub city: String,
    /// Resolved country.
    pub country: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    current: ApiCurrent,
    location: ApiLocation,
}

#[derive(Deserialize)]
struct ApiCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: i64,
    condition: ApiCondition,
}

#[derive(Deserialize)]
struct ApiCondition {
    text: String,
}

#[derive(Deserialize)]
struct ApiLocation {
    name: String,
    country: String,
}

/// weatherapi.com client.
pub struct WeatherClient {
    api_key: String,
    client: reqwest::Client,
}

impl WeatherClient {
    /// Creates a client from the `WEATHER_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::MissingApiKey`] when the key is not set.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be constructed.
    pub fn from_env() -> Result<Self, FeedError> {
        let api_key = std::env::var("WEATHER_API_KEY").map_err(|_| FeedError::MissingApiKey {
            name: "WEATHER_API_KEY",
        })?;
        Ok(Self::new(api_key))
    }

    /// Creates a client with an explicit API key.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be constructed.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build weather HTTP client");
        Self { api_key, client }
    }

    /// Fetches current conditions at the given coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] if the request fails, the upstream returns a
    /// non-200 status, or the response cannot be parsed.
    pub async fn current(&self, coords: Coordinates) -> Result<WeatherInfo, FeedError> {
        let resp = self
            .client
            .get(format!("{API_BASE}/current.json"))
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", &format!("{},{}", coords.lat(), coords.lon())),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(FeedError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_current(&body)
    }
}

/// Parses a weatherapi.com `current.json` body.
///
/// # Errors
///
/// Returns [`FeedError::Parse`] if the body lacks the expected fields.
pub fn parse_current(body: &serde_json::Value) -> Result<WeatherInfo, FeedError> {
    let response: ApiResponse =
        serde_json::from_value(body.clone()).map_err(|e| FeedError::Parse {
            message: format!("Unexpected weather response: {e}"),
        })?;

    Ok(WeatherInfo {
        temperature: response.current.temp_c,
        feels_like: response.current.feelslike_c,
        humidity: response.current.humidity,
        description: response.current.condition.text,
        city: response.location.name,
        country: response.location.country,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_conditions() {
        let body = serde_json::json!({
            "location": { "name": "Bhimtal", "country": "India" },
            "current": {
                "temp_c": 18.3,
                "feelslike_c": 17.9,
                "humidity": 62,
                "condition": { "text": "Partly cloudy" }
            }
        });
        let info = parse_current(&body).unwrap();
        assert!((info.temperature - 18.3).abs() < f64::EPSILON);
        assert_eq!(info.humidity, 62);
        assert_eq!(info.description, "Partly cloudy");
        assert_eq!(info.city, "Bhimtal");
    }

    #[test]
    fn missing_fields_are_a_parse_error() {
        let body = serde_json::json!({ "location": { "name": "X", "country": "Y" } });
        assert!(matches!(
            parse_current(&body),
            Err(FeedError::Parse { .. })
        ));
    }
}
