//! Pure parsers for Nominatim JSON payloads.
//!
//! Nominatim's address object is loosely shaped — which locality key is
//! present depends on the place (a city has `city`, a hamlet has `village`).
//! These parsers normalize that into typed structs with defaults for absent
//! fields, so downstream code never touches untyped maps.

use civic_lens_models::{Coordinates, LocationInfo};
use serde::Deserialize;

use crate::{GeocodeError, ReverseGeocode};

/// The `address` object of a Nominatim response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub suburb: Option<String>,
    pub state: Option<String>,
    pub state_district: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
}

/// One place entry from a reverse or search response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NominatimPlace {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub display_name: Option<String>,
    pub address: NominatimAddress,
}

impl NominatimAddress {
    /// The best single locality name: city, falling back to town, then
    /// village.
    fn primary_locality(&self) -> Option<String> {
        self.city
            .clone()
            .or_else(|| self.town.clone())
            .or_else(|| self.village.clone())
    }

    /// Locality candidates in preference order, deduplicated, blanks
    /// dropped.
    fn locality_candidates(&self) -> Vec<String> {
        let mut names = Vec::new();
        for candidate in [&self.city, &self.town, &self.village, &self.suburb] {
            if let Some(name) = candidate {
                let trimmed = name.trim();
                if !trimmed.is_empty() && !names.iter().any(|n| n == trimmed) {
                    names.push(trimmed.to_string());
                }
            }
        }
        names
    }

    /// Broader area names (state, district, region), deduplicated.
    fn area_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for candidate in [&self.state, &self.state_district, &self.region] {
            if let Some(name) = candidate {
                let trimmed = name.trim();
                if !trimmed.is_empty() && !names.iter().any(|n| n == trimmed) {
                    names.push(trimmed.to_string());
                }
            }
        }
        names
    }
}

/// Parses a Nominatim `/reverse` response.
///
/// # Errors
///
/// Returns [`GeocodeError::Parse`] if the body is not a Nominatim place
/// object.
pub fn parse_reverse_response(body: &serde_json::Value) -> Result<ReverseGeocode, GeocodeError> {
    let place: NominatimPlace =
        serde_json::from_value(body.clone()).map_err(|e| GeocodeError::Parse {
            message: format!("Unexpected reverse geocode response: {e}"),
        })?;

    Ok(ReverseGeocode {
        info: LocationInfo {
            city: place.address.primary_locality(),
            state: place.address.state.clone(),
            country: place.address.country.clone(),
            postcode: place.address.postcode.clone(),
            display_name: place.display_name,
        },
        locality_candidates: place.address.locality_candidates(),
        area_names: place.address.area_names(),
    })
}

/// Parses a Nominatim `/search` response (list of places, best first).
///
/// Returns `Ok(None)` on an empty result list.
///
/// # Errors
///
/// Returns [`GeocodeError::Parse`] if the body is not an array of places or
/// the best match is missing coordinates.
pub fn parse_search_response(
    body: &serde_json::Value,
) -> Result<Option<(Coordinates, LocationInfo)>, GeocodeError> {
    let places: Vec<NominatimPlace> =
        serde_json::from_value(body.clone()).map_err(|e| GeocodeError::Parse {
            message: format!("Nominatim search response is not a place list: {e}"),
        })?;

    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let lat = place
        .lat
        .as_deref()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = place
        .lon
        .as_deref()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    let coords = Coordinates::new(lat, lon).map_err(|e| GeocodeError::Parse {
        message: format!("Out-of-range coordinates in Nominatim response: {e}"),
    })?;

    let info = LocationInfo {
        city: place.address.primary_locality(),
        state: place.address.state.clone(),
        country: place.address.country.clone(),
        postcode: place.address.postcode.clone(),
        display_name: place.display_name,
    };

    Ok(Some((coords, info)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reverse_with_city() {
        let body = serde_json::json!({
            "display_name": "Bhimtal, Nainital, Uttarakhand, India",
            "address": {
                "town": "Bhimtal",
                "state": "Uttarakhand",
                "state_district": "Nainital",
                "country": "India",
                "postcode": "263136"
            }
        });
        let reverse = parse_reverse_response(&body).unwrap();
        assert_eq!(reverse.info.city.as_deref(), Some("Bhimtal"));
        assert_eq!(reverse.info.state.as_deref(), Some("Uttarakhand"));
        assert_eq!(reverse.locality_candidates, vec!["Bhimtal"]);
        assert_eq!(reverse.area_names, vec!["Uttarakhand", "Nainital"]);
    }

    #[test]
    fn locality_falls_back_through_town_and_village() {
        let body = serde_json::json!({
            "address": { "village": "Jeolikot", "suburb": "Jeolikot" }
        });
        let reverse = parse_reverse_response(&body).unwrap();
        assert_eq!(reverse.info.city.as_deref(), Some("Jeolikot"));
        // Suburb duplicate of the village is not repeated.
        assert_eq!(reverse.locality_candidates, vec!["Jeolikot"]);
    }

    #[test]
    fn parses_search_result() {
        let body = serde_json::json!([{
            "lat": "29.3938",
            "lon": "79.4538",
            "display_name": "Bhimtal, Uttarakhand, India",
            "address": { "city": "Bhimtal", "state": "Uttarakhand" }
        }]);
        let (coords, info) = parse_search_response(&body).unwrap().unwrap();
        assert!((coords.lat() - 29.3938).abs() < 1e-6);
        assert!((coords.lon() - 79.4538).abs() < 1e-6);
        assert_eq!(info.city.as_deref(), Some("Bhimtal"));
    }

    #[test]
    fn parses_search_empty() {
        let body = serde_json::json!([]);
        assert!(parse_search_response(&body).unwrap().is_none());
    }

    #[test]
    fn search_without_coordinates_is_a_parse_error() {
        let body = serde_json::json!([{ "display_name": "Nowhere" }]);
        assert!(matches!(
            parse_search_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }
}
