#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Great-circle distance helpers used by enrichment and retrieval.
//!
//! All distance computations in the system go through [`haversine_km`] so
//! the 30 km proximity filter and the fallback distance sort agree on the
//! same formula. Records with `(0, 0)` coordinates are treated as having an
//! unknown position, never as a real point off the West African coast.

use civic_lens_models::Coordinates;

/// Mean Earth radius in kilometers, per the haversine convention.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers (haversine).
#[must_use]
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_lon = (b.lon() - a.lon()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat().to_radians().cos() * b.lat().to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Returns the position of a record, or `None` when it is missing or the
/// `(0, 0)` "unknown" sentinel.
#[must_use]
pub fn known_position(latitude: Option<f64>, longitude: Option<f64>) -> Option<Coordinates> {
    let (lat, lon) = (latitude?, longitude?);
    if lat == 0.0 && lon == 0.0 {
        return None;
    }
    Coordinates::new(lat, lon).ok()
}

/// Returns whether a record lies within `radius_km` of `origin`.
///
/// Records with unknown positions are never "within" any radius.
#[must_use]
pub fn within_radius_km(
    origin: Coordinates,
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius_km: f64,
) -> bool {
    known_position(latitude, longitude)
        .is_some_and(|pos| haversine_km(origin, pos) <= radius_km)
}

/// Sort key for distance-ascending ordering from `origin`.
///
/// Unknown positions sort last (`f64::INFINITY`).
#[must_use]
pub fn distance_sort_key(origin: Coordinates, latitude: Option<f64>, longitude: Option<f64>) -> f64 {
    known_position(latitude, longitude)
        .map_or(f64::INFINITY, |pos| haversine_km(origin, pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> Coordinates {
        Coordinates::new(lat, lon).unwrap()
    }

    #[test]
    fn distance_to_self_is_zero() {
        let bhimtal = point(29.3938, 79.4538);
        assert!(haversine_km(bhimtal, bhimtal).abs() < 1e-9);
    }

    #[test]
    fn distance_is_symmetric() {
        let bhimtal = point(29.3938, 79.4538);
        let nainital = point(29.3803, 79.4636);
        let there = haversine_km(bhimtal, nainital);
        let back = haversine_km(nainital, bhimtal);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn real_world_ordering_is_consistent() {
        // Bhimtal -> Nainital (~2 km) < Bhimtal -> Haldwani (~20 km)
        // < Bhimtal -> Delhi (~230 km).
        let bhimtal = point(29.3938, 79.4538);
        let nainital = point(29.3803, 79.4636);
        let haldwani = point(29.2183, 79.5130);
        let delhi = point(28.6139, 77.2090);

        let d_nainital = haversine_km(bhimtal, nainital);
        let d_haldwani = haversine_km(bhimtal, haldwani);
        let d_delhi = haversine_km(bhimtal, delhi);

        assert!(d_nainital < d_haldwani);
        assert!(d_haldwani < d_delhi);
        assert!((200.0..300.0).contains(&d_delhi));
    }

    #[test]
    fn zero_zero_is_unknown_not_the_equator() {
        assert!(known_position(Some(0.0), Some(0.0)).is_none());
        assert!(known_position(Some(29.0), Some(79.0)).is_some());
        assert!(known_position(None, Some(79.0)).is_none());

        let origin = point(29.3938, 79.4538);
        assert!(!within_radius_km(origin, Some(0.0), Some(0.0), 30.0));
        assert_eq!(
            distance_sort_key(origin, Some(0.0), Some(0.0)),
            f64::INFINITY
        );
    }

    #[test]
    fn within_radius_respects_cutoff() {
        let bhimtal = point(29.3938, 79.4538);
        // Nainital is well inside 30 km, Delhi well outside.
        assert!(within_radius_km(bhimtal, Some(29.3803), Some(79.4636), 30.0));
        assert!(!within_radius_km(bhimtal, Some(28.6139), Some(77.2090), 30.0));
    }
}
