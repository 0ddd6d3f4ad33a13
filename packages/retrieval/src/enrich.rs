//! Query enrichment from geographic context and the report corpus.
//!
//! A raw query like "issues near me" carries no searchable terms. This
//! module widens it with locality names from reverse geocoding and with
//! tokens harvested from reports filed near the caller, so the semantic
//! stage has something real to match against. Pure given its inputs; the
//! caller resolves geocoding and loads reports.

use civic_lens_geo::within_radius_km;
use civic_lens_geocoder::ReverseGeocode;
use civic_lens_models::{Coordinates, ReportRecord};

use crate::config::{RetrievalConfig, word_tokens};

/// Builds the enriched query string for retrieval.
///
/// Locality names come from the reverse-geocode result (plus any
/// configured override present in the display address). Area and content
/// tokens come from reports within the configured radius of `origin`.
/// Harmless with zero nearby reports — the query passes through with only
/// locality context appended.
#[must_use]
pub fn enrich(
    query: &str,
    origin: Option<Coordinates>,
    reverse: Option<&ReverseGeocode>,
    reports: &[ReportRecord],
    config: &RetrievalConfig,
) -> String {
    let mut enriched = query.trim().to_string();

    if let Some(reverse) = reverse {
        let localities = locality_terms(reverse, config);
        if !localities.is_empty() {
            if enriched.is_empty() {
                enriched = format!("in {}", localities.join(" "));
            } else {
                enriched = format!("{enriched} in {}", localities.join(" "));
            }
        }
    }

    let Some(origin) = origin else {
        return enriched;
    };

    let mut area_tokens: Vec<String> = Vec::new();
    let mut content_tokens: Vec<String> = Vec::new();

    for report in reports {
        if !within_radius_km(origin, report.latitude, report.longitude, config.radius_km) {
            continue;
        }

        if let Some(location) = &report.location {
            for token in word_tokens(location, 4) {
                if !area_tokens.contains(&token) {
                    area_tokens.push(token);
                }
            }
        }

        let text = format!("{} {}", report.title, report.description);
        content_tokens.extend(word_tokens(&text, 4));
    }

    let key_terms: Vec<&String> = area_tokens
        .iter()
        .filter(|t| !config.area_token_stop_list.contains(t))
        .take(config.max_area_tokens)
        .collect();

    for term in key_terms {
        enriched.push(' ');
        enriched.push_str(term);
    }

    if config.is_generic_query(query) {
        let existing = word_tokens(&enriched, 1);
        let mut boosts: Vec<String> = Vec::new();
        for token in content_tokens {
            if boosts.len() >= config.max_domain_tokens {
                break;
            }
            if config.domain_vocabulary.contains(&token)
                && !boosts.contains(&token)
                && !existing.contains(&token)
            {
                boosts.push(token);
            }
        }
        for boost in boosts {
            enriched.push(' ');
            enriched.push_str(&boost);
        }
    }

    enriched.trim().to_string()
}

/// Locality names in preference order, with configured overrides promoted
/// when present anywhere in the display address.
fn locality_terms(reverse: &ReverseGeocode, config: &RetrievalConfig) -> Vec<String> {
    let mut names = reverse.locality_candidates.clone();

    if let Some(display) = &reverse.info.display_name {
        let display_lower = display.to_lowercase();
        for name in &config.locality_overrides {
            if display_lower.contains(&name.to_lowercase()) {
                names.push(name.clone());
            }
        }
    }

    let mut deduped: Vec<String> = Vec::new();
    for name in names {
        if !deduped.contains(&name) {
            deduped.push(name);
        }
    }
    deduped
}

#[cfg(test)]
mod tests {
    use civic_lens_models::{LocationInfo, ReportStatus, ReportType};

    use super::*;

    fn report(title: &str, description: &str, location: &str, lat: f64, lon: f64) -> ReportRecord {
        ReportRecord {
            id: "1".to_string(),
            report_id: "r1".to_string(),
            report_type: ReportType::NonEmergency,
            title: title.to_string(),
            description: description.to_string(),
            specific_type: String::new(),
            location: Some(location.to_string()),
            latitude: Some(lat),
            longitude: Some(lon),
            status: ReportStatus::Pending,
            is_anonymous: true,
            reporter_name: None,
            reporter_email: None,
            reporter_phone: None,
            reporter_user_id: None,
            department_id: None,
            department_name: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn bhimtal() -> Coordinates {
        Coordinates::new(29.3938, 79.4538).unwrap()
    }

    fn reverse_bhimtal() -> ReverseGeocode {
        ReverseGeocode {
            info: LocationInfo {
                city: Some("Bhimtal".to_string()),
                state: Some("Uttarakhand".to_string()),
                country: Some("India".to_string()),
                postcode: None,
                display_name: Some("Bhimtal, Nainital, Uttarakhand, India".to_string()),
            },
            locality_candidates: vec!["Bhimtal".to_string()],
            area_names: vec!["Uttarakhand".to_string(), "Nainital".to_string()],
        }
    }

    #[test]
    fn appends_locality_context() {
        let config = RetrievalConfig::default();
        let enriched = enrich("issues near me", None, Some(&reverse_bhimtal()), &[], &config);
        assert_eq!(enriched, "issues near me in Bhimtal");
    }

    #[test]
    fn override_promoted_from_display_name() {
        let config = RetrievalConfig::default();
        let reverse = ReverseGeocode {
            info: LocationInfo {
                display_name: Some("Sattal Road, Bhimtal, Uttarakhand".to_string()),
                ..LocationInfo::default()
            },
            locality_candidates: vec!["Sattal".to_string()],
            area_names: Vec::new(),
        };
        let enriched = enrich("garbage", None, Some(&reverse), &[], &config);
        assert_eq!(enriched, "garbage in Sattal Bhimtal");
    }

    #[test]
    fn generic_query_gains_at_most_three_domain_tokens_without_duplicates() {
        let config = RetrievalConfig::default();
        let reports = vec![
            report("Pothole", "pothole damage on road", "Bhimtal", 29.39, 79.45),
            report("Garbage pileup", "garbage and water leakage", "Bhimtal", 29.40, 79.46),
        ];
        let enriched = enrich("issues near me", Some(bhimtal()), None, &reports, &config);

        let boosts: Vec<&str> = enriched
            .split_whitespace()
            .filter(|t| config.domain_vocabulary.contains(&(*t).to_string()))
            .collect();
        assert!(!boosts.is_empty());
        assert!(boosts.len() <= 3);

        let mut seen = Vec::new();
        for token in enriched.split_whitespace() {
            assert!(!seen.contains(&token), "duplicate token {token} in {enriched}");
            seen.push(token);
        }
    }

    #[test]
    fn area_stop_list_is_excluded() {
        let config = RetrievalConfig::default();
        let reports = vec![report(
            "Broken streetlight",
            "dark stretch",
            "India Highway Office Bhimtal",
            29.39,
            79.45,
        )];
        let enriched = enrich("streetlight", Some(bhimtal()), None, &reports, &config);
        assert!(enriched.contains("bhimtal"));
        assert!(!enriched.contains("india"));
        assert!(!enriched.contains("highway"));
        assert!(!enriched.contains("office"));
    }

    #[test]
    fn distant_reports_contribute_nothing() {
        let config = RetrievalConfig::default();
        // Delhi is well beyond 30 km from Bhimtal.
        let reports = vec![report("Pothole", "pothole", "Delhi", 28.6139, 77.2090)];
        let enriched = enrich("issues near me", Some(bhimtal()), None, &reports, &config);
        assert_eq!(enriched, "issues near me");
    }

    #[test]
    fn no_context_passes_query_through() {
        let config = RetrievalConfig::default();
        assert_eq!(enrich("water leakage", None, None, &[], &config), "water leakage");
    }
}
