//! The hybrid retrieval pipeline.
//!
//! Linear fallback chain: semantic vector search first, then a
//! deterministic geographic + keyword scan over the stored reports, then
//! an exclusion filter over whichever stage produced results. A failing
//! semantic stage is treated as zero results, never as a call failure.

use civic_lens_geo::distance_sort_key;
use civic_lens_geocoder::ReverseGeocode;
use civic_lens_models::{Coordinates, IssueRecord, Provenance, ReportRecord, RetrievalResult};

use crate::config::{RetrievalConfig, word_tokens};
use crate::embedder::Embedder;
use crate::enrich::enrich;
use crate::vector::VectorIndex;

/// Orchestrates the semantic stage, the fallback scan, and the exclusion
/// filter. Holds no state of its own; collaborators are borrowed.
pub struct RetrievalEngine<'a> {
    embedder: &'a Embedder,
    index: &'a VectorIndex,
    config: &'a RetrievalConfig,
}

impl<'a> RetrievalEngine<'a> {
    /// Creates an engine over the given collaborators.
    #[must_use]
    pub const fn new(
        embedder: &'a Embedder,
        index: &'a VectorIndex,
        config: &'a RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            config,
        }
    }

    /// Searches for issues relevant to `query`, optionally anchored at
    /// `origin`.
    ///
    /// `reverse` is the reverse-geocode result for `origin` (when the
    /// caller has one) and `reports` is the stored corpus — both are inputs
    /// rather than lookups so this stays free of storage and geocoder
    /// dependencies.
    pub async fn search(
        &self,
        query: &str,
        origin: Option<Coordinates>,
        reverse: Option<&ReverseGeocode>,
        reports: &[ReportRecord],
    ) -> RetrievalResult {
        let enriched = enrich(query, origin, reverse, reports, self.config);
        log::debug!("retrieval query: '{query}' enriched to '{enriched}'");

        let semantic = self.semantic_stage(&enriched).await;

        let (issues, provenance) = if semantic.is_empty() {
            let area_terms = reverse.map_or_else(Vec::new, area_terms);
            let fallback = fallback_scan(query, origin, &area_terms, reports, self.config);
            log::debug!("fallback scan produced {} issues", fallback.len());
            (fallback, Provenance::Fallback)
        } else {
            log::debug!("semantic stage produced {} issues", semantic.len());
            (semantic, Provenance::Semantic)
        };

        let issues = apply_exclusions(issues, self.config);

        RetrievalResult { issues, provenance }
    }

    /// Embeds the enriched query and asks the index for nearest neighbors.
    /// Any error here degrades to zero results.
    async fn semantic_stage(&self, enriched: &str) -> Vec<IssueRecord> {
        let vector = match self.embedder.embed(enriched).await {
            Ok(vector) => vector,
            Err(e) => {
                log::warn!("embedding failed, skipping semantic stage: {e}");
                return Vec::new();
            }
        };

        match self.index.query(&vector, self.config.limit).await {
            Ok(hits) => hits,
            Err(e) => {
                log::warn!("vector query failed, skipping semantic stage: {e}");
                Vec::new()
            }
        }
    }
}

/// Lower-cased area terms for the fallback's location filter.
fn area_terms(reverse: &ReverseGeocode) -> Vec<String> {
    let mut terms = Vec::new();
    for name in [&reverse.info.city, &reverse.info.state] {
        if let Some(name) = name {
            let lowered = name.trim().to_lowercase();
            if !lowered.is_empty() && !terms.contains(&lowered) {
                terms.push(lowered);
            }
        }
    }
    terms
}

/// Deterministic geographic + keyword scan over the stored reports.
///
/// A report survives when (a) no area terms were derived or its location
/// text contains one of them, and (b) the query is generic or its title or
/// description contains at least one query token. Survivors are sorted by
/// ascending great-circle distance from `origin` when present — as a sort
/// key only, with no radius cutoff on the candidate set — and capped at
/// the configured limit.
#[must_use]
pub fn fallback_scan(
    query: &str,
    origin: Option<Coordinates>,
    area_terms: &[String],
    reports: &[ReportRecord],
    config: &RetrievalConfig,
) -> Vec<IssueRecord> {
    let generic = config.is_generic_query(query);
    let query_tokens = word_tokens(query, 3);

    let mut survivors: Vec<&ReportRecord> = reports
        .iter()
        .filter(|report| {
            let location = report
                .location
                .as_deref()
                .unwrap_or_default()
                .to_lowercase();
            if !area_terms.is_empty() && !area_terms.iter().any(|t| location.contains(t)) {
                return false;
            }

            if !generic && !query_tokens.is_empty() {
                let title = report.title.to_lowercase();
                let description = report.description.to_lowercase();
                if !query_tokens
                    .iter()
                    .any(|t| title.contains(t) || description.contains(t))
                {
                    return false;
                }
            }

            true
        })
        .collect();

    if let Some(origin) = origin {
        survivors.sort_by(|a, b| {
            let da = distance_sort_key(origin, a.latitude, a.longitude);
            let db = distance_sort_key(origin, b.latitude, b.longitude);
            da.total_cmp(&db)
        });
    }

    survivors
        .into_iter()
        .take(config.limit)
        .map(IssueRecord::from)
        .collect()
}

/// Drops issues whose location text mentions an excluded place.
#[must_use]
pub fn apply_exclusions(issues: Vec<IssueRecord>, config: &RetrievalConfig) -> Vec<IssueRecord> {
    let before = issues.len();
    let kept: Vec<IssueRecord> = issues
        .into_iter()
        .filter(|issue| {
            let location = issue
                .location
                .as_deref()
                .unwrap_or_default()
                .to_lowercase();
            !config
                .excluded_places
                .iter()
                .any(|place| location.contains(place))
        })
        .collect();

    if kept.len() != before {
        log::debug!("exclusion filter dropped {} issues", before - kept.len());
    }

    kept
}

#[cfg(test)]
mod tests {
    use civic_lens_models::{ReportStatus, ReportType};

    use super::*;

    fn report(
        report_id: &str,
        title: &str,
        description: &str,
        location: &str,
        coords: Option<(f64, f64)>,
    ) -> ReportRecord {
        ReportRecord {
            id: report_id.to_string(),
            report_id: report_id.to_string(),
            report_type: ReportType::NonEmergency,
            title: title.to_string(),
            description: description.to_string(),
            specific_type: String::new(),
            location: Some(location.to_string()),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
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

    #[test]
    fn generic_query_keeps_everything_in_area() {
        let config = RetrievalConfig::default();
        let reports = vec![
            report("a", "Pothole", "deep pothole", "Bhimtal", Some((29.39, 79.45))),
            report("b", "Leakage", "water leakage", "Bhimtal", Some((29.40, 79.46))),
        ];
        let results = fallback_scan("issues near me", Some(bhimtal()), &[], &reports, &config);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn non_generic_query_requires_token_match() {
        let config = RetrievalConfig::default();
        let reports = vec![
            report("a", "Pothole", "deep pothole", "Bhimtal", None),
            report("b", "Streetlight out", "dark stretch", "Bhimtal", None),
        ];
        let results = fallback_scan("pothole", None, &[], &reports, &config);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Pothole");
    }

    #[test]
    fn area_terms_filter_by_location_text() {
        let config = RetrievalConfig::default();
        let reports = vec![
            report("a", "Pothole", "pothole", "Bhimtal, Uttarakhand", None),
            report("b", "Pothole", "pothole", "Koramangala, Bengaluru", None),
        ];
        let area = vec!["bhimtal".to_string()];
        let results = fallback_scan("pothole", None, &area, &reports, &config);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "a");
    }

    #[test]
    fn fallback_does_not_reapply_radius_cutoff() {
        // Delhi is ~250 km from Bhimtal: far outside the 30 km enrichment
        // radius, yet still a fallback candidate. Distance orders it last
        // rather than dropping it.
        let config = RetrievalConfig::default();
        let reports = vec![
            report("far", "Pothole", "pothole", "Delhi", Some((28.6139, 77.2090))),
            report("close", "Pothole", "pothole", "Bhimtal", Some((29.3950, 79.4540))),
        ];
        let results = fallback_scan("pothole", Some(bhimtal()), &[], &reports, &config);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "close");
        assert_eq!(results[1].id, "far");
    }

    #[test]
    fn unknown_coordinates_sort_last() {
        let config = RetrievalConfig::default();
        let reports = vec![
            report("unknown", "Pothole", "pothole", "Somewhere", Some((0.0, 0.0))),
            report("known", "Pothole", "pothole", "Bhimtal", Some((29.3950, 79.4540))),
        ];
        let results = fallback_scan("pothole", Some(bhimtal()), &[], &reports, &config);
        assert_eq!(results[0].id, "known");
        assert_eq!(results[1].id, "unknown");
    }

    #[test]
    fn results_are_capped_at_limit() {
        let config = RetrievalConfig::default();
        let reports: Vec<ReportRecord> = (0..25)
            .map(|i| {
                report(
                    &format!("r{i}"),
                    "Pothole",
                    "pothole",
                    "Bhimtal",
                    Some((29.39, 79.45)),
                )
            })
            .collect();
        let results = fallback_scan("pothole", Some(bhimtal()), &[], &reports, &config);
        assert_eq!(results.len(), 10);
    }

    #[tokio::test]
    async fn search_degrades_to_fallback_when_semantic_stage_is_unreachable() {
        // Nothing listens on port 9; both the embedder and the index fail,
        // which must read as zero semantic results, not as a search failure.
        let config = RetrievalConfig::default();
        let embedder = Embedder::new(
            "http://127.0.0.1:9".to_string(),
            "all-minilm".to_string(),
        );
        let index = VectorIndex::new("http://127.0.0.1:9".to_string(), "issues".to_string());
        let engine = RetrievalEngine::new(&embedder, &index, &config);

        let reports = vec![report(
            "a",
            "Pothole",
            "deep pothole",
            "Bhimtal",
            Some((29.3950, 79.4540)),
        )];
        let result = engine.search("pothole", Some(bhimtal()), None, &reports).await;

        assert_eq!(result.provenance, Provenance::Fallback);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].id, "a");
    }

    #[test]
    fn exclusion_filter_drops_denylisted_places() {
        let config = RetrievalConfig::default();
        let issues: Vec<IssueRecord> = vec![
            IssueRecord::from(&report("a", "Pothole", "pothole", "Bhimtal", None)),
            IssueRecord::from(&report("b", "Pothole", "pothole", "Koramangala, Bengaluru", None)),
        ];
        let kept = apply_exclusions(issues, &config);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "a");
    }
}
