//! Report identifier extraction and tolerant database resolution.
//!
//! Users paste report IDs in every shape: hyphenated UUIDs, compact hex
//! runs, numeric row IDs, mixed case, with surrounding punctuation. The
//! extractor normalizes what it finds, and the resolver tries cheaper
//! exact-match variants before falling back to a hyphen-insensitive query.

use std::sync::LazyLock;

use civic_lens_database::{DbError, queries};
use civic_lens_models::ReportRecord;
use regex::Regex;
use switchy_database::Database;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[0-9a-fA-F]{8}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{12}",
    )
    .unwrap_or_else(|_| unreachable!())
});

static HEX_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9a-fA-F]{16,}").unwrap_or_else(|_| unreachable!()));

static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+)\b").unwrap_or_else(|_| unreachable!()));

/// Pulls a report identifier out of free text.
///
/// Tried in priority order: a full UUID (hyphens optional) which is
/// normalized to 32 lowercase hex characters, then a compact hex run of at
/// least 16 characters (lowercased), then a bare decimal number taken
/// as-is.
#[must_use]
pub fn extract_report_id(message: &str) -> Option<String> {
    if let Some(m) = UUID_RE.find(message) {
        return Some(m.as_str().replace('-', "").to_lowercase());
    }
    if let Some(m) = HEX_RUN_RE.find(message) {
        return Some(m.as_str().to_lowercase());
    }
    NUMERIC_RE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Lookup candidates derived from a raw identifier, cheapest first:
/// the trimmed input verbatim, the input restricted to alphanumerics and
/// hyphens, and the hyphen-free form. Duplicates are dropped while
/// preserving order.
#[must_use]
pub fn id_variants(raw: &str) -> Vec<String> {
    let trimmed = raw.trim().to_string();
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    let no_dash = cleaned.replace('-', "");

    let mut variants = Vec::with_capacity(3);
    for candidate in [trimmed, cleaned, no_dash] {
        if !candidate.is_empty() && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

/// Resolves a raw identifier to a stored report.
///
/// Each variant is tried as an exact (case-insensitive) `report_id` match;
/// if none hit, the hyphen-free form is matched against stored IDs with
/// their hyphens stripped, so a compact ID still finds a hyphenated row
/// and vice versa.
///
/// # Errors
///
/// Returns [`DbError`] if a database query fails.
pub async fn resolve(db: &dyn Database, raw: &str) -> Result<Option<ReportRecord>, DbError> {
    let variants = id_variants(raw);

    for variant in &variants {
        if let Some(report) = queries::fetch_report(db, variant).await? {
            return Ok(Some(report));
        }
    }

    if let Some(no_dash) = variants.iter().find(|v| !v.contains('-')) {
        if let Some(report) = queries::fetch_report_hyphen_insensitive(db, no_dash).await? {
            return Ok(Some(report));
        }
    }

    Ok(None)
}

/// Follow-ups offered when no stored report matches the identifier.
#[must_use]
pub fn not_found_suggestions() -> Vec<String> {
    vec![
        "Make sure you entered the correct report ID".to_string(),
        "Check for any typos in the report ID".to_string(),
        "If you just submitted the report, please wait a moment and try again".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_is_normalized_to_compact_lowercase() {
        assert_eq!(
            extract_report_id("Report #4D14FFA4-138d-4bd0-8F1A-5c9b2c7d8e9f").as_deref(),
            Some("4d14ffa4138d4bd08f1a5c9b2c7d8e9f")
        );
    }

    #[test]
    fn compact_hex_run_is_lowercased() {
        assert_eq!(
            extract_report_id("track 4D14FFA4138D4BD0 please").as_deref(),
            Some("4d14ffa4138d4bd0")
        );
    }

    #[test]
    fn numeric_fallback_keeps_digits_verbatim() {
        assert_eq!(extract_report_id("report 42 status").as_deref(), Some("42"));
    }

    #[test]
    fn no_identifier_found() {
        assert!(extract_report_id("track my report").is_none());
    }

    #[test]
    fn variants_dedupe_and_preserve_order() {
        assert_eq!(
            id_variants(" 4d14-ffa4! "),
            vec!["4d14-ffa4!", "4d14-ffa4", "4d14ffa4"]
        );
        assert_eq!(id_variants("4d14ffa4"), vec!["4d14ffa4"]);
    }

    #[tokio::test]
    async fn resolve_finds_hyphenated_row_from_compact_id() {
        let db = civic_lens_database::open_in_memory().await.unwrap();
        let new = queries::NewReport {
            report_id: Some("4d14ffa4-138d-4bd0-8f1a-5c9b2c7d8e9f".to_string()),
            report_type: civic_lens_models::ReportType::NonEmergency,
            title: "Streetlight out".to_string(),
            description: "Lamp post dark for a week".to_string(),
            specific_type: "STREETLIGHT".to_string(),
            location: None,
            latitude: None,
            longitude: None,
            is_anonymous: true,
            reporter_name: None,
            reporter_email: None,
            reporter_phone: None,
            reporter_user_id: None,
            department_id: None,
            department_name: None,
        };
        queries::create_report(db.as_ref(), &new).await.unwrap();

        let found = resolve(db.as_ref(), "4d14ffa4138d4bd08f1a5c9b2c7d8e9f")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.title, "Streetlight out");

        assert!(resolve(db.as_ref(), "deadbeefdeadbeef").await.unwrap().is_none());
    }
}
