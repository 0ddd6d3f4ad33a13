//! Intent classification and pure extractors over the message text.
//!
//! Classification is an ordered rule table evaluated top to bottom — the
//! first matching rule wins, which resolves ambiguous messages
//! deterministically. A message containing both "weather" and a 16-hex
//! token classifies as report tracking because that rule comes first. The
//! ordering is a behavioral contract, not an optimization.

use std::sync::LazyLock;

use civic_lens_models::{Coordinates, Intent};
use regex::Regex;

fn rule(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|_| unreachable!())
}

/// The classification cascade, first match wins.
static RULES: LazyLock<Vec<(Regex, Intent)>> = LazyLock::new(|| {
    vec![
        (
            rule(r"^(?:yes|yeah|yep|yup|sure|ok|okay|alright|fine)$"),
            Intent::Confirmation,
        ),
        (
            rule(
                r"track\s+report\s+[a-f0-9-]+|report\s+[a-f0-9-]+\s+track|[a-f0-9]{8,}(?:-[a-f0-9]{4}){3}-[a-f0-9]{12}|[a-f0-9]{16,}|report\s*#?\s*[a-f0-9-]+",
            ),
            Intent::TrackReport,
        ),
        (
            rule(
                r"\b(?:for\s+)?india\s+news\b|\bnews\s+(?:for\s+)?india\b|\bshow\s+me\s+india\s+news\b|^india$|^for\s+india$",
            ),
            Intent::IndiaNews,
        ),
        (
            rule(
                r"\blocal\s+news\b|\bnews\s+here\b|\bnews\s+near\b|\bshow\s+me\s+local\s+news\b|\bgive\s+me\s+local\s+news\b",
            ),
            Intent::LocalNews,
        ),
        (
            rule(r"\bweather\b|\btemperature\b|\brain\b|\bclimate\b"),
            Intent::Weather,
        ),
        (
            rule(r"\bissues?\s+near\s+me\b|\blocal\s+issues?\b|\bproblems?\s+near\b|\bissues?\s+here\b"),
            Intent::LocalIssues,
        ),
        (
            rule(r"\blocation\b|\barea\b|\bwhere\s+am\s+i\b|\bwhat'?s?\s+my\s+location\b|\bwhat'?s?\s+my\s+area\b"),
            Intent::LocationQuery,
        ),
        (
            rule(r"\breport\b|\bcomplaint\b|\bsubmit\s+(?:a\s+)?report\b|\bfile\s+(?:a\s+)?complaint\b"),
            Intent::Reports,
        ),
    ]
});

static COORDS_RE: LazyLock<Regex> =
    LazyLock::new(|| rule(r"(-?\d+\.?\d*)[,\s]+(-?\d+\.?\d*)"));

static STOP_WORDS_RE: LazyLock<Regex> =
    LazyLock::new(|| rule(r"\b(?:the|a|an|in|at|for|near|my|local|current)\b"));

/// Phrase patterns for extracting a place name, tried in order.
static LOCATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        rule(r"weather\s+(?:in|at|for)\s+([a-z\s]+?)(?:\?|$|,|\s+and)"),
        rule(r"weather\s+(?:like|what'?s|how\s+is)\s+(?:in|at|for)?\s*([a-z\s]+?)(?:\?|$)"),
        rule(r"news\s+(?:in|at|for)\s+([a-z\s]+?)(?:\?|$|,|\s+and)"),
        rule(r"news\s+([a-z\s]+?)(?:\?|$)"),
        rule(r"issues?\s+(?:in|at|for|near)\s+([a-z\s]+?)(?:\?|$|,|\s+and)"),
    ]
});

const USER_LOCATION_PHRASES: &[&str] = &[
    "here",
    "my area",
    "my location",
    "current location",
    "where i am",
];

/// Assigns an intent to one message. Pure, total, no I/O.
#[must_use]
pub fn classify(message: &str) -> Intent {
    let lowered = message.trim().to_lowercase();
    RULES
        .iter()
        .find(|(re, _)| re.is_match(&lowered))
        .map_or(Intent::GeneralChat, |(_, intent)| *intent)
}

/// Pulls a validated coordinate pair out of the message, if present.
///
/// Two adjacent decimal numbers separated by a comma or whitespace; `None`
/// unless both values pass range validation.
#[must_use]
pub fn extract_coordinates(message: &str) -> Option<Coordinates> {
    let caps = COORDS_RE.captures(message)?;
    let lat: f64 = caps.get(1)?.as_str().parse().ok()?;
    let lon: f64 = caps.get(2)?.as_str().parse().ok()?;
    Coordinates::new(lat, lon).ok()
}

/// Whether the message asks about the user's own surroundings ("here",
/// "my area", ...), which takes priority over any named place.
#[must_use]
pub fn wants_user_location(message: &str) -> bool {
    let lowered = message.to_lowercase();
    USER_LOCATION_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

/// Extracts a place name from the message via phrase patterns, stripping
/// stop words. Returns `None` when no pattern matches or the remainder is
/// too short to be a real place name; callers may then fall back to the
/// language model.
#[must_use]
pub fn extract_location_name(message: &str) -> Option<String> {
    let lowered = message.to_lowercase();

    for pattern in LOCATION_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(&lowered) {
            let raw = caps.get(1)?.as_str();
            let stripped = STOP_WORDS_RE.replace_all(raw, "");
            let cleaned = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
            if cleaned.len() > 2 {
                return Some(cleaned);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_tokens_win_first() {
        assert_eq!(classify("yes"), Intent::Confirmation);
        assert_eq!(classify("  OK  "), Intent::Confirmation);
        // Not a bare confirmation.
        assert_ne!(classify("yes please show me the weather"), Intent::Confirmation);
    }

    #[test]
    fn hex_run_outranks_weather_keyword() {
        assert_eq!(
            classify("weather update for report 4d14ffa4138d4bd0"),
            Intent::TrackReport
        );
        assert_eq!(classify("4d14ffa4138d4bd08f1a5c9b2c7d8e9f"), Intent::TrackReport);
        assert_eq!(
            classify("status of 4d14ffa4-138d-4bd0-8f1a-5c9b2c7d8e9f"),
            Intent::TrackReport
        );
    }

    #[test]
    fn track_report_phrasings() {
        assert_eq!(classify("track report abc123def"), Intent::TrackReport);
        assert_eq!(classify("report #4d14ffa4"), Intent::TrackReport);
    }

    #[test]
    fn news_rules_in_order() {
        assert_eq!(classify("india news"), Intent::IndiaNews);
        assert_eq!(classify("news for india"), Intent::IndiaNews);
        assert_eq!(classify("india"), Intent::IndiaNews);
        assert_eq!(classify("local news please"), Intent::LocalNews);
        assert_eq!(classify("any news near here?"), Intent::LocalNews);
    }

    #[test]
    fn weather_issue_location_report_rules() {
        assert_eq!(classify("what's the weather"), Intent::Weather);
        assert_eq!(classify("will it rain today"), Intent::Weather);
        assert_eq!(classify("issues near me"), Intent::LocalIssues);
        assert_eq!(classify("any local issues?"), Intent::LocalIssues);
        assert_eq!(classify("where am i"), Intent::LocationQuery);
        assert_eq!(classify("file a complaint"), Intent::Reports);
    }

    #[test]
    fn default_is_general_chat() {
        assert_eq!(classify("hello there"), Intent::GeneralChat);
        assert_eq!(classify("tell me a joke"), Intent::GeneralChat);
    }

    #[test]
    fn coordinates_extraction_validates_ranges() {
        let coords = extract_coordinates("29.3938, 79.4538").unwrap();
        assert!((coords.lat() - 29.3938).abs() < 1e-9);
        assert!((coords.lon() - 79.4538).abs() < 1e-9);

        assert!(extract_coordinates("200, 79").is_none());
        assert!(extract_coordinates("no numbers here").is_none());
    }

    #[test]
    fn location_name_extraction_strips_stop_words() {
        assert_eq!(
            extract_location_name("what's the weather in Nainital?").as_deref(),
            Some("nainital")
        );
        assert_eq!(
            extract_location_name("issues near the Haldwani area and more").as_deref(),
            Some("haldwani area")
        );
        assert!(extract_location_name("weather").is_none());
    }

    #[test]
    fn user_location_phrases() {
        assert!(wants_user_location("weather here"));
        assert!(wants_user_location("news in my area"));
        assert!(!wants_user_location("weather in Delhi"));
    }
}
