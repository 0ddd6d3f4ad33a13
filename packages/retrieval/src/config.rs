//! Deployment configuration for retrieval heuristics.
//!
//! The enrichment and fallback stages depend on place names and vocabulary
//! specific to one deployment's service area. Those live here as data —
//! loadable from a TOML file — rather than as literals in the pipeline
//! code. The defaults describe the Uttarakhand deployment this was built
//! for.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+").unwrap_or_else(|_| unreachable!()));

/// Errors from loading a retrieval configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML or has the wrong shape.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunable retrieval behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Radius for harvesting enrichment tokens from nearby reports, in km.
    pub radius_km: f64,

    /// Maximum number of results returned from any stage.
    pub limit: usize,

    /// Maximum area tokens appended to the query during enrichment.
    pub max_area_tokens: usize,

    /// Maximum domain tokens appended to a generic query.
    pub max_domain_tokens: usize,

    /// Filler words. A query made solely of these carries no real
    /// search terms and is treated as generic.
    pub generic_fillers: Vec<String>,

    /// Area tokens never appended to a query (generic country and
    /// infrastructure words that harvest from report locations).
    pub area_token_stop_list: Vec<String>,

    /// Issue-domain vocabulary used to boost generic queries.
    pub domain_vocabulary: Vec<String>,

    /// Locality names promoted into the query when they appear anywhere
    /// in a reverse-geocoded display address.
    pub locality_overrides: Vec<String>,

    /// Place names whose results are dropped from every result set;
    /// known to be outside this deployment's service area.
    pub excluded_places: Vec<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            radius_km: 30.0,
            limit: 10,
            max_area_tokens: 3,
            max_domain_tokens: 3,
            generic_fillers: to_strings(&["issues", "issue", "near", "local", "here", "around", "me"]),
            area_token_stop_list: to_strings(&["india", "highway", "office", "chief", "resorts"]),
            domain_vocabulary: to_strings(&[
                "pothole", "garbage", "leakage", "road", "damage", "water", "accident",
            ]),
            locality_overrides: to_strings(&["Bhimtal"]),
            excluded_places: to_strings(&["bengaluru", "bangalore", "koramangala"]),
        }
    }
}

impl RetrievalConfig {
    /// Loads configuration from a TOML file. Absent fields take their
    /// default values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Whether a query is "generic": empty, or every token of 3+ letters
    /// is a filler word.
    #[must_use]
    pub fn is_generic_query(&self, query: &str) -> bool {
        let tokens = word_tokens(query, 3);
        tokens.is_empty() || tokens.iter().all(|t| self.generic_fillers.contains(t))
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// Lower-cased alphabetic tokens of at least `min_len` characters.
#[must_use]
pub fn word_tokens(text: &str, min_len: usize) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|word| word.len() >= min_len)
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_match_deployment() {
        let config = RetrievalConfig::default();
        assert!((config.radius_km - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.limit, 10);
        assert!(config.domain_vocabulary.contains(&"pothole".to_string()));
        assert!(config.excluded_places.contains(&"bengaluru".to_string()));
    }

    #[test]
    fn generic_query_detection() {
        let config = RetrievalConfig::default();
        assert!(config.is_generic_query(""));
        assert!(config.is_generic_query("issues near me"));
        assert!(config.is_generic_query("local issues here"));
        assert!(!config.is_generic_query("pothole near me"));
        assert!(!config.is_generic_query("garbage"));
    }

    #[test]
    fn word_tokens_filter_by_length() {
        assert_eq!(
            word_tokens("Potholes on NH-109, big damage!", 4),
            vec!["potholes", "damage"]
        );
        assert_eq!(word_tokens("a bc def", 3), vec!["def"]);
    }

    #[test]
    fn word_tokens_split_on_non_alphabetic_runs() {
        assert_eq!(
            word_tokens("road4water near Mall-Road (Bhimtal)", 4),
            vec!["road", "water", "near", "mall", "road", "bhimtal"]
        );
        assert!(word_tokens("42 -- 7.5", 1).is_empty());
    }

    #[test]
    fn toml_overrides_partial_fields() {
        let config: RetrievalConfig = toml::from_str(
            r#"
            radius_km = 50.0
            excluded_places = ["gotham"]
            "#,
        )
        .unwrap();
        assert!((config.radius_km - 50.0).abs() < f64::EPSILON);
        assert_eq!(config.excluded_places, vec!["gotham"]);
        // Untouched fields keep defaults.
        assert_eq!(config.limit, 10);
    }
}
