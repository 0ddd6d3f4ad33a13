#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Conversational orchestration: one message in, one envelope out.
//!
//! [`Assistant::process`] classifies the message, runs the matching branch
//! against the storage, geocoding, feed, retrieval, and LLM collaborators,
//! and always returns a [`ResponseEnvelope`]. Collaborator failures are
//! classified and rendered as friendly failure envelopes; they never
//! surface as raw errors to the caller.

pub mod compose;
pub mod intent;
pub mod report_lookup;

use civic_lens_ai::providers::{LlmProvider, create_provider_from_env};
use civic_lens_database::{DbError, queries};
use civic_lens_feeds::{news::NewsClient, weather::WeatherClient};
use civic_lens_geocoder::Geocoder;
use civic_lens_models::{
    Coordinates, ErrorKind, Intent, LocationInfo, ReportRecord, ResponseEnvelope,
};
use civic_lens_retrieval::{
    RetrievalError,
    config::RetrievalConfig,
    embedder::shared_embedder,
    engine::RetrievalEngine,
    vector::VectorIndex,
};
use switchy_database::Database;
use thiserror::Error;

/// Errors from assistant maintenance operations.
///
/// [`Assistant::process`] never returns these; only the administrative
/// surface (index sync) does.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Report storage failed.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Vector index or embedding failed.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

impl AssistantError {
    /// Classifies this error for uniform reporting.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Db(_) => ErrorKind::Internal,
            Self::Retrieval(e) => e.kind(),
        }
    }
}

const GENERAL_CHAT_SYSTEM: &str = "You are CivicLens, a friendly assistant for community issues. \
    You help people check local news and weather, find nearby civic issues, and track the status \
    of issue reports they have submitted. Keep replies short, warm, and practical.";

const LOCATION_EXTRACTION_SYSTEM: &str = "You are a location extraction assistant. Extract the \
    location or city name from the user's query and return ONLY the location name, nothing else. \
    If no location is mentioned, return 'NONE'.";

/// The conversational core. Holds every collaborator a branch may need.
pub struct Assistant {
    db: Box<dyn Database>,
    geocoder: Geocoder,
    news: NewsClient,
    weather: Option<WeatherClient>,
    llm: Option<Box<dyn LlmProvider>>,
    index: VectorIndex,
    config: RetrievalConfig,
}

impl Assistant {
    /// Creates an assistant from explicit collaborators.
    #[must_use]
    pub fn new(
        db: Box<dyn Database>,
        geocoder: Geocoder,
        news: NewsClient,
        weather: Option<WeatherClient>,
        llm: Option<Box<dyn LlmProvider>>,
        index: VectorIndex,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            db,
            geocoder,
            news,
            weather,
            llm,
            index,
            config,
        }
    }

    /// Creates an assistant with collaborators configured from the
    /// environment. The weather client and LLM provider are optional; the
    /// assistant degrades to failure envelopes and deterministic fallback
    /// replies when they are absent.
    #[must_use]
    pub fn from_env(db: Box<dyn Database>, config: RetrievalConfig) -> Self {
        let weather = match WeatherClient::from_env() {
            Ok(client) => Some(client),
            Err(e) => {
                log::warn!("Weather disabled: {e}");
                None
            }
        };
        let llm = match create_provider_from_env() {
            Ok(provider) => Some(provider),
            Err(e) => {
                log::warn!("LLM provider unavailable, using fallback replies: {e}");
                None
            }
        };

        Self::new(
            db,
            Geocoder::new(),
            NewsClient::from_env(),
            weather,
            llm,
            VectorIndex::from_env(),
            config,
        )
    }

    /// Handles one user message and returns the response envelope.
    ///
    /// Total: every input, including collaborator failure, produces an
    /// envelope.
    pub async fn process(
        &self,
        message: &str,
        user_coords: Option<Coordinates>,
    ) -> ResponseEnvelope {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return ResponseEnvelope::failure(
                Intent::GeneralChat,
                "empty_message",
                ErrorKind::Validation.friendly_message(),
            );
        }

        let intent = intent::classify(trimmed);
        log::debug!("Classified message as {intent}");

        match intent {
            Intent::TrackReport => self.track_report(trimmed).await,
            // A confirmation continues the India-news offer.
            Intent::IndiaNews | Intent::Confirmation => self.india_news(intent).await,
            Intent::LocalNews => self.local_news(trimmed, user_coords).await,
            Intent::Weather => self.current_weather(trimmed, user_coords).await,
            Intent::LocalIssues => self.local_issues(trimmed, user_coords).await,
            Intent::LocationQuery => self.location_query(user_coords).await,
            Intent::Reports => ResponseEnvelope::success(
                Intent::Reports,
                serde_json::Value::Null,
                "I can help you with reports! You can submit a new report or track existing \
                 ones. What would you like to do?",
            ),
            Intent::GeneralChat => self.general_chat(trimmed, user_coords).await,
        }
    }

    /// The underlying report store, for callers that also serve the CRUD
    /// surface.
    #[must_use]
    pub fn db(&self) -> &dyn Database {
        self.db.as_ref()
    }

    /// Embeds and indexes a single report. Companion to report creation;
    /// callers typically treat a failure here as non-fatal since the next
    /// full sync repairs the index.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError`] if embedding or indexing fails.
    pub async fn index_report(&self, report: &ReportRecord) -> Result<(), AssistantError> {
        self.index.index_report(shared_embedder(), report).await?;
        Ok(())
    }

    /// Re-embeds every stored report into the vector index.
    ///
    /// Returns the number of reports indexed.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError`] if listing reports or rebuilding the
    /// index fails.
    pub async fn sync_index(&self) -> Result<usize, AssistantError> {
        let reports = queries::list_reports(self.db.as_ref(), &queries::ReportFilter::default())
            .await?;
        let indexed = self.index.sync_reports(shared_embedder(), &reports).await?;
        Ok(indexed)
    }

    async fn track_report(&self, message: &str) -> ResponseEnvelope {
        let Some(raw_id) = report_lookup::extract_report_id(message) else {
            return ResponseEnvelope::failure(
                Intent::TrackReport,
                "no_report_id",
                "Please provide a report ID so I can look it up. You can paste the full ID \
                 (e.g. 4d14ffa4-138d-4bd0-8f1a-5c9b2c7d8e9f), the compact form without \
                 hyphens, or a numeric ID.",
            )
            .with_suggestions(vec![
                "Try: track report <report ID>".to_string(),
                "The report ID was shown when the report was submitted".to_string(),
            ]);
        };

        match report_lookup::resolve(self.db.as_ref(), &raw_id).await {
            Ok(Some(report)) => {
                let summary = compose::format_report_summary(&report);
                let data = serde_json::json!({
                    "response": summary,
                    "reportData": report,
                });
                ResponseEnvelope::success(
                    Intent::TrackReport,
                    data,
                    format!("Report {} found", report.report_id),
                )
            }
            Ok(None) => ResponseEnvelope::failure(
                Intent::TrackReport,
                "report_not_found",
                format!("I couldn't find a report with ID {raw_id}."),
            )
            .with_suggestions(report_lookup::not_found_suggestions()),
            Err(e) => {
                log::error!("Report lookup failed: {e}");
                ResponseEnvelope::failure(
                    Intent::TrackReport,
                    ErrorKind::Internal.as_ref(),
                    ErrorKind::Internal.friendly_message(),
                )
            }
        }
    }

    async fn india_news(&self, intent: Intent) -> ResponseEnvelope {
        match self.news.india_news().await {
            Ok(articles) => {
                let data = serde_json::json!({ "articles": articles });
                ResponseEnvelope::success(intent, data, "Here are the latest India news headlines")
            }
            Err(e) => {
                log::warn!("India news fetch failed: {e}");
                let kind = e.kind();
                ResponseEnvelope::failure(intent, kind.as_ref(), kind.friendly_message())
            }
        }
    }

    async fn local_news(
        &self,
        message: &str,
        user_coords: Option<Coordinates>,
    ) -> ResponseEnvelope {
        match self.resolve_place(message, user_coords).await {
            Place::Coordinates(coords) => self.local_news_at(coords).await,
            Place::Named(name) => match self.geocoder.geocode(&name).await {
                Ok(Some((coords, info))) => {
                    let city = info.city.unwrap_or_else(|| name.clone());
                    self.local_news_for_city(&city, coords).await
                }
                Ok(None) => ResponseEnvelope::failure(
                    Intent::LocalNews,
                    "location_not_found",
                    format!(
                        "Could not find '{name}'. Please provide a valid city name or enable \
                         location services."
                    ),
                ),
                Err(e) => {
                    log::warn!("Geocoding '{name}' failed: {e}");
                    let kind = e.kind();
                    ResponseEnvelope::failure(Intent::LocalNews, kind.as_ref(), kind.friendly_message())
                }
            },
            Place::Unknown => ResponseEnvelope::failure(
                Intent::LocalNews,
                "no_location",
                "Please provide a city name or enable location services for local news",
            ),
        }
    }

    async fn local_news_at(&self, coords: Coordinates) -> ResponseEnvelope {
        match self.geocoder.reverse_geocode(coords).await {
            Ok(reverse) => {
                let city = reverse
                    .info
                    .city
                    .clone()
                    .unwrap_or_else(|| "your area".to_string());
                match self.news.local_news(&city, &reverse.area_names).await {
                    Ok(articles) => {
                        let data = serde_json::json!({ "articles": articles, "city": city });
                        ResponseEnvelope::success(
                            Intent::LocalNews,
                            data,
                            format!("Here are the latest news headlines for {city}"),
                        )
                    }
                    Err(e) => {
                        log::warn!("Local news fetch failed: {e}");
                        let kind = e.kind();
                        ResponseEnvelope::failure(
                            Intent::LocalNews,
                            kind.as_ref(),
                            kind.friendly_message(),
                        )
                    }
                }
            }
            Err(e) => {
                log::warn!("Reverse geocode failed: {e}");
                let kind = e.kind();
                ResponseEnvelope::failure(Intent::LocalNews, kind.as_ref(), kind.friendly_message())
            }
        }
    }

    async fn local_news_for_city(&self, city: &str, coords: Coordinates) -> ResponseEnvelope {
        let area_names = self.geocoder.nearby_area_names(coords).await;
        match self.news.local_news(city, &area_names).await {
            Ok(articles) => {
                let data = serde_json::json!({ "articles": articles, "city": city });
                ResponseEnvelope::success(
                    Intent::LocalNews,
                    data,
                    format!("Here are the latest news headlines for {city}"),
                )
            }
            Err(e) => {
                log::warn!("Local news fetch failed: {e}");
                let kind = e.kind();
                ResponseEnvelope::failure(Intent::LocalNews, kind.as_ref(), kind.friendly_message())
            }
        }
    }

    async fn current_weather(
        &self,
        message: &str,
        user_coords: Option<Coordinates>,
    ) -> ResponseEnvelope {
        match self.resolve_place(message, user_coords).await {
            Place::Coordinates(coords) => self.weather_at(coords).await,
            Place::Named(name) => match self.geocoder.geocode(&name).await {
                Ok(Some((coords, _))) => self.weather_at(coords).await,
                Ok(None) => ResponseEnvelope::failure(
                    Intent::Weather,
                    "location_not_found",
                    format!(
                        "Could not find weather for '{name}'. Please provide a valid city name \
                         or enable location services."
                    ),
                ),
                Err(e) => {
                    log::warn!("Geocoding '{name}' failed: {e}");
                    let kind = e.kind();
                    ResponseEnvelope::failure(Intent::Weather, kind.as_ref(), kind.friendly_message())
                }
            },
            Place::Unknown => ResponseEnvelope::failure(
                Intent::Weather,
                "no_location",
                "Please provide a city name or enable location services for weather information",
            ),
        }
    }

    async fn weather_at(&self, coords: Coordinates) -> ResponseEnvelope {
        let Some(weather) = &self.weather else {
            return ResponseEnvelope::failure(
                Intent::Weather,
                ErrorKind::UpstreamQuotaOrAuth.as_ref(),
                ErrorKind::UpstreamQuotaOrAuth.friendly_message(),
            );
        };

        match weather.current(coords).await {
            Ok(info) => {
                let message = format!(
                    "It's currently {:.1}°C in {} with {}. Feels like {:.1}°C, humidity {}%.",
                    info.temperature, info.city, info.description, info.feels_like, info.humidity
                );
                let data = serde_json::to_value(&info).unwrap_or(serde_json::Value::Null);
                ResponseEnvelope::success(Intent::Weather, data, message)
            }
            Err(e) => {
                log::warn!("Weather fetch failed: {e}");
                let kind = e.kind();
                ResponseEnvelope::failure(Intent::Weather, kind.as_ref(), kind.friendly_message())
            }
        }
    }

    async fn local_issues(
        &self,
        message: &str,
        user_coords: Option<Coordinates>,
    ) -> ResponseEnvelope {
        let coords = user_coords.or_else(|| intent::extract_coordinates(message));

        let reverse = match coords {
            Some(coords) => match self.geocoder.reverse_geocode(coords).await {
                Ok(reverse) => Some(reverse),
                Err(e) => {
                    log::warn!("Reverse geocode failed, searching without context: {e}");
                    None
                }
            },
            None => None,
        };

        let reports = match queries::list_reports(
            self.db.as_ref(),
            &queries::ReportFilter::default(),
        )
        .await
        {
            Ok(reports) => reports,
            Err(e) => {
                log::error!("Listing reports failed: {e}");
                return ResponseEnvelope::failure(
                    Intent::LocalIssues,
                    ErrorKind::Internal.as_ref(),
                    ErrorKind::Internal.friendly_message(),
                );
            }
        };

        let engine = RetrievalEngine::new(shared_embedder(), &self.index, &self.config);
        let result = engine
            .search(message, coords, reverse.as_ref(), &reports)
            .await;

        let message = if result.issues.is_empty() {
            "I couldn't find any reported issues matching your query.".to_string()
        } else {
            format!("Found {} local issue(s) near you", result.issues.len())
        };
        let data = serde_json::to_value(&result).unwrap_or(serde_json::Value::Null);
        ResponseEnvelope::success(Intent::LocalIssues, data, message)
    }

    async fn location_query(&self, user_coords: Option<Coordinates>) -> ResponseEnvelope {
        let Some(coords) = user_coords else {
            return ResponseEnvelope::success(
                Intent::LocationQuery,
                serde_json::json!({
                    "response": "I need your location to tell you where you are. Please enable \
                                 location services and try again."
                }),
                "Location not available",
            );
        };

        match self.geocoder.reverse_geocode(coords).await {
            Ok(reverse) => {
                let summary = compose::location_summary(&reverse.info);
                let data = serde_json::json!({ "location": reverse.info });
                ResponseEnvelope::success(
                    Intent::LocationQuery,
                    data,
                    format!(
                        "Based on your coordinates, you're currently in **{summary}**. Is there \
                         anything you'd like to know about your area?"
                    ),
                )
            }
            Err(e) => {
                log::warn!("Reverse geocode failed: {e}");
                let kind = e.kind();
                ResponseEnvelope::failure(
                    Intent::LocationQuery,
                    kind.as_ref(),
                    kind.friendly_message(),
                )
            }
        }
    }

    async fn general_chat(
        &self,
        message: &str,
        user_coords: Option<Coordinates>,
    ) -> ResponseEnvelope {
        let location = match user_coords {
            Some(coords) => match self.geocoder.reverse_geocode(coords).await {
                Ok(reverse) => Some(reverse.info),
                Err(e) => {
                    log::debug!("Reverse geocode for chat context failed: {e}");
                    None
                }
            },
            None => None,
        };

        let reply = match &self.llm {
            Some(llm) => {
                let system = location.as_ref().map_or_else(
                    || GENERAL_CHAT_SYSTEM.to_string(),
                    |info| {
                        let context = match (&info.city, &info.state) {
                            (Some(city), Some(state)) => {
                                format!("The user is in {city}, {state}. ")
                            }
                            (Some(city), None) => format!("The user is in {city}. "),
                            _ => String::new(),
                        };
                        format!("{context}{GENERAL_CHAT_SYSTEM}")
                    },
                );

                match llm.chat(&system, message).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        log::warn!("LLM chat failed, using fallback reply: {e}");
                        fallback_response(message, location.as_ref())
                    }
                }
            }
            None => fallback_response(message, location.as_ref()),
        };

        let data = serde_json::json!({ "response": reply });
        ResponseEnvelope::success(Intent::GeneralChat, data, reply)
    }

    /// Resolves where the message is talking about.
    ///
    /// Coordinates win when the user refers to their own surroundings or
    /// names no place; an explicitly named place otherwise takes priority;
    /// coordinates are the final fallback.
    async fn resolve_place(&self, message: &str, user_coords: Option<Coordinates>) -> Place {
        let coords = user_coords.or_else(|| intent::extract_coordinates(message));
        let use_user = intent::wants_user_location(message);

        let mut name = intent::extract_location_name(message);
        if name.is_none() && !use_user {
            name = self.llm_extract_location(message).await;
        }

        if let Some(coords) = coords {
            if use_user || name.is_none() {
                return Place::Coordinates(coords);
            }
        }
        if let Some(name) = name {
            return Place::Named(name);
        }
        coords.map_or(Place::Unknown, Place::Coordinates)
    }

    /// Asks the LLM to pull a place name out of the message. Best-effort;
    /// absent provider, errors, and "NONE" replies all resolve to `None`.
    async fn llm_extract_location(&self, message: &str) -> Option<String> {
        let llm = self.llm.as_ref()?;
        let prompt = format!("Extract the location/city name from this query: \"{message}\"");

        match llm.chat(LOCATION_EXTRACTION_SYSTEM, &prompt).await {
            Ok(reply) => {
                let name = reply.trim().trim_matches('"').trim().to_string();
                if name.eq_ignore_ascii_case("none") || name.len() <= 2 {
                    None
                } else {
                    Some(name)
                }
            }
            Err(e) => {
                log::debug!("LLM location extraction failed: {e}");
                None
            }
        }
    }
}

/// Where a message is asking about.
enum Place {
    /// A usable coordinate pair.
    Coordinates(Coordinates),
    /// A place name still to be geocoded.
    Named(String),
    /// Nothing to go on.
    Unknown,
}

/// Deterministic reply used when no LLM provider is configured or the
/// provider call fails.
#[must_use]
pub fn fallback_response(message: &str, location: Option<&LocationInfo>) -> String {
    let lowered = message.to_lowercase();

    if lowered.contains("location") || lowered.contains("where") {
        return location.and_then(|info| info.city.clone()).map_or_else(
            || {
                "I don't have your location right now. Please enable location services so I \
                 can help with nearby news, weather, and issues."
                    .to_string()
            },
            |city| {
                format!(
                    "You appear to be in {city}. I can help you with local news, weather, and \
                     community issues there."
                )
            },
        );
    }

    let is_greeting = lowered
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_ascii_alphanumeric()))
        .any(|w| matches!(w, "hello" | "hi" | "hey" | "namaste"));
    if is_greeting {
        return "Hello! I'm your CivicLens assistant. I can help you with local news, weather, \
                community issues, and tracking your reports. What would you like to know?"
            .to_string();
    }

    if lowered.contains("help") {
        return "Here's what I can do:\n\
                - **Local news**: \"show me local news\"\n\
                - **Weather**: \"what's the weather in Nainital\"\n\
                - **Local issues**: \"any issues near me\"\n\
                - **Track a report**: \"track report <ID>\"\n\
                - **India news**: \"india news\""
            .to_string();
    }

    "I can help you with local news, weather, community issues, and report tracking. Could \
     you tell me a bit more about what you're looking for?"
        .to_string()
}

#[cfg(test)]
mod tests {
    use civic_lens_database::open_in_memory;
    use civic_lens_models::{ReportStatus, ReportType};
    use civic_lens_retrieval::vector::DEFAULT_COLLECTION;

    use super::*;

    async fn offline_assistant() -> Assistant {
        let db = open_in_memory().await.unwrap();
        Assistant::new(
            db,
            Geocoder::new(),
            NewsClient::new(None),
            None,
            None,
            VectorIndex::new(
                "http://localhost:6333".to_string(),
                DEFAULT_COLLECTION.to_string(),
            ),
            RetrievalConfig::default(),
        )
    }

    async fn seed_report(assistant: &Assistant, report_id: &str, title: &str) {
        let new = queries::NewReport {
            report_id: Some(report_id.to_string()),
            report_type: ReportType::NonEmergency,
            title: title.to_string(),
            description: "test description".to_string(),
            specific_type: "pothole".to_string(),
            location: Some("Bhimtal".to_string()),
            latitude: Some(29.3938),
            longitude: Some(79.4538),
            is_anonymous: true,
            reporter_name: None,
            reporter_email: None,
            reporter_phone: None,
            reporter_user_id: None,
            department_id: None,
            department_name: None,
        };
        queries::create_report(assistant.db.as_ref(), &new)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn track_report_returns_stored_record() {
        let assistant = offline_assistant().await;
        seed_report(&assistant, "4d14ffa4138d4bd0", "Pothole on Mall Road").await;

        let envelope = assistant
            .process("track report 4d14ffa4138d4bd0", None)
            .await;

        assert!(envelope.success);
        assert_eq!(envelope.intent, "reports");
        assert_eq!(envelope.message, "Report 4d14ffa4138d4bd0 found");
        let report = &envelope.data["reportData"];
        assert_eq!(report["title"], "Pothole on Mall Road");
        assert_eq!(
            report["status"],
            serde_json::to_value(ReportStatus::Pending).unwrap()
        );
        assert!(
            envelope.data["response"]
                .as_str()
                .unwrap()
                .contains("**Status:** Pending")
        );
    }

    #[tokio::test]
    async fn track_report_unknown_id_offers_suggestions() {
        let assistant = offline_assistant().await;

        let envelope = assistant.process("track report deadbeefdeadbeef", None).await;

        assert!(!envelope.success);
        assert_eq!(envelope.intent, "reports");
        assert_eq!(envelope.error.as_deref(), Some("report_not_found"));
        assert_eq!(envelope.suggestions.as_ref().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn track_report_without_id_asks_for_one() {
        let assistant = offline_assistant().await;

        let envelope = assistant.process("track report abc", None).await;

        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("no_report_id"));
        assert!(envelope.suggestions.is_some());
    }

    #[tokio::test]
    async fn weather_without_any_location_fails() {
        let assistant = offline_assistant().await;

        let envelope = assistant.process("what's the weather?", None).await;

        assert!(!envelope.success);
        assert_eq!(envelope.intent, "weather");
        assert_eq!(envelope.error.as_deref(), Some("no_location"));
        assert_eq!(
            envelope.message,
            "Please provide a city name or enable location services for weather information"
        );
    }

    #[tokio::test]
    async fn local_news_without_any_location_fails() {
        let assistant = offline_assistant().await;

        let envelope = assistant.process("show me local news", None).await;

        assert!(!envelope.success);
        assert_eq!(envelope.intent, "news");
        assert_eq!(envelope.error.as_deref(), Some("no_location"));
    }

    #[tokio::test]
    async fn location_query_without_coordinates_asks_politely() {
        let assistant = offline_assistant().await;

        let envelope = assistant.process("where am i", None).await;

        assert!(envelope.success);
        assert_eq!(envelope.intent, "general");
        assert_eq!(envelope.message, "Location not available");
    }

    #[tokio::test]
    async fn reports_intent_returns_canned_offer() {
        let assistant = offline_assistant().await;

        let envelope = assistant.process("I want to file a complaint", None).await;

        assert!(envelope.success);
        assert_eq!(envelope.intent, "reports");
        assert!(envelope.message.contains("submit a new report"));
    }

    #[tokio::test]
    async fn general_chat_without_llm_uses_fallback() {
        let assistant = offline_assistant().await;

        let envelope = assistant.process("hello", None).await;

        assert!(envelope.success);
        assert_eq!(envelope.intent, "general");
        assert!(envelope.message.contains("CivicLens assistant"));
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let assistant = offline_assistant().await;

        let envelope = assistant.process("   ", None).await;

        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("empty_message"));
    }

    #[test]
    fn fallback_replies_cover_the_common_cases() {
        let greeting = fallback_response("hey there", None);
        assert!(greeting.contains("CivicLens assistant"));

        let help = fallback_response("can you help me", None);
        assert!(help.contains("Track a report"));

        let info = LocationInfo {
            city: Some("Nainital".to_string()),
            ..LocationInfo::default()
        };
        let located = fallback_response("where am I right now", Some(&info));
        assert!(located.contains("Nainital"));

        let default = fallback_response("tell me a story", None);
        assert!(default.contains("local news"));
    }
}
