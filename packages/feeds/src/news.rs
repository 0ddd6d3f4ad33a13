//! News headlines via `NewsAPI` with a Google News RSS fallback.
//!
//! `NewsAPI` needs an API key; the RSS path does not, so a keyless
//! deployment still gets headlines. Articles are deduplicated by title and
//! capped at five per response.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::{FeedError, REQUEST_TIMEOUT};

/// Maximum articles returned per call.
pub const ARTICLE_LIMIT: usize = 5;

static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<item>(.*?)</item>").unwrap_or_else(|_| unreachable!())
});
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<title>(?:<!\[CDATA\[)?(.*?)(?:\]\]>)?</title>")
        .unwrap_or_else(|_| unreachable!())
});
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<link>(.*?)</link>").unwrap_or_else(|_| unreachable!())
});
static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?([^/]+)").unwrap_or_else(|_| unreachable!())
});

/// One news article.
#[derive(Debug, Clone, Serialize)]
pub struct NewsArticle {
    /// Headline.
    pub title: String,
    /// Summary text; may be empty for RSS items.
    pub description: String,
    /// Publisher name or domain.
    pub source: String,
    /// Article URL.
    pub url: String,
}

/// News client. Works with or without a `NewsAPI` key.
pub struct NewsClient {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl NewsClient {
    /// Creates a client, picking up `NEWS_API_KEY` when set.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be constructed.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(std::env::var("NEWS_API_KEY").ok())
    }

    /// Creates a client with an explicit (optional) `NewsAPI` key.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be constructed.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) CivicLens/1.0")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build news HTTP client");
        Self { api_key, client }
    }

    /// Fetches national (India) headlines.
    ///
    /// Prefers `NewsAPI` top headlines when a key is configured; otherwise
    /// falls back to Google News RSS, first the India headline feed, then
    /// an explicit "India" search.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NoArticles`] when every strategy comes back
    /// empty, or a transport/parse error from the last strategy tried.
    pub async fn india_news(&self) -> Result<Vec<NewsArticle>, FeedError> {
        if let Some(api_key) = &self.api_key {
            match self.newsapi_top_headlines(api_key, "in").await {
                Ok(articles) if !articles.is_empty() => return Ok(articles),
                Ok(_) => {}
                Err(e) => log::warn!("NewsAPI top headlines failed: {e}"),
            }
        }

        let articles = self.google_rss(None).await?;
        if !articles.is_empty() {
            return Ok(dedup_by_title(articles, ARTICLE_LIMIT));
        }

        let articles = self.google_rss(Some("India")).await?;
        if articles.is_empty() {
            return Err(FeedError::NoArticles);
        }
        Ok(dedup_by_title(articles, ARTICLE_LIMIT))
    }

    /// Fetches news for a locality, widened with broader area names when
    /// the city itself yields nothing.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NoArticles`] when every query comes back empty,
    /// or a transport/parse error from the last strategy tried.
    pub async fn local_news(
        &self,
        city: &str,
        area_names: &[String],
    ) -> Result<Vec<NewsArticle>, FeedError> {
        if let Some(api_key) = self.api_key.as_deref() {
            let mut queries = vec![
                format!("{city} news"),
                format!("{city} latest news"),
                city.to_string(),
            ];
            for area in area_names {
                if !area.eq_ignore_ascii_case(city) {
                    queries.push(format!("{area} news"));
                }
            }

            let mut collected = Vec::new();
            for query in queries {
                match self.newsapi_everything(api_key, &query).await {
                    Ok(articles) => {
                        let found_for_city = query.starts_with(city) && articles.len() >= 3;
                        collected.extend(articles);
                        if found_for_city {
                            break;
                        }
                    }
                    Err(e) => log::warn!("NewsAPI query '{query}' failed: {e}"),
                }
            }

            let deduped = dedup_by_title(collected, ARTICLE_LIMIT);
            if !deduped.is_empty() {
                return Ok(deduped);
            }
        }

        let articles = self.google_rss(Some(&format!("{city} India"))).await?;
        if articles.is_empty() {
            return Err(FeedError::NoArticles);
        }
        Ok(dedup_by_title(articles, ARTICLE_LIMIT))
    }

    async fn newsapi_top_headlines(
        &self,
        api_key: &str,
        country: &str,
    ) -> Result<Vec<NewsArticle>, FeedError> {
        let resp = self
            .client
            .get("https://newsapi.org/v2/top-headlines")
            .query(&[("country", country), ("apiKey", api_key)])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(FeedError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        Ok(parse_newsapi_articles(&body, ARTICLE_LIMIT))
    }

    async fn newsapi_everything(
        &self,
        api_key: &str,
        query: &str,
    ) -> Result<Vec<NewsArticle>, FeedError> {
        let resp = self
            .client
            .get("https://newsapi.org/v2/everything")
            .query(&[
                ("q", query),
                ("apiKey", api_key),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", "10"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(FeedError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        Ok(parse_newsapi_articles(&body, 10))
    }

    /// Fetches a Google News RSS feed — the headline feed when `query` is
    /// `None`, otherwise a search feed.
    async fn google_rss(&self, query: Option<&str>) -> Result<Vec<NewsArticle>, FeedError> {
        let url = query.map_or_else(
            || "https://news.google.com/rss/headlines?hl=en-IN&gl=IN&ceid=IN:en".to_string(),
            |q| {
                format!(
                    "https://news.google.com/rss/search?q={}&hl=en-IN&gl=IN&ceid=IN:en",
                    urlencode(q)
                )
            },
        );

        let resp = self.client.get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(FeedError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body = resp.text().await?;
        Ok(parse_rss(&body, 8))
    }
}

/// Parses a `NewsAPI` response body into articles.
///
/// Articles with no title or a "[Removed]" placeholder are dropped.
#[must_use]
pub fn parse_newsapi_articles(body: &serde_json::Value, limit: usize) -> Vec<NewsArticle> {
    let Some(articles) = body.get("articles").and_then(serde_json::Value::as_array) else {
        return Vec::new();
    };

    articles
        .iter()
        .filter_map(|article| {
            let text = |key: &str| {
                article
                    .get(key)
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };

            let title = text("title");
            if title.is_empty() || title == "[Removed]" {
                return None;
            }

            Some(NewsArticle {
                title,
                description: text("description"),
                source: article
                    .get("source")
                    .and_then(|s| s.get("name"))
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                url: text("url"),
            })
        })
        .take(limit)
        .collect()
}

/// Parses an RSS body into articles. Items without a title or link are
/// dropped; the source is the link's domain.
#[must_use]
pub fn parse_rss(body: &str, limit: usize) -> Vec<NewsArticle> {
    ITEM_RE
        .captures_iter(body)
        .filter_map(|item| {
            let block = item.get(1)?.as_str();
            let title = TITLE_RE
                .captures(block)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())?;
            let url = LINK_RE
                .captures(block)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())?;

            if title.is_empty() || url.is_empty() {
                return None;
            }

            let source = DOMAIN_RE
                .captures(&url)
                .and_then(|c| c.get(1))
                .map_or_else(|| "Google News".to_string(), |m| m.as_str().to_string());

            Some(NewsArticle {
                title,
                description: String::new(),
                source,
                url,
            })
        })
        .take(limit)
        .collect()
}

/// Drops articles whose title (case-insensitive) was already seen, then
/// caps the list.
#[must_use]
pub fn dedup_by_title(articles: Vec<NewsArticle>, limit: usize) -> Vec<NewsArticle> {
    let mut seen: Vec<String> = Vec::new();
    articles
        .into_iter()
        .filter(|article| {
            let key = article.title.to_lowercase();
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        })
        .take(limit)
        .collect()
}

fn urlencode(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => encoded.push(c),
            ' ' => encoded.push_str("%20"),
            _ => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).as_bytes() {
                    encoded.push_str(&format!("%{byte:02X}"));
                }
            }
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_newsapi_articles_and_drops_removed() {
        let body = serde_json::json!({
            "articles": [
                {
                    "title": "Monsoon update",
                    "description": "Heavy rain expected",
                    "source": { "name": "The Hindu" },
                    "url": "https://thehindu.com/a"
                },
                { "title": "[Removed]", "url": "https://x.com" },
                { "title": "", "url": "https://y.com" },
            ]
        });
        let articles = parse_newsapi_articles(&body, 5);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].source, "The Hindu");
    }

    #[test]
    fn parses_rss_items_with_cdata_titles() {
        let body = r"<rss><channel>
            <item><title><![CDATA[Road closure in Nainital]]></title><link>https://www.example.com/story/1</link></item>
            <item><title>Second story</title><link>https://news.example.org/2</link></item>
            <item><title>No link here</title></item>
        </channel></rss>";
        let articles = parse_rss(body, 8);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Road closure in Nainital");
        assert_eq!(articles[0].source, "example.com");
        assert_eq!(articles[1].source, "news.example.org");
    }

    #[test]
    fn dedup_is_case_insensitive_and_caps() {
        let articles = vec![
            NewsArticle {
                title: "Big Story".to_string(),
                description: String::new(),
                source: "a".to_string(),
                url: "u1".to_string(),
            },
            NewsArticle {
                title: "BIG STORY".to_string(),
                description: String::new(),
                source: "b".to_string(),
                url: "u2".to_string(),
            },
            NewsArticle {
                title: "Other".to_string(),
                description: String::new(),
                source: "c".to_string(),
                url: "u3".to_string(),
            },
        ];
        let deduped = dedup_by_title(articles, 1);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].title, "Big Story");
    }

    #[test]
    fn urlencode_handles_spaces_and_unicode() {
        assert_eq!(urlencode("Bhimtal India"), "Bhimtal%20India");
        assert_eq!(urlencode("a&b"), "a%26b");
    }
}
