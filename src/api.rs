//! API client for the DramaBox listing service.
//!
//! This module wraps the upstream REST endpoints: the home feed sections,
//! drama detail, the full episode list, search and popular searches. All
//! responses are JSON; listings arrive either as a bare array or wrapped in
//! an object, and both shapes are accepted.

use crate::error::{AppError, Result};
use crate::types::{Drama, Episode};
use log::{debug, info, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Maximum number of retry attempts for failed requests.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds (doubles each retry).
const BASE_RETRY_DELAY_MS: u64 = 500;

/// Dramas kept per home feed section.
pub const HOME_SECTION_LIMIT: usize = 12;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Sections of the home feed, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    ForYou,
    Trending,
    DubIndo,
    Latest,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::ForYou,
        Section::Trending,
        Section::DubIndo,
        Section::Latest,
    ];

    /// Endpoint path relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Section::ForYou => "foryou",
            Section::Trending => "trending",
            Section::DubIndo => "dubindo",
            Section::Latest => "latest",
        }
    }

    /// Fixed query parameters sent with the section request.
    pub fn query(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Section::DubIndo => &[("classify", "terpopuler")],
            _ => &[],
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::ForYou => "For You",
            Section::Trending => "Trending",
            Section::DubIndo => "Dub Indo",
            Section::Latest => "Latest",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Section::ForYou => "Picks tailored to you",
            Section::Trending => "Viral and most watched right now",
            Section::DubIndo => "Dramas dubbed in Indonesian",
            Section::Latest => "New dramas every day",
        }
    }
}

/// One loaded section of the home feed.
#[derive(Debug, Clone)]
pub struct FeedSection {
    pub section: Section,
    pub dramas: Vec<Drama>,
    /// Set when the section failed to load; the other sections still show.
    pub error: Option<String>,
}

/// The four home feed sections.
#[derive(Debug, Clone, Default)]
pub struct HomeFeed {
    pub sections: Vec<FeedSection>,
}

impl HomeFeed {
    pub fn get(&self, section: Section) -> Option<&FeedSection> {
        self.sections.iter().find(|s| s.section == section)
    }
}

/// Check if an error is retryable (network errors, timeouts, server errors).
fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout()
        || error.is_connect()
        || error.is_request()
        || error.status().map(|s| s.is_server_error()).unwrap_or(false)
}

/// Retry an async operation with exponential backoff.
///
/// Retries the operation up to `MAX_RETRIES` times on retryable errors,
/// with exponential backoff starting at `BASE_RETRY_DELAY_MS`.
async fn retry_with_backoff<T, F, Fut>(operation_name: &str, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, reqwest::Error>>,
{
    let mut last_error = None;

    for attempt in 0..=MAX_RETRIES {
        match f().await {
            Ok(result) => {
                if attempt > 0 {
                    info!(
                        "{} succeeded after {} attempts",
                        operation_name,
                        attempt + 1
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                if attempt < MAX_RETRIES && is_retryable_error(&e) {
                    let delay = Duration::from_millis(BASE_RETRY_DELAY_MS * 2_u64.pow(attempt));
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:?}...",
                        operation_name,
                        attempt + 1,
                        MAX_RETRIES + 1,
                        e,
                        delay
                    );
                    sleep(delay).await;
                    last_error = Some(e);
                } else {
                    return Err(AppError::Network(format!("{} failed: {}", operation_name, e)));
                }
            }
        }
    }

    Err(AppError::Network(format!(
        "{} failed after {} attempts: {}",
        operation_name,
        MAX_RETRIES + 1,
        last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string())
    )))
}

/// Object fields that may hold a listing's array, checked in order.
const LISTING_FIELDS: [&str; 4] = ["data", "list", "episodes", "records"];

/// Decode a listing that is either a bare array or an object holding one.
///
/// For objects the first of [`LISTING_FIELDS`] holding an array wins; an
/// object without one is an empty listing.
fn parse_listing<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    let items = match serde_json::from_str::<Value>(body)? {
        Value::Object(mut map) => LISTING_FIELDS
            .iter()
            .find_map(|field| match map.remove(*field) {
                Some(items @ Value::Array(_)) => Some(items),
                _ => None,
            })
            .unwrap_or_else(|| Value::Array(Vec::new())),
        other => other,
    };
    Ok(serde_json::from_value(items)?)
}

/// Decode a drama listing (home sections and search results).
pub fn parse_dramas(body: &str) -> Result<Vec<Drama>> {
    parse_listing(body)
}

/// Decode the full episode list, sorted by episode index.
pub fn parse_episodes(body: &str) -> Result<Vec<Episode>> {
    let mut episodes: Vec<Episode> = parse_listing(body)?;
    episodes.sort_by_key(|e| e.chapter_index);
    Ok(episodes)
}

/// Decode a drama detail response.
///
/// Accepts the drama object itself or one wrapped in `{"data": ...}`.
/// A response without a `bookId` is reported as not found.
pub fn parse_detail(body: &str) -> Result<Drama> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Detail {
        Wrapped { data: Drama },
        Bare(Drama),
    }

    let drama = match serde_json::from_str::<Detail>(body)? {
        Detail::Wrapped { data } => data,
        Detail::Bare(drama) => drama,
    };

    if drama.book_id.is_empty() {
        return Err(AppError::NotFound("Drama detail has no bookId".to_string()));
    }
    Ok(drama)
}

/// Decode the popular search terms.
///
/// Terms may be plain strings or objects carrying a name field.
pub fn parse_popular_search(body: &str) -> Result<Vec<String>> {
    let items: Vec<Value> = parse_listing(body)?;
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Object(map) => ["keyword", "bookName", "name"]
                .iter()
                .find_map(|k| map.get(*k).and_then(|v| v.as_str()).map(str::to_string)),
            _ => None,
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// Build the home feed from per-section results in [`Section::ALL`] order.
///
/// Each section is capped at [`HOME_SECTION_LIMIT`]; a failed section keeps
/// its error and leaves the others intact.
pub fn collect_feed(results: [Result<Vec<Drama>>; 4]) -> HomeFeed {
    let sections = Section::ALL
        .into_iter()
        .zip(results)
        .map(|(section, result)| match result {
            Ok(mut dramas) => {
                dramas.truncate(HOME_SECTION_LIMIT);
                FeedSection {
                    section,
                    dramas,
                    error: None,
                }
            }
            Err(e) => {
                warn!("Failed to load {}: {}", section.title(), e);
                FeedSection {
                    section,
                    dramas: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        })
        .collect();

    HomeFeed { sections }
}

/// Client for the DramaBox API.
#[derive(Debug, Clone)]
pub struct DramaApi {
    client: reqwest::Client,
    base_url: String,
}

impl DramaApi {
    /// Create a client for `base_url` with the given request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_text(&self, operation: &str, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = self.endpoint(path);
        let query: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        debug!("GET {} {:?}", url, query);

        retry_with_backoff(operation, || {
            let client = self.client.clone();
            let url = url.clone();
            let query = query.clone();
            async move {
                client
                    .get(&url)
                    .query(&query)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await
            }
        })
        .await
    }

    /// Fetch one home feed section.
    pub async fn fetch_section(&self, section: Section) -> Result<Vec<Drama>> {
        let body = self
            .get_text(
                &format!("Fetch {}", section.title()),
                section.path(),
                section.query(),
            )
            .await?;
        let dramas = parse_dramas(&body)?;
        debug!("Fetched {} dramas for {}", dramas.len(), section.title());
        Ok(dramas)
    }

    pub async fn fetch_for_you(&self) -> Result<Vec<Drama>> {
        self.fetch_section(Section::ForYou).await
    }

    pub async fn fetch_trending(&self) -> Result<Vec<Drama>> {
        self.fetch_section(Section::Trending).await
    }

    pub async fn fetch_latest(&self) -> Result<Vec<Drama>> {
        self.fetch_section(Section::Latest).await
    }

    pub async fn fetch_dub_indo(&self) -> Result<Vec<Drama>> {
        self.fetch_section(Section::DubIndo).await
    }

    /// Fetch all home feed sections concurrently.
    ///
    /// A failing section is recorded in its [`FeedSection::error`] and does
    /// not affect the others.
    pub async fn fetch_home_feed(&self) -> HomeFeed {
        let (for_you, trending, dub_indo, latest) = tokio::join!(
            self.fetch_for_you(),
            self.fetch_trending(),
            self.fetch_dub_indo(),
            self.fetch_latest(),
        );

        collect_feed([for_you, trending, dub_indo, latest])
    }

    /// Fetch the detail record of a drama.
    pub async fn fetch_detail(&self, book_id: &str) -> Result<Drama> {
        let body = self
            .get_text("Fetch drama detail", "detail", &[("bookId", book_id)])
            .await?;
        parse_detail(&body)
    }

    /// Fetch every episode of a drama, sorted by index.
    ///
    /// Failures are logged and yield an empty list; the watch screen then
    /// shows the episode as unavailable.
    pub async fn fetch_all_episodes(&self, book_id: &str) -> Vec<Episode> {
        let result = match self
            .get_text("Fetch episodes", "allepisode", &[("bookId", book_id)])
            .await
        {
            Ok(body) => parse_episodes(&body),
            Err(e) => Err(e),
        };

        match result {
            Ok(episodes) => {
                debug!("Fetched {} episodes for {}", episodes.len(), book_id);
                episodes
            }
            Err(e) => {
                warn!("Failed to load episodes for {}: {}", book_id, e);
                Vec::new()
            }
        }
    }

    /// Search dramas by title.
    pub async fn search(&self, query: &str) -> Result<Vec<Drama>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("Search query is empty".to_string()));
        }

        debug!("Searching for '{}'", query);
        let body = self
            .get_text(&format!("Search for '{}'", query), "search", &[("query", query)])
            .await?;
        let dramas = parse_dramas(&body)?;
        debug!("Found {} dramas for query '{}'", dramas.len(), query);
        Ok(dramas)
    }

    /// Fetch the list of trending search terms.
    pub async fn fetch_popular_search(&self) -> Result<Vec<String>> {
        let body = self
            .get_text("Fetch popular searches", "populersearch", &[])
            .await?;
        parse_popular_search(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> DramaApi {
        DramaApi::new("https://example.com/api/dramabox/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let api = api();
        assert_eq!(api.base_url(), "https://example.com/api/dramabox");
        assert_eq!(api.endpoint("foryou"), "https://example.com/api/dramabox/foryou");
        assert_eq!(api.endpoint("/detail"), "https://example.com/api/dramabox/detail");
    }

    #[test]
    fn test_section_paths() {
        assert_eq!(Section::ForYou.path(), "foryou");
        assert_eq!(Section::Trending.path(), "trending");
        assert_eq!(Section::Latest.path(), "latest");
        assert_eq!(Section::DubIndo.path(), "dubindo");
        assert_eq!(Section::DubIndo.query(), &[("classify", "terpopuler")]);
        assert!(Section::Trending.query().is_empty());
    }

    #[test]
    fn test_section_titles() {
        let titles: Vec<_> = Section::ALL.iter().map(|s| s.title()).collect();
        assert_eq!(titles, vec!["For You", "Trending", "Dub Indo", "Latest"]);
    }

    #[test]
    fn test_parse_dramas_bare_array() {
        let body = r#"[{"bookId": "1", "bookName": "A"}, {"bookId": "2", "bookName": "B"}]"#;
        let dramas = parse_dramas(body).unwrap();
        assert_eq!(dramas.len(), 2);
        assert_eq!(dramas[1].book_name, "B");
    }

    #[test]
    fn test_parse_dramas_wrapped() {
        let body = r#"{"data": [{"bookId": "1"}]}"#;
        assert_eq!(parse_dramas(body).unwrap().len(), 1);
        let body = r#"{"list": [{"bookId": "1"}, {"bookId": "2"}]}"#;
        assert_eq!(parse_dramas(body).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_dramas_invalid_json() {
        assert!(matches!(parse_dramas("<html>"), Err(AppError::Parse(_))));
    }

    #[test]
    fn test_parse_episodes_object_form() {
        let body = r#"{"episodes": [
            {"chapterId": "b", "chapterIndex": 1},
            {"chapterId": "a", "chapterIndex": 0}
        ]}"#;
        let episodes = parse_episodes(body).unwrap();
        assert_eq!(episodes[0].chapter_id, "a");
        assert_eq!(episodes[1].chapter_id, "b");
    }

    #[test]
    fn test_parse_episodes_object_without_list() {
        let episodes = parse_episodes(r#"{"message": "not found"}"#).unwrap();
        assert!(episodes.is_empty());
    }

    #[test]
    fn test_parse_episodes_stable_order_for_equal_index() {
        let body = r#"[
            {"chapterId": "x"},
            {"chapterId": "y"}
        ]"#;
        let episodes = parse_episodes(body).unwrap();
        assert_eq!(episodes[0].chapter_id, "x");
        assert_eq!(episodes[1].chapter_id, "y");
    }

    #[test]
    fn test_parse_detail_bare_and_wrapped() {
        let bare = parse_detail(r#"{"bookId": "9", "bookName": "Bare", "chapterCount": 40}"#).unwrap();
        assert_eq!(bare.book_name, "Bare");
        assert_eq!(bare.chapter_count, 40);

        let wrapped = parse_detail(r#"{"data": {"bookId": "9", "bookName": "Wrapped"}}"#).unwrap();
        assert_eq!(wrapped.book_name, "Wrapped");
    }

    #[test]
    fn test_parse_detail_missing_id() {
        assert!(matches!(parse_detail("{}"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_parse_popular_search() {
        let terms = parse_popular_search(r#"["CEO", " Revenge ", "", {"keyword": "Mafia"}, 3]"#).unwrap();
        assert_eq!(terms, vec!["CEO", "Revenge", "Mafia"]);
    }

    #[test]
    fn test_home_feed_lookup() {
        let feed = HomeFeed {
            sections: vec![FeedSection {
                section: Section::Latest,
                dramas: vec![],
                error: Some("boom".to_string()),
            }],
        };
        assert!(feed.get(Section::Latest).unwrap().error.is_some());
        assert!(feed.get(Section::ForYou).is_none());
    }

    #[test]
    fn test_parse_dramas_first_array_field_wins() {
        let body = r#"{"data": [{"bookId": "1"}], "list": [{"bookId": "2"}, {"bookId": "3"}]}"#;
        let dramas = parse_dramas(body).unwrap();
        assert_eq!(dramas.len(), 1);
        assert_eq!(dramas[0].book_id, "1");

        let body = r#"{"data": null, "list": [{"bookId": "2"}]}"#;
        assert_eq!(parse_dramas(body).unwrap()[0].book_id, "2");
    }

    fn dramas(count: usize) -> Vec<Drama> {
        (0..count)
            .map(|i| Drama {
                book_id: i.to_string(),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_collect_feed_isolates_failed_section() {
        let feed = collect_feed([
            Ok(dramas(3)),
            Err(AppError::Network("timeout".to_string())),
            Ok(dramas(1)),
            Ok(Vec::new()),
        ]);

        assert_eq!(feed.sections.len(), 4);
        let for_you = feed.get(Section::ForYou).unwrap();
        assert_eq!(for_you.dramas.len(), 3);
        assert!(for_you.error.is_none());

        let trending = feed.get(Section::Trending).unwrap();
        assert!(trending.dramas.is_empty());
        assert_eq!(trending.error.as_deref(), Some("Network error: timeout"));

        assert_eq!(feed.get(Section::DubIndo).unwrap().dramas.len(), 1);
        assert!(feed.get(Section::Latest).unwrap().error.is_none());
    }

    #[test]
    fn test_collect_feed_caps_sections() {
        let feed = collect_feed([
            Ok(dramas(HOME_SECTION_LIMIT + 5)),
            Ok(dramas(HOME_SECTION_LIMIT)),
            Ok(dramas(2)),
            Ok(dramas(40)),
        ]);

        let for_you = &feed.get(Section::ForYou).unwrap().dramas;
        assert_eq!(for_you.len(), HOME_SECTION_LIMIT);
        assert_eq!(for_you[0].book_id, "0");
        assert_eq!(for_you[HOME_SECTION_LIMIT - 1].book_id, "11");
        assert_eq!(feed.get(Section::Trending).unwrap().dramas.len(), HOME_SECTION_LIMIT);
        assert_eq!(feed.get(Section::DubIndo).unwrap().dramas.len(), 2);
        assert_eq!(feed.get(Section::Latest).unwrap().dramas.len(), HOME_SECTION_LIMIT);
    }

    #[tokio::test]
    async fn test_fetch_all_episodes_unreachable_host_is_empty() {
        let api = DramaApi::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let episodes = api.fetch_all_episodes("41000102882").await;
        assert!(episodes.is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let result = api().search("   ").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
