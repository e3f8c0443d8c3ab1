//! crates/story_portal_core/src/catalog.rs
//!
//! The read operations the public site is built from. Each operation turns
//! its identifiers into one backend query (filter, projection, sort, limit),
//! decodes the rows into view models, and drops anything not publicly visible.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::domain::{
    Chapter, ChapterSummary, DiaryEntry, NewsItem, Page, Series, Story, Theme, Visibility,
};
use crate::ports::{ContentBackend, PortError};
use crate::query::{active_filter, published_filter, ItemQuery};

//=========================================================================================
// Errors
//=========================================================================================

/// Outcome of a failed catalog read.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Missing or malformed identifier supplied by the caller.
    #[error("{0}")]
    Validation(String),
    /// The query was well formed but matched no visible row.
    #[error("{0}")]
    NotFound(String),
    /// A backend failure, already attributed to the resource being fetched.
    #[error("Failed to fetch {resource} from Directus")]
    Upstream {
        resource: &'static str,
        detail: String,
    },
    /// A backend failure not yet attributed to a resource.
    #[error(transparent)]
    Port(#[from] PortError),
}

impl ContentError {
    /// The HTTP status this error should surface as.
    pub fn status_code(&self) -> u16 {
        match self {
            ContentError::Validation(_) => 400,
            ContentError::NotFound(_) => 404,
            ContentError::Upstream { .. } | ContentError::Port(_) => 500,
        }
    }

    /// Attributes an unstructured failure to `resource`.
    ///
    /// Errors that already carry a status pass through untouched, so applying
    /// this more than once never double-wraps.
    pub fn attribute_to(self, resource: &'static str) -> Self {
        match self {
            ContentError::Port(err) => ContentError::Upstream {
                resource,
                detail: err.to_string(),
            },
            other => other,
        }
    }
}

pub type ContentResult<T> = Result<T, ContentError>;

//=========================================================================================
// Projections
//=========================================================================================

const THEME_FIELDS: &[&str] = &[
    "id",
    "name",
    "slug",
    "description",
    "accent_color_hex",
    "rune_icon",
    "sort_order",
    "is_active",
];

const SERIES_FIELDS: &[&str] = &[
    "id",
    "title",
    "slug",
    "type",
    "synopsis",
    "cover_image",
    "sort_order",
    "date_created",
    "date_updated",
    "status",
];

const STORY_FIELDS: &[&str] = &[
    "id",
    "title",
    "slug",
    "synopsis",
    "featured",
    "sort_order",
    "date_created",
    "date_updated",
    "cover_image",
    "theme",
    "series",
    "status",
];

const CHAPTER_SUMMARY_FIELDS: &[&str] = &[
    "id",
    "story",
    "chapter_number",
    "title",
    "slug",
    "excerpt",
    "date_created",
    "date_updated",
    "status",
];

const CHAPTER_FIELDS: &[&str] = &[
    "id",
    "story",
    "chapter_number",
    "title",
    "slug",
    "content",
    "excerpt",
    "date_created",
    "date_updated",
    "status",
];

const NEWS_FIELDS: &[&str] = &[
    "id",
    "title",
    "slug",
    "content",
    "featured",
    "date_created",
    "date_updated",
    "status",
];

const DIARY_LIST_FIELDS: &[&str] = &[
    "id",
    "title",
    "slug",
    "content",
    "featured",
    "date_created",
    "status",
];

const DIARY_ENTRY_FIELDS: &[&str] = &[
    "id",
    "title",
    "slug",
    "content",
    "featured",
    "mood_tag",
    "date_created",
    "date_updated",
    "status",
];

const PAGE_FIELDS: &[&str] = &[
    "id",
    "key",
    "title",
    "content",
    "status",
    "date_created",
    "date_updated",
];

/// Fixed size of the reverse-chronological feeds.
pub const FEED_LIMIT: u32 = 10;

//=========================================================================================
// The Catalog
//=========================================================================================

/// Read-only access to the published content of every collection.
#[derive(Clone)]
pub struct ContentCatalog {
    backend: Arc<dyn ContentBackend>,
}

impl ContentCatalog {
    pub fn new(backend: Arc<dyn ContentBackend>) -> Self {
        Self { backend }
    }

    /// Active themes ordered by `sort_order`.
    pub async fn themes(&self) -> ContentResult<Vec<Theme>> {
        let query = active_filter().sort("sort_order").fields(THEME_FIELDS);
        self.list("themes", query).await
    }

    /// Published series ordered by `sort_order`.
    pub async fn series(&self) -> ContentResult<Vec<Series>> {
        let query = published_filter()
            .sort("sort_order")
            .fields(SERIES_FIELDS);
        self.list("series", query).await
    }

    /// Published stories ordered by `sort_order`.
    pub async fn stories(&self) -> ContentResult<Vec<Story>> {
        let query = published_filter().sort("sort_order").fields(STORY_FIELDS);
        self.list("stories", query).await
    }

    pub async fn story(&self, slug: &str) -> ContentResult<Story> {
        let slug = required(slug, "Missing story slug")?;
        let query = published_filter()
            .filter_eq(&["slug"], slug)
            .limit(1)
            .fields(STORY_FIELDS);
        self.first("stories", query, "Story not found").await
    }

    /// Table of contents for a story, ascending by chapter number.
    ///
    /// An unknown story and a story without published chapters both yield an
    /// empty list.
    pub async fn story_chapters(&self, story_slug: &str) -> ContentResult<Vec<ChapterSummary>> {
        let story_slug = required(story_slug, "Missing story slug")?;
        let query = published_filter()
            .filter_eq(&["story", "slug"], story_slug)
            .sort("chapter_number")
            .fields(CHAPTER_SUMMARY_FIELDS);
        let mut chapters: Vec<ChapterSummary> = self.list("chapters", query).await?;
        chapters.sort_by_key(|c| c.chapter_number);
        Ok(chapters)
    }

    /// A single chapter by story slug and the raw chapter number path segment.
    pub async fn chapter(&self, story_slug: &str, number: &str) -> ContentResult<Chapter> {
        let story_slug = required(story_slug, "Missing story slug or chapter number")?;
        let number = required(number, "Missing story slug or chapter number")?;
        let chapter_number = parse_chapter_number(number)?;

        let query = published_filter()
            .filter_eq(&["story", "slug"], story_slug)
            .filter_eq(&["chapter_number"], chapter_number)
            .limit(1)
            .fields(CHAPTER_FIELDS);
        self.first("chapters", query, "Chapter not found").await
    }

    /// The latest published news items, newest first.
    pub async fn news(&self) -> ContentResult<Vec<NewsItem>> {
        let query = published_filter()
            .sort("-date_created")
            .limit(FEED_LIMIT)
            .fields(NEWS_FIELDS);
        self.list("news", query).await
    }

    pub async fn news_item(&self, slug: &str) -> ContentResult<NewsItem> {
        let slug = required(slug, "Missing news slug")?;
        let query = published_filter()
            .filter_eq(&["slug"], slug)
            .limit(1)
            .fields(NEWS_FIELDS);
        self.first("news", query, "News item not found").await
    }

    /// The latest published diary entries, newest first.
    pub async fn diary(&self) -> ContentResult<Vec<DiaryEntry>> {
        let query = published_filter()
            .sort("-date_created")
            .limit(FEED_LIMIT)
            .fields(DIARY_LIST_FIELDS);
        self.list("diary_entries", query).await
    }

    pub async fn diary_entry(&self, slug: &str) -> ContentResult<DiaryEntry> {
        let slug = required(slug, "Missing diary slug")?;
        let query = published_filter()
            .filter_eq(&["slug"], slug)
            .limit(1)
            .fields(DIARY_ENTRY_FIELDS);
        self.first("diary_entries", query, "Diary entry not found").await
    }

    pub async fn page(&self, key: &str) -> ContentResult<Page> {
        let key = required(key, "Missing page key")?;
        let query = published_filter()
            .filter_eq(&["key"], key)
            .limit(1)
            .fields(PAGE_FIELDS);
        self.first("pages", query, "Page not found").await
    }

    // ---- private helpers ----

    async fn list<T>(&self, collection: &str, query: ItemQuery) -> ContentResult<Vec<T>>
    where
        T: DeserializeOwned + Visibility,
    {
        let path = format!("/items/{collection}");
        let body = self.backend.fetch(&path, &query).await?;
        let rows = decode_rows::<T>(collection, body)?;

        let total = rows.len();
        let visible: Vec<T> = rows.into_iter().filter(|row| row.is_public()).collect();
        if visible.len() != total {
            tracing::warn!(
                collection,
                dropped = total - visible.len(),
                "Backend returned rows that are not publicly visible"
            );
        }
        Ok(visible)
    }

    async fn first<T>(
        &self,
        collection: &str,
        query: ItemQuery,
        not_found: &str,
    ) -> ContentResult<T>
    where
        T: DeserializeOwned + Visibility,
    {
        self.list(collection, query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ContentError::NotFound(not_found.to_string()))
    }
}

/// Extracts the `data` array of a collection response and decodes it row by
/// row. A row that does not fit the view model is skipped with a warning;
/// only a body that is not a row list at all is an error.
fn decode_rows<T: DeserializeOwned>(
    collection: &str,
    mut body: serde_json::Value,
) -> Result<Vec<T>, PortError> {
    let rows = match body.get_mut("data").map(serde_json::Value::take) {
        None | Some(serde_json::Value::Null) => return Ok(Vec::new()),
        Some(serde_json::Value::Array(rows)) => rows,
        Some(other) => {
            return Err(PortError::Decode(format!(
                "expected `data` to be an array, got {other}"
            )))
        }
    };

    let mut decoded = Vec::with_capacity(rows.len());
    for row in rows {
        let id = row.get("id").cloned().unwrap_or(serde_json::Value::Null);
        match serde_json::from_value::<T>(row) {
            Ok(item) => decoded.push(item),
            Err(e) => tracing::warn!(collection, %id, error = %e, "Skipping undecodable row"),
        }
    }
    Ok(decoded)
}

/// Rejects blank identifiers. The value itself is passed on untouched, so
/// padded slugs never match a stored one.
fn required<'a>(value: &'a str, message: &str) -> ContentResult<&'a str> {
    if value.trim().is_empty() {
        return Err(ContentError::Validation(message.to_string()));
    }
    Ok(value)
}

/// Parses a chapter number path segment. Anything that is not a finite
/// number is rejected rather than coerced.
pub fn parse_chapter_number(raw: &str) -> ContentResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ContentError::Validation("Invalid chapter number".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PublicationStatus;
    use crate::memory::InMemoryBackend;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    fn seeded() -> InMemoryBackend {
        InMemoryBackend::new()
            .with_relation("chapters", "story", "stories")
            .with_items(
                "themes",
                vec![
                    json!({"id": 1, "name": "Ember", "slug": "ember", "sort_order": 2, "is_active": true}),
                    json!({"id": 2, "name": "Frost", "slug": "frost", "sort_order": 1, "is_active": true}),
                    json!({"id": 3, "name": "Ash", "slug": "ash", "sort_order": 0, "is_active": false}),
                ],
            )
            .with_items(
                "stories",
                vec![
                    json!({"id": 10, "title": "The Archivist's Lantern", "slug": "the-archivists-lantern",
                           "synopsis": "A keeper of records.", "sort_order": 1, "theme": 1, "series": 4,
                           "status": "published"}),
                    json!({"id": 11, "title": "Unfinished", "slug": "unfinished", "sort_order": 0,
                           "status": "draft"}),
                ],
            )
            .with_items(
                "chapters",
                vec![
                    json!({"id": 102, "story": 10, "chapter_number": 2, "title": "Two", "slug": "lantern-2",
                           "excerpt": "second", "content": "<p>2</p>", "status": "published"}),
                    json!({"id": 101, "story": 10, "chapter_number": 1, "title": "One", "slug": "lantern-1",
                           "excerpt": "first", "content": "<p>1</p>", "status": "published"}),
                    json!({"id": 103, "story": 10, "chapter_number": 3, "title": "Three", "slug": "lantern-3",
                           "excerpt": "third", "content": "<p>3</p>", "status": "draft"}),
                ],
            )
            .with_items(
                "news",
                vec![
                    json!({"id": 1, "title": "Old", "slug": "old", "date_created": "2024-01-01T00:00:00Z", "status": "published"}),
                    json!({"id": 2, "title": "New", "slug": "new", "date_created": "2024-06-01T00:00:00Z", "status": "published"}),
                    json!({"id": 3, "title": "Hidden", "slug": "hidden", "date_created": "2024-07-01T00:00:00Z", "status": "draft"}),
                ],
            )
            .with_items(
                "pages",
                vec![
                    json!({"id": 1, "key": "about", "title": "About", "content": "<p>hi</p>", "status": "published"}),
                    json!({"id": 2, "key": "secret", "title": "Secret", "status": "draft"}),
                ],
            )
    }

    fn catalog(backend: InMemoryBackend) -> ContentCatalog {
        ContentCatalog::new(Arc::new(backend))
    }

    #[tokio::test]
    async fn themes_are_active_and_sorted() {
        let themes = catalog(seeded()).themes().await.unwrap();
        let slugs: Vec<_> = themes.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["frost", "ember"]);
        assert!(themes.iter().all(|t| t.is_active));
    }

    #[tokio::test]
    async fn stories_list_only_published() {
        let stories = catalog(seeded()).stories().await.unwrap();
        assert_eq!(stories.len(), 1);
        assert!(stories
            .iter()
            .all(|s| s.status == Some(PublicationStatus::Published)));
    }

    #[tokio::test]
    async fn story_by_slug_returns_detail() {
        let story = catalog(seeded())
            .story("the-archivists-lantern")
            .await
            .unwrap();
        assert_eq!(story.slug, "the-archivists-lantern");
        assert_eq!(story.synopsis.as_deref(), Some("A keeper of records."));
        assert!(story.theme.is_some());
        assert!(story.series.is_some());
    }

    #[tokio::test]
    async fn draft_story_and_missing_story_are_both_not_found() {
        let c = catalog(seeded());
        let draft = c.story("unfinished").await.unwrap_err();
        let missing = c.story("nope").await.unwrap_err();
        assert_eq!(draft.status_code(), 404);
        assert_eq!(missing.status_code(), 404);
        assert_eq!(draft.to_string(), missing.to_string());
    }

    #[tokio::test]
    async fn blank_slug_is_a_validation_error() {
        let err = catalog(seeded()).news_item("  ").await.unwrap_err();
        assert!(matches!(err, ContentError::Validation(ref m) if m == "Missing news slug"));
    }

    #[tokio::test]
    async fn chapters_are_ascending_and_exclude_drafts() {
        let chapters = catalog(seeded())
            .story_chapters("the-archivists-lantern")
            .await
            .unwrap();
        let numbers: Vec<_> = chapters.iter().map(|c| c.chapter_number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[tokio::test]
    async fn chapters_of_unknown_story_is_empty() {
        let chapters = catalog(seeded()).story_chapters("nope").await.unwrap();
        assert!(chapters.is_empty());
    }

    #[tokio::test]
    async fn chapter_by_number_carries_content() {
        let chapter = catalog(seeded())
            .chapter("the-archivists-lantern", "2")
            .await
            .unwrap();
        assert_eq!(chapter.title, "Two");
        assert_eq!(chapter.content.as_deref(), Some("<p>2</p>"));
    }

    #[tokio::test]
    async fn draft_chapter_is_not_found() {
        let err = catalog(seeded())
            .chapter("the-archivists-lantern", "3")
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound(ref m) if m == "Chapter not found"));
    }

    #[tokio::test]
    async fn non_numeric_chapter_is_rejected() {
        for raw in ["abc", "NaN", "inf", ""] {
            let err = catalog(seeded())
                .chapter("the-archivists-lantern", raw)
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), 400, "input {raw:?}");
        }
    }

    #[tokio::test]
    async fn news_is_newest_first_and_published() {
        let news = catalog(seeded()).news().await.unwrap();
        let slugs: Vec<_> = news.iter().map(|n| n.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn page_lookup_enforces_publication() {
        let c = catalog(seeded());
        assert_eq!(c.page("about").await.unwrap().title, "About");
        assert_eq!(c.page("secret").await.unwrap_err().status_code(), 404);
    }

    /// Records the query and echoes back whatever rows it was given,
    /// ignoring filters the way a misconfigured backend would.
    struct EchoBackend {
        rows: serde_json::Value,
        seen: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    #[async_trait]
    impl ContentBackend for EchoBackend {
        async fn fetch(
            &self,
            path: &str,
            query: &ItemQuery,
        ) -> crate::ports::PortResult<serde_json::Value> {
            self.seen
                .lock()
                .unwrap()
                .push((path.to_string(), query.normalized()));
            Ok(json!({ "data": self.rows.clone() }))
        }
    }

    #[tokio::test]
    async fn chapter_query_uses_relation_filter_and_normalized_number() {
        let backend = Arc::new(EchoBackend {
            rows: json!([]),
            seen: Mutex::new(Vec::new()),
        });
        let c = ContentCatalog::new(backend.clone());
        let _ = c.chapter("lantern", "3").await;

        let seen = backend.seen.lock().unwrap();
        let (path, params) = &seen[0];
        assert_eq!(path, "/items/chapters");
        assert!(params.contains(&("filter[story][slug][_eq]".into(), "lantern".into())));
        assert!(params.contains(&("filter[chapter_number][_eq]".into(), "3".into())));
        assert!(params.contains(&("filter[status][_eq]".into(), "published".into())));
        assert!(params.contains(&("limit".into(), "1".into())));
    }

    #[tokio::test]
    async fn rows_leaking_past_the_filter_are_dropped() {
        let backend = Arc::new(EchoBackend {
            rows: json!([
                {"id": 1, "title": "Draft", "slug": "draft", "status": "draft"},
                {"id": 2, "title": "Live", "slug": "live", "status": "published"}
            ]),
            seen: Mutex::new(Vec::new()),
        });
        let c = ContentCatalog::new(backend);
        let series = c.series().await.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].slug, "live");
    }

    #[tokio::test]
    async fn one_undecodable_row_does_not_fail_the_list() {
        let backend = Arc::new(EchoBackend {
            rows: json!([
                {"id": 1, "title": null, "slug": "untitled", "status": "published"},
                {"unexpected": true},
                {"id": 2, "title": "Lantern", "slug": "lantern", "status": "published"}
            ]),
            seen: Mutex::new(Vec::new()),
        });
        let stories = ContentCatalog::new(backend).stories().await.unwrap();
        let slugs: Vec<_> = stories.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, vec!["lantern"]);
    }

    #[tokio::test]
    async fn news_with_offsetless_timestamps_still_lists() {
        let backend = Arc::new(EchoBackend {
            rows: json!([
                {"id": 1, "title": "Launch", "slug": "launch",
                 "date_created": "2024-01-10T09:00:00", "status": "published"}
            ]),
            seen: Mutex::new(Vec::new()),
        });
        let news = ContentCatalog::new(backend).news().await.unwrap();
        assert_eq!(news.len(), 1);
        assert!(news[0].date_created.is_some());
    }

    #[tokio::test]
    async fn detail_lookup_on_an_undecodable_row_is_not_found() {
        let backend = Arc::new(EchoBackend {
            rows: json!([{"id": 1, "title": null, "slug": "launch", "status": "published"}]),
            seen: Mutex::new(Vec::new()),
        });
        let err = ContentCatalog::new(backend)
            .news_item("launch")
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound(ref m) if m == "News item not found"));
    }

    #[tokio::test]
    async fn non_array_data_is_a_decode_error() {
        let backend = Arc::new(EchoBackend {
            rows: json!({"not": "rows"}),
            seen: Mutex::new(Vec::new()),
        });
        let err = ContentCatalog::new(backend).stories().await.unwrap_err();
        assert!(matches!(err, ContentError::Port(PortError::Decode(_))));
    }

    #[tokio::test]
    async fn padded_slug_is_sent_verbatim() {
        let backend = Arc::new(EchoBackend {
            rows: json!([]),
            seen: Mutex::new(Vec::new()),
        });
        let c = ContentCatalog::new(backend.clone());
        let err = c.story(" the-archivists-lantern").await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let seen = backend.seen.lock().unwrap();
        assert!(seen[0]
            .1
            .contains(&("filter[slug][_eq]".into(), " the-archivists-lantern".into())));
    }

    #[tokio::test]
    async fn padded_slug_does_not_resolve_a_stored_story() {
        let err = catalog(seeded())
            .story(" the-archivists-lantern")
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::NotFound(ref m) if m == "Story not found"));
    }

    #[test]
    fn attribution_wraps_port_errors_once() {
        let err = ContentError::Port(PortError::Transport("connection refused".into()))
            .attribute_to("themes");
        assert_eq!(err.to_string(), "Failed to fetch themes from Directus");
        let twice = err.attribute_to("stories");
        assert!(matches!(
            twice,
            ContentError::Upstream { resource: "themes", ref detail }
                if detail.contains("connection refused")
        ));
    }

    #[test]
    fn attribution_passes_structured_errors_through() {
        let err = ContentError::NotFound("Page not found".into()).attribute_to("page");
        assert!(matches!(err, ContentError::NotFound(_)));
    }
}
