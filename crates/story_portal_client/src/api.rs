//! crates/story_portal_client/src/api.rs
//!
//! HTTP client for the public content routes, plus the mapping from each
//! route to its path and cache key.

use serde_json::Value;

use crate::cache::CacheKey;

/// Errors surfaced to the rendering layer by the data hooks.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The content API answered with a non-2xx status.
    #[error("{message} ({status})")]
    Status { status: u16, message: String },

    /// The body did not match the expected view model.
    #[error("Unexpected response shape: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// One public content route with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Themes,
    Series,
    Stories,
    Story(String),
    StoryChapters(String),
    Chapter {
        story_slug: String,
        chapter_number: i64,
    },
    News,
    NewsItem(String),
    Diary,
    DiaryEntry(String),
    Page(String),
}

impl Endpoint {
    /// Request path with every parameter percent-encoded.
    pub fn path(&self) -> String {
        use urlencoding::encode;
        match self {
            Endpoint::Themes => "/api/themes".to_string(),
            Endpoint::Series => "/api/series".to_string(),
            Endpoint::Stories => "/api/stories".to_string(),
            Endpoint::Story(slug) => format!("/api/stories/{}", encode(slug)),
            Endpoint::StoryChapters(slug) => format!("/api/stories/{}/chapters", encode(slug)),
            Endpoint::Chapter {
                story_slug,
                chapter_number,
            } => format!(
                "/api/stories/{}/chapters/{}",
                encode(story_slug),
                chapter_number
            ),
            Endpoint::News => "/api/news".to_string(),
            Endpoint::NewsItem(slug) => format!("/api/news/{}", encode(slug)),
            Endpoint::Diary => "/api/diary".to_string(),
            Endpoint::DiaryEntry(slug) => format!("/api/diary/{}", encode(slug)),
            Endpoint::Page(key) => format!("/api/pages/{}", encode(key)),
        }
    }

    /// Deterministic cache key: resource name plus parameters.
    pub fn cache_key(&self) -> CacheKey {
        let key = match self {
            Endpoint::Themes => "themes".to_string(),
            Endpoint::Series => "series".to_string(),
            Endpoint::Stories => "stories".to_string(),
            Endpoint::Story(slug) => format!("story:{slug}"),
            Endpoint::StoryChapters(slug) => format!("chapters:{slug}"),
            Endpoint::Chapter {
                story_slug,
                chapter_number,
            } => format!("chapter:{story_slug}:{chapter_number}"),
            Endpoint::News => "news".to_string(),
            Endpoint::NewsItem(slug) => format!("news:{slug}"),
            Endpoint::Diary => "diary".to_string(),
            Endpoint::DiaryEntry(slug) => format!("diary:{slug}"),
            Endpoint::Page(key) => format!("page:{key}"),
        };
        CacheKey::new(key)
    }
}

/// Thin client for the content API. Cheap to clone.
#[derive(Clone)]
pub struct ContentApi {
    client: reqwest::Client,
    base_url: String,
}

impl ContentApi {
    /// * `base_url` - Origin of the content API, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// GET an endpoint and return its JSON body.
    pub async fn get(&self, endpoint: &Endpoint) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: status_message(&text),
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

/// Prefers the server's `statusMessage`, falling back to the raw body.
fn status_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("statusMessage").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
