//! crates/story_portal_core/src/domain.rs
//!
//! Read-side view models for the content collections.
//! Every struct here is a projection of a backend record: list shapes carry
//! excerpts, detail shapes carry full content. The backend owns the records.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// A backend identifier. Collections use either integer keys or UUID strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ItemId {
    Integer(i64),
    Text(String),
}

/// Publication workflow state shared by every collection except themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    Draft,
    Published,
}

/// Whether a decoded row may be shown on the public site.
pub trait Visibility {
    fn is_public(&self) -> bool;
}

fn published(status: Option<PublicationStatus>) -> bool {
    status == Some(PublicationStatus::Published)
}

/// Directus `timestamp` fields come back without an offset; those are UTC.
/// Unparseable values decode as absent instead of failing the row.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    Ok(NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
        .map(|naive| naive.and_utc()))
}

//=========================================================================================
// Themes
//=========================================================================================

/// Themes have no draft workflow; only the active flag gates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Theme {
    pub id: ItemId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub accent_color_hex: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub rune_icon: Option<serde_json::Value>,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub is_active: bool,
}

impl Visibility for Theme {
    fn is_public(&self) -> bool {
        self.is_active
    }
}

//=========================================================================================
// Series & Stories
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Series {
    pub id: ItemId,
    pub title: String,
    pub slug: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub cover_image: Option<ItemId>,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<PublicationStatus>,
}

impl Visibility for Series {
    fn is_public(&self) -> bool {
        published(self.status)
    }
}

/// A story. `theme` and `series` are foreign identifiers, never expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Story {
    pub id: ItemId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cover_image: Option<ItemId>,
    #[serde(default)]
    pub theme: Option<ItemId>,
    #[serde(default)]
    pub series: Option<ItemId>,
    #[serde(default)]
    pub status: Option<PublicationStatus>,
}

impl Visibility for Story {
    fn is_public(&self) -> bool {
        published(self.status)
    }
}

//=========================================================================================
// Chapters
//=========================================================================================

/// Chapter as it appears in a story's table of contents. Never carries content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChapterSummary {
    pub id: ItemId,
    #[serde(default)]
    pub story: Option<ItemId>,
    pub chapter_number: i64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<PublicationStatus>,
}

impl Visibility for ChapterSummary {
    fn is_public(&self) -> bool {
        published(self.status)
    }
}

/// A single chapter with its rich HTML body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Chapter {
    pub id: ItemId,
    #[serde(default)]
    pub story: Option<ItemId>,
    pub chapter_number: i64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<PublicationStatus>,
}

impl Visibility for Chapter {
    fn is_public(&self) -> bool {
        published(self.status)
    }
}

//=========================================================================================
// News, Diary, Pages
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewsItem {
    pub id: ItemId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<PublicationStatus>,
}

impl Visibility for NewsItem {
    fn is_public(&self) -> bool {
        published(self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiaryEntry {
    pub id: ItemId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub mood_tag: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<PublicationStatus>,
}

impl Visibility for DiaryEntry {
    fn is_public(&self) -> bool {
        published(self.status)
    }
}

/// A standalone page, addressed by `key` rather than slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Page {
    pub id: ItemId,
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<PublicationStatus>,
}

impl Visibility for Page {
    fn is_public(&self) -> bool {
        published(self.status)
    }
}
