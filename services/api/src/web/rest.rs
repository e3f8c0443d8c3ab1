//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the public content routes and the master
//! definition for the OpenAPI specification.

use crate::error::{ErrorBody, ErrorDetail};
use crate::web::guard::guard;
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;
use story_portal_core::{
    Chapter, ChapterSummary, DiaryEntry, ItemId, NewsItem, Page, PublicationStatus, Series, Story,
    Theme,
};
use utoipa::{OpenApi, ToSchema};

use crate::error::ApiError;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        list_themes_handler,
        list_series_handler,
        list_stories_handler,
        get_story_handler,
        list_story_chapters_handler,
        get_chapter_handler,
        list_news_handler,
        get_news_item_handler,
        list_diary_handler,
        get_diary_entry_handler,
        get_page_handler,
    ),
    components(
        schemas(
            HealthResponse, ErrorBody, ErrorDetail, ItemId, PublicationStatus, Theme, Series,
            Story, ChapterSummary, Chapter, NewsItem, DiaryEntry, Page
        )
    ),
    tags(
        (name = "Story Portal API", description = "Read-only published content for the storytelling site.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    version: String,
    backend_configured: bool,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Liveness probe. Reports whether the content backend is configured.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend_configured: app_state.config.directus_url.is_some(),
    })
}

/// List active themes ordered by `sort_order`.
#[utoipa::path(
    get,
    path = "/api/themes",
    responses(
        (status = 200, description = "Active themes", body = Vec<Theme>),
        (status = 500, description = "Content backend failure", body = ErrorBody)
    )
)]
pub async fn list_themes_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Theme>>, ApiError> {
    guard("themes", app_state.catalog.themes()).await
}

/// List published series ordered by `sort_order`.
#[utoipa::path(
    get,
    path = "/api/series",
    responses(
        (status = 200, description = "Published series", body = Vec<Series>),
        (status = 500, description = "Content backend failure", body = ErrorBody)
    )
)]
pub async fn list_series_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Series>>, ApiError> {
    guard("series", app_state.catalog.series()).await
}

/// List published stories ordered by `sort_order`.
#[utoipa::path(
    get,
    path = "/api/stories",
    responses(
        (status = 200, description = "Published stories", body = Vec<Story>),
        (status = 500, description = "Content backend failure", body = ErrorBody)
    )
)]
pub async fn list_stories_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Story>>, ApiError> {
    guard("stories", app_state.catalog.stories()).await
}

/// Fetch a single published story by slug.
#[utoipa::path(
    get,
    path = "/api/stories/{slug}",
    params(("slug" = String, Path, description = "Story slug")),
    responses(
        (status = 200, description = "The story", body = Story),
        (status = 400, description = "Missing slug", body = ErrorBody),
        (status = 404, description = "No published story with this slug", body = ErrorBody),
        (status = 500, description = "Content backend failure", body = ErrorBody)
    )
)]
pub async fn get_story_handler(
    State(app_state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Story>, ApiError> {
    guard("story", app_state.catalog.story(&slug)).await
}

/// List a story's published chapters, ascending by chapter number.
#[utoipa::path(
    get,
    path = "/api/stories/{slug}/chapters",
    params(("slug" = String, Path, description = "Story slug")),
    responses(
        (status = 200, description = "Chapter summaries (excerpts only)", body = Vec<ChapterSummary>),
        (status = 400, description = "Missing slug", body = ErrorBody),
        (status = 500, description = "Content backend failure", body = ErrorBody)
    )
)]
pub async fn list_story_chapters_handler(
    State(app_state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<ChapterSummary>>, ApiError> {
    guard("chapters", app_state.catalog.story_chapters(&slug)).await
}

/// Fetch a single published chapter with its full content.
#[utoipa::path(
    get,
    path = "/api/stories/{slug}/chapters/{number}",
    params(
        ("slug" = String, Path, description = "Story slug"),
        ("number" = String, Path, description = "Chapter number, must be a finite number")
    ),
    responses(
        (status = 200, description = "The chapter", body = Chapter),
        (status = 400, description = "Missing slug or invalid chapter number", body = ErrorBody),
        (status = 404, description = "No published chapter with this number", body = ErrorBody),
        (status = 500, description = "Content backend failure", body = ErrorBody)
    )
)]
pub async fn get_chapter_handler(
    State(app_state): State<Arc<AppState>>,
    Path((slug, number)): Path<(String, String)>,
) -> Result<Json<Chapter>, ApiError> {
    guard("chapter", app_state.catalog.chapter(&slug, &number)).await
}

/// The ten most recent published news items.
#[utoipa::path(
    get,
    path = "/api/news",
    responses(
        (status = 200, description = "Published news, newest first", body = Vec<NewsItem>),
        (status = 500, description = "Content backend failure", body = ErrorBody)
    )
)]
pub async fn list_news_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<NewsItem>>, ApiError> {
    guard("news", app_state.catalog.news()).await
}

#[utoipa::path(
    get,
    path = "/api/news/{slug}",
    params(("slug" = String, Path, description = "News item slug")),
    responses(
        (status = 200, description = "The news item", body = NewsItem),
        (status = 400, description = "Missing slug", body = ErrorBody),
        (status = 404, description = "No published news item with this slug", body = ErrorBody),
        (status = 500, description = "Content backend failure", body = ErrorBody)
    )
)]
pub async fn get_news_item_handler(
    State(app_state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<NewsItem>, ApiError> {
    guard("news item", app_state.catalog.news_item(&slug)).await
}

/// The ten most recent published diary entries.
#[utoipa::path(
    get,
    path = "/api/diary",
    responses(
        (status = 200, description = "Published diary entries, newest first", body = Vec<DiaryEntry>),
        (status = 500, description = "Content backend failure", body = ErrorBody)
    )
)]
pub async fn list_diary_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<DiaryEntry>>, ApiError> {
    guard("diary entries", app_state.catalog.diary()).await
}

#[utoipa::path(
    get,
    path = "/api/diary/{slug}",
    params(("slug" = String, Path, description = "Diary entry slug")),
    responses(
        (status = 200, description = "The diary entry", body = DiaryEntry),
        (status = 400, description = "Missing slug", body = ErrorBody),
        (status = 404, description = "No published diary entry with this slug", body = ErrorBody),
        (status = 500, description = "Content backend failure", body = ErrorBody)
    )
)]
pub async fn get_diary_entry_handler(
    State(app_state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<DiaryEntry>, ApiError> {
    guard("diary entry", app_state.catalog.diary_entry(&slug)).await
}

/// Fetch a published standalone page by key.
#[utoipa::path(
    get,
    path = "/api/pages/{key}",
    params(("key" = String, Path, description = "Page key")),
    responses(
        (status = 200, description = "The page", body = Page),
        (status = 400, description = "Missing key", body = ErrorBody),
        (status = 404, description = "No published page with this key", body = ErrorBody),
        (status = 500, description = "Content backend failure", body = ErrorBody)
    )
)]
pub async fn get_page_handler(
    State(app_state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<Page>, ApiError> {
    guard("page", app_state.catalog.page(&key)).await
}
