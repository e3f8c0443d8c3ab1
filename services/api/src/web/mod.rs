pub mod guard;
pub mod rest;
pub mod state;

use std::sync::Arc;

use axum::http::{header::ACCEPT, HeaderValue, Method};
use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiError;
use rest::{
    get_chapter_handler, get_diary_entry_handler, get_news_item_handler, get_page_handler,
    get_story_handler, health_handler, list_diary_handler, list_news_handler,
    list_series_handler, list_stories_handler, list_story_chapters_handler, list_themes_handler,
    ApiDoc,
};
use state::AppState;

/// The public content routes, without middleware.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/themes", get(list_themes_handler))
        .route("/api/series", get(list_series_handler))
        .route("/api/stories", get(list_stories_handler))
        .route("/api/stories/{slug}", get(get_story_handler))
        .route("/api/stories/{slug}/chapters", get(list_story_chapters_handler))
        .route("/api/stories/{slug}/chapters/{number}", get(get_chapter_handler))
        .route("/api/news", get(list_news_handler))
        .route("/api/news/{slug}", get(get_news_item_handler))
        .route("/api/diary", get(list_diary_handler))
        .route("/api/diary/{slug}", get(get_diary_entry_handler))
        .route("/api/pages/{key}", get(get_page_handler))
}

/// Builds the full application: content routes, health probe, Swagger UI,
/// CORS and request tracing.
pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS origin: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT]);

    let api_router = Router::new()
        .route("/health", get(health_handler))
        .merge(api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
