#![allow(dead_code)]

use std::sync::Arc;

use api_lib::config::Config;
use api_lib::web::{build_router, state::AppState};
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use story_portal_core::{ContentBackend, ContentCatalog, InMemoryBackend};
use tower::ServiceExt;

/// Build a test `Config` with safe defaults and the given backend URL.
pub fn test_config(directus_url: Option<String>) -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        log_level: tracing::Level::DEBUG,
        directus_url,
        directus_admin_token: None,
        cors_origin: "http://localhost:3000".to_string(),
    }
}

/// Build the full application router over an arbitrary backend.
///
/// This mirrors the router construction in `bin/api.rs` so integration tests
/// exercise the same middleware stack production uses.
pub fn build_test_app(backend: Arc<dyn ContentBackend>, directus_url: Option<String>) -> Router {
    let state = Arc::new(AppState {
        catalog: ContentCatalog::new(backend),
        config: Arc::new(test_config(directus_url)),
    });
    build_router(state).unwrap()
}

/// The seeded in-memory site used by most route tests.
pub fn seeded_backend() -> InMemoryBackend {
    InMemoryBackend::new()
        .with_relation("chapters", "story", "stories")
        .with_items(
            "themes",
            vec![
                json!({"id": 1, "name": "Ember", "slug": "ember", "sort_order": 2, "is_active": true}),
                json!({"id": 2, "name": "Frost", "slug": "frost", "sort_order": 1, "is_active": true}),
                json!({"id": 3, "name": "Retired", "slug": "retired", "sort_order": 0, "is_active": false}),
            ],
        )
        .with_items(
            "series",
            vec![
                json!({"id": 4, "title": "Lantern Cycle", "slug": "lantern-cycle", "type": "saga",
                       "sort_order": 1, "status": "published"}),
                json!({"id": 5, "title": "Drafted Cycle", "slug": "drafted-cycle", "sort_order": 0,
                       "status": "draft"}),
            ],
        )
        .with_items(
            "stories",
            vec![
                json!({"id": 10, "title": "The Archivist's Lantern", "slug": "the-archivists-lantern",
                       "synopsis": "A keeper of records finds a light that remembers.",
                       "featured": true, "sort_order": 1, "theme": 1, "series": 4,
                       "status": "published"}),
                json!({"id": 11, "title": "Half Written", "slug": "half-written", "sort_order": 0,
                       "theme": 2, "status": "draft"}),
            ],
        )
        .with_items(
            "chapters",
            vec![
                json!({"id": 101, "story": 10, "chapter_number": 1, "title": "The Stacks",
                       "slug": "the-stacks", "excerpt": "Dust.", "content": "<p>Dust everywhere.</p>",
                       "status": "published"}),
                json!({"id": 102, "story": 10, "chapter_number": 2, "title": "The Flame",
                       "slug": "the-flame", "excerpt": "Light.", "content": "<p>A small light.</p>",
                       "status": "published"}),
                json!({"id": 103, "story": 10, "chapter_number": 3, "title": "The Ledger",
                       "slug": "the-ledger", "excerpt": "Ink.", "content": "<p>Unfinished.</p>",
                       "status": "draft"}),
            ],
        )
        .with_items(
            "news",
            vec![
                json!({"id": 1, "title": "Launch", "slug": "launch", "content": "<p>We are live.</p>",
                       "date_created": "2024-01-10T09:00:00Z", "status": "published"}),
                json!({"id": 2, "title": "Chapter Two Out", "slug": "chapter-two-out",
                       "date_created": "2024-03-02T09:00:00Z", "status": "published"}),
                json!({"id": 3, "title": "Embargoed", "slug": "embargoed",
                       "date_created": "2024-04-01T09:00:00Z", "status": "draft"}),
            ],
        )
        .with_items(
            "diary_entries",
            vec![
                json!({"id": 1, "title": "Rainy", "slug": "rainy", "content": "<p>Rain.</p>",
                       "mood_tag": "wistful", "date_created": "2024-02-01T09:00:00Z",
                       "status": "published"}),
                json!({"id": 2, "title": "Private", "slug": "private", "mood_tag": "grim",
                       "date_created": "2024-02-02T09:00:00Z", "status": "draft"}),
            ],
        )
        .with_items(
            "pages",
            vec![
                json!({"id": 1, "key": "about", "title": "About", "content": "<p>Hello.</p>",
                       "status": "published"}),
                json!({"id": 2, "key": "colophon", "title": "Colophon", "status": "draft"}),
            ],
        )
}

/// Issue a GET request against the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
