//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use story_portal_core::ContentCatalog;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
///
/// Holds no per-request data; every request is independent.
#[derive(Clone)]
pub struct AppState {
    pub catalog: ContentCatalog,
    pub config: Arc<Config>,
}
