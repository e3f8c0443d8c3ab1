//! services/api/src/web/guard.rs
//!
//! The single error-translation wrapper every content route runs through.

use std::future::Future;

use axum::Json;
use story_portal_core::{ContentError, ContentResult};

use crate::error::ApiError;

/// Awaits a catalog read for `resource` and shapes its outcome for HTTP.
///
/// Validation and not-found errors pass through as-is. Any other failure is
/// attributed to `resource` exactly once and surfaces as a 500 carrying the
/// original message.
pub async fn guard<T, F>(resource: &'static str, fetch: F) -> Result<Json<T>, ApiError>
where
    F: Future<Output = ContentResult<T>>,
{
    match fetch.await {
        Ok(value) => Ok(Json(value)),
        Err(err) => {
            let err = err.attribute_to(resource);
            match &err {
                ContentError::Validation(msg) => {
                    tracing::debug!(resource, reason = %msg, "Rejected content request")
                }
                ContentError::NotFound(msg) => {
                    tracing::debug!(resource, reason = %msg, "Content not found")
                }
                ContentError::Upstream { detail, .. } => {
                    tracing::error!(resource, %detail, "Content fetch failed")
                }
                ContentError::Port(port) => {
                    tracing::error!(resource, error = %port, "Content fetch failed")
                }
            }
            Err(ApiError::Content(err))
        }
    }
}
