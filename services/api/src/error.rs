//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and its
//! translation into HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::ConfigError;
use story_portal_core::ContentError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A failed content read, already classified by the catalog.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// JSON error body returned by every route.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub status_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorDetail>,
}

/// Diagnostic detail attached to upstream failures.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Content(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let status_code = self.status().as_u16();
        let (status_message, detail) = match self {
            ApiError::Content(ContentError::Validation(msg))
            | ApiError::Content(ContentError::NotFound(msg)) => (msg.clone(), None),
            ApiError::Content(err @ ContentError::Upstream { detail, .. }) => {
                (err.to_string(), Some(detail.clone()))
            }
            other => ("Internal server error".to_string(), Some(other.to_string())),
        };
        ErrorBody {
            status_code,
            status_message,
            data: detail.map(|message| ErrorDetail { message }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Content failures are logged by the endpoint guard with their resource.
        if status.is_server_error() && !matches!(self, ApiError::Content(_)) {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}
