//! crates/story_portal_core/src/ports.rs
//!
//! Defines the contract (trait) between the catalog and the content backend.
//! The core never talks HTTP itself; adapters implement this port.

use async_trait::async_trait;

use crate::query::ItemQuery;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// Failures raised by a content backend adapter.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The backend location is not configured. An operator fault, not a
    /// per-request condition.
    #[error("Configuration error: {0}")]
    Config(String),
    /// The backend answered with a non-2xx status.
    #[error("Content backend returned {status}: {body}")]
    Status { status: u16, body: String },
    /// The request never produced a response (DNS, connect, TLS, ...).
    #[error("Content backend request failed: {0}")]
    Transport(String),
    /// The response body could not be decoded into the expected shape.
    #[error("Malformed content backend response: {0}")]
    Decode(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// Issues a single read against `path` (e.g. `/items/stories`) and returns
    /// the parsed response body. No retries, no caching.
    async fn fetch(&self, path: &str, query: &ItemQuery) -> PortResult<serde_json::Value>;
}
