//! services/api/src/adapters/directus.rs
//!
//! This module contains the adapter for the Directus content backend.
//! It implements the `ContentBackend` port from the `core` crate using `reqwest`.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use story_portal_core::ports::{ContentBackend, PortError, PortResult};
use story_portal_core::query::ItemQuery;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Issues read requests against a Directus instance.
#[derive(Clone)]
pub struct DirectusAdapter {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl DirectusAdapter {
    /// Creates a new `DirectusAdapter`.
    ///
    /// A missing base URL is accepted here and reported on every call, so a
    /// misconfigured deployment still boots and answers with diagnostics.
    pub fn new(base_url: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates an adapter reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: Option<String>) -> Self {
        let base_url = base_url.map(|url| url.trim_end_matches('/').to_string());
        Self { client, base_url }
    }

    fn base_url(&self) -> PortResult<&str> {
        self.base_url.as_deref().ok_or_else(|| {
            PortError::Config(
                "DIRECTUS_URL is missing. Set it and restart the service.".to_string(),
            )
        })
    }
}

//=========================================================================================
// `ContentBackend` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentBackend for DirectusAdapter {
    async fn fetch(&self, path: &str, query: &ItemQuery) -> PortResult<serde_json::Value> {
        let url = format!("{}{}", self.base_url()?, path);
        tracing::debug!(%url, "Querying content backend");

        let response = self
            .client
            .get(&url)
            .header(CONTENT_TYPE, "application/json")
            .query(&query.normalized())
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PortError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| PortError::Decode(e.to_string()))
    }
}
