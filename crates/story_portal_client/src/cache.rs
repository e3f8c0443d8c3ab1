//! crates/story_portal_client/src/cache.rs
//!
//! Per-key memoization of content fetches. Concurrent loads of the same key
//! share one in-flight request; successful results stay cached, failures are
//! evicted so the next explicit load tries again.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;

use crate::api::ClientError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type FetchOutcome = Result<Arc<Value>, Arc<ClientError>>;

type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

#[derive(Clone, Default)]
pub struct DataCache {
    entries: Arc<Mutex<HashMap<CacheKey, SharedFetch>>>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached or in-flight result for `key`, starting `fetch`
    /// only when neither exists.
    pub async fn load<F, Fut>(&self, key: &CacheKey, fetch: F) -> FetchOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, ClientError>> + Send + 'static,
    {
        let shared = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries
                .entry(key.clone())
                .or_insert_with(|| {
                    tracing::debug!(%key, "Starting content fetch");
                    fetch()
                        .map(|outcome| outcome.map(Arc::new).map_err(Arc::new))
                        .boxed()
                        .shared()
                })
                .clone()
        };

        let outcome = shared.clone().await;
        if outcome.is_err() {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            // Only evict the fetch that failed, not a newer one for the same key.
            if entries
                .get(key)
                .is_some_and(|current| Shared::ptr_eq(current, &shared))
            {
                entries.remove(key);
            }
        }
        outcome
    }

    pub fn invalidate(&self, key: &CacheKey) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}
