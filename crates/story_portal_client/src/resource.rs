//! crates/story_portal_client/src/resource.rs
//!
//! A reactive, cache-backed view of one remote resource.
//!
//! `AsyncData` owns a set of parameters, derives a cache key and a fetch from
//! them, and publishes the outcome through a `watch` channel. Changing the
//! parameters starts a new fetch; a fetch that resolves after its parameters
//! were superseded is discarded, so the exposed state always reflects the
//! latest parameters.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

use crate::api::ClientError;
use crate::cache::{CacheKey, DataCache};

/// What the rendering layer sees.
pub enum FetchState<T> {
    Idle,
    Loading,
    Ready(Arc<T>),
    Failed(Arc<ClientError>),
}

impl<T> FetchState<T> {
    pub fn is_settled(&self) -> bool {
        matches!(self, FetchState::Ready(_) | FetchState::Failed(_))
    }

    pub fn data(&self) -> Option<&Arc<T>> {
        match self {
            FetchState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Arc<ClientError>> {
        match self {
            FetchState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl<T> Clone for FetchState<T> {
    fn clone(&self) -> Self {
        match self {
            FetchState::Idle => FetchState::Idle,
            FetchState::Loading => FetchState::Loading,
            FetchState::Ready(data) => FetchState::Ready(Arc::clone(data)),
            FetchState::Failed(err) => FetchState::Failed(Arc::clone(err)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for FetchState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchState::Idle => f.write_str("Idle"),
            FetchState::Loading => f.write_str("Loading"),
            FetchState::Ready(data) => f.debug_tuple("Ready").field(data).finish(),
            FetchState::Failed(err) => f.debug_tuple("Failed").field(err).finish(),
        }
    }
}

type KeyFn<P> = Box<dyn Fn(&P) -> CacheKey + Send + Sync>;
type FetchFn<P> = Box<dyn Fn(&P) -> BoxFuture<'static, Result<Value, ClientError>> + Send + Sync>;

struct Current<P> {
    params: P,
    generation: u64,
}

struct Inner<P, T> {
    cache: DataCache,
    key_for: KeyFn<P>,
    fetch_for: FetchFn<P>,
    current: Mutex<Current<P>>,
    state: watch::Sender<FetchState<T>>,
}

/// Handle to a watched resource. Cloning shares the same state.
pub struct AsyncData<P, T> {
    inner: Arc<Inner<P, T>>,
}

impl<P, T> Clone for AsyncData<P, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, T> AsyncData<P, T>
where
    P: Clone + PartialEq + Send + 'static,
    T: DeserializeOwned + Send + Sync + 'static,
{
    /// Creates an idle handle. Call [`AsyncData::start`] to issue the first fetch.
    pub fn new<K, F>(cache: DataCache, params: P, key_for: K, fetch_for: F) -> Self
    where
        K: Fn(&P) -> CacheKey + Send + Sync + 'static,
        F: Fn(&P) -> BoxFuture<'static, Result<Value, ClientError>> + Send + Sync + 'static,
    {
        let (state, _) = watch::channel(FetchState::Idle);
        Self {
            inner: Arc::new(Inner {
                cache,
                key_for: Box::new(key_for),
                fetch_for: Box::new(fetch_for),
                current: Mutex::new(Current {
                    params,
                    generation: 0,
                }),
                state,
            }),
        }
    }

    pub fn key(&self) -> CacheKey {
        let current = self.lock();
        (self.inner.key_for)(&current.params)
    }

    pub fn params(&self) -> P {
        self.lock().params.clone()
    }

    pub fn state(&self) -> FetchState<T> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.inner.state.subscribe()
    }

    /// Replaces the watched parameters. Returns `false` and does nothing when
    /// they are unchanged.
    pub fn set_params(&self, params: P) -> bool {
        {
            let mut current = self.lock();
            if current.params == params {
                return false;
            }
            current.params = params;
        }
        self.start();
        true
    }

    /// Drops the cached value for the current key and fetches again.
    pub fn refresh(&self) {
        self.inner.cache.invalidate(&self.key());
        self.start();
    }

    /// Waits until the latest fetch has settled and returns its state.
    pub async fn settled(&self) -> FetchState<T> {
        let mut rx = self.subscribe();
        let state = match rx.wait_for(FetchState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        state
    }

    /// Issues a fetch for the current parameters. Requires a Tokio runtime.
    pub fn start(&self) {
        let (generation, key, fetch) = {
            let mut current = self.lock();
            current.generation += 1;
            let key = (self.inner.key_for)(&current.params);
            let fetch = (self.inner.fetch_for)(&current.params);
            self.inner.state.send_replace(FetchState::Loading);
            (current.generation, key, fetch)
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let next = match inner.cache.load(&key, move || fetch).await {
                Ok(value) => match <T as serde::Deserialize>::deserialize(&*value) {
                    Ok(data) => FetchState::Ready(Arc::new(data)),
                    Err(e) => FetchState::Failed(Arc::new(ClientError::Decode(e.to_string()))),
                },
                Err(err) => FetchState::Failed(err),
            };

            let current = inner.current.lock().unwrap_or_else(PoisonError::into_inner);
            if current.generation == generation {
                inner.state.send_replace(next);
            } else {
                tracing::debug!(%key, "Discarding result for superseded parameters");
            }
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Current<P>> {
        self.inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
