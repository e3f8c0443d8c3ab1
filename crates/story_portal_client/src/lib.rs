//! Client-side data hooks for the story portal content API.

pub mod api;
pub mod cache;
pub mod hooks;
pub mod resource;

pub use api::{ClientError, ContentApi, Endpoint};
pub use cache::{CacheKey, DataCache};
pub use hooks::{ChapterParams, ContentHooks};
pub use resource::{AsyncData, FetchState};
