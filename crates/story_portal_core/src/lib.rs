pub mod catalog;
pub mod domain;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod ports;
pub mod query;

pub use catalog::{ContentCatalog, ContentError, ContentResult};
pub use domain::{
    Chapter, ChapterSummary, DiaryEntry, ItemId, NewsItem, Page, PublicationStatus, Series, Story,
    Theme, Visibility,
};
#[cfg(any(test, feature = "test-util"))]
pub use memory::InMemoryBackend;
pub use ports::{ContentBackend, PortError, PortResult};
pub use query::{active_filter, published_filter, ItemQuery, QueryValue};
