//! crates/story_portal_client/src/hooks.rs
//!
//! One data hook per public content route. List hooks take no parameters and
//! fetch once per cache key; parametrized hooks re-fetch whenever
//! [`AsyncData::set_params`] receives different values.

use futures::future::FutureExt;
use serde::de::DeserializeOwned;
use story_portal_core::{
    Chapter, ChapterSummary, DiaryEntry, NewsItem, Page, Series, Story, Theme,
};

use crate::api::{ContentApi, Endpoint};
use crate::cache::DataCache;
use crate::resource::AsyncData;

/// Watched parameters of [`ContentHooks::use_chapter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterParams {
    pub story_slug: String,
    pub chapter_number: i64,
}

/// Factory for data hooks sharing one API client and one cache.
#[derive(Clone)]
pub struct ContentHooks {
    api: ContentApi,
    cache: DataCache,
}

impl ContentHooks {
    pub fn new(api: ContentApi) -> Self {
        Self {
            api,
            cache: DataCache::new(),
        }
    }

    pub fn cache(&self) -> &DataCache {
        &self.cache
    }

    pub fn use_themes(&self) -> AsyncData<(), Vec<Theme>> {
        self.hook((), |_| Endpoint::Themes)
    }

    pub fn use_series(&self) -> AsyncData<(), Vec<Series>> {
        self.hook((), |_| Endpoint::Series)
    }

    pub fn use_stories(&self) -> AsyncData<(), Vec<Story>> {
        self.hook((), |_| Endpoint::Stories)
    }

    pub fn use_story(&self, slug: &str) -> AsyncData<String, Story> {
        self.hook(slug.to_string(), |slug| Endpoint::Story(slug.clone()))
    }

    pub fn use_story_chapters(&self, story_slug: &str) -> AsyncData<String, Vec<ChapterSummary>> {
        self.hook(story_slug.to_string(), |slug| {
            Endpoint::StoryChapters(slug.clone())
        })
    }

    pub fn use_chapter(
        &self,
        story_slug: &str,
        chapter_number: i64,
    ) -> AsyncData<ChapterParams, Chapter> {
        let params = ChapterParams {
            story_slug: story_slug.to_string(),
            chapter_number,
        };
        self.hook(params, |p| Endpoint::Chapter {
            story_slug: p.story_slug.clone(),
            chapter_number: p.chapter_number,
        })
    }

    pub fn use_news(&self) -> AsyncData<(), Vec<NewsItem>> {
        self.hook((), |_| Endpoint::News)
    }

    pub fn use_news_item(&self, slug: &str) -> AsyncData<String, NewsItem> {
        self.hook(slug.to_string(), |slug| Endpoint::NewsItem(slug.clone()))
    }

    pub fn use_diary(&self) -> AsyncData<(), Vec<DiaryEntry>> {
        self.hook((), |_| Endpoint::Diary)
    }

    pub fn use_diary_entry(&self, slug: &str) -> AsyncData<String, DiaryEntry> {
        self.hook(slug.to_string(), |slug| Endpoint::DiaryEntry(slug.clone()))
    }

    pub fn use_page(&self, key: &str) -> AsyncData<String, Page> {
        self.hook(key.to_string(), |key| Endpoint::Page(key.clone()))
    }

    /// Binds `endpoint_for` to the shared client and cache and starts the
    /// first fetch.
    fn hook<P, T>(&self, params: P, endpoint_for: fn(&P) -> Endpoint) -> AsyncData<P, T>
    where
        P: Clone + PartialEq + Send + 'static,
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let api = self.api.clone();
        let data = AsyncData::new(
            self.cache.clone(),
            params,
            move |p| endpoint_for(p).cache_key(),
            move |p| {
                let api = api.clone();
                let endpoint = endpoint_for(p);
                async move { api.get(&endpoint).await }.boxed()
            },
        );
        data.start();
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::FetchState;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chapter_body(number: i64, title: &str) -> serde_json::Value {
        json!({
            "id": number, "story": 10, "chapter_number": number, "title": title,
            "slug": format!("c{number}"), "content": "<p>x</p>", "status": "published"
        })
    }

    fn hooks_for(server: &MockServer) -> ContentHooks {
        ContentHooks::new(ContentApi::new(server.uri()))
    }

    #[tokio::test]
    async fn list_hook_fetches_once_per_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/themes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "name": "Ember", "slug": "ember", "is_active": true}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let hooks = hooks_for(&server);
        let first = hooks.use_themes();
        let state = first.settled().await;
        assert_eq!(state.data().unwrap()[0].slug, "ember");
        assert_eq!(first.key().as_str(), "themes");

        let second = hooks.use_themes();
        let state = second.settled().await;
        assert_eq!(state.data().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_hooks_for_the_same_key_share_a_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stories/lantern"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": 10, "title": "Lantern", "slug": "lantern", "status": "published"}))
                    .set_delay(Duration::from_millis(50)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let hooks = hooks_for(&server);
        let a = hooks.use_story("lantern");
        let b = hooks.use_story("lantern");
        let (sa, sb) = tokio::join!(a.settled(), b.settled());
        assert_eq!(sa.data().unwrap().slug, "lantern");
        assert_eq!(sb.data().unwrap().slug, "lantern");
    }

    #[tokio::test]
    async fn changing_params_refetches_and_same_params_do_not() {
        let server = MockServer::start().await;
        for slug in ["first", "second"] {
            Mock::given(method("GET"))
                .and(path(format!("/api/news/{slug}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(
                    json!({"id": 1, "title": slug, "slug": slug, "status": "published"}),
                ))
                .expect(1)
                .mount(&server)
                .await;
        }

        let hooks = hooks_for(&server);
        let item = hooks.use_news_item("first");
        assert_eq!(item.settled().await.data().unwrap().slug, "first");

        assert!(!item.set_params("first".to_string()));
        assert!(item.set_params("second".to_string()));
        assert_eq!(item.key().as_str(), "news:second");
        assert_eq!(item.settled().await.data().unwrap().slug, "second");
    }

    #[tokio::test]
    async fn latest_parameters_win_over_a_slow_stale_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stories/lantern/chapters/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chapter_body(1, "Slow"))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/stories/lantern/chapters/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chapter_body(2, "Fast")))
            .mount(&server)
            .await;

        let hooks = hooks_for(&server);
        let chapter = hooks.use_chapter("lantern", 1);
        assert_eq!(chapter.key().as_str(), "chapter:lantern:1");
        chapter.set_params(ChapterParams {
            story_slug: "lantern".into(),
            chapter_number: 2,
        });

        assert_eq!(chapter.settled().await.data().unwrap().title, "Fast");

        tokio::time::sleep(Duration::from_millis(450)).await;
        assert_eq!(chapter.state().data().unwrap().title, "Fast");
    }

    #[tokio::test]
    async fn errors_surface_without_retry_and_refresh_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pages/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(
                json!({"statusCode": 404, "statusMessage": "Page not found"}),
            ))
            .expect(2)
            .mount(&server)
            .await;

        let hooks = hooks_for(&server);
        let page = hooks.use_page("missing");
        let state = page.settled().await;
        let err = state.error().unwrap();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Page not found (404)");
        assert!(!hooks.cache().contains(&page.key()));

        page.refresh();
        assert!(matches!(page.settled().await, FetchState::Failed(_)));
    }

    #[tokio::test]
    async fn unexpected_shape_is_a_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/diary"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"not": "a list"})))
            .mount(&server)
            .await;

        let hooks = hooks_for(&server);
        let diary = hooks.use_diary();
        let state = diary.settled().await;
        assert!(matches!(
            state.error().map(|e| &**e),
            Some(crate::api::ClientError::Decode(_))
        ));
    }
}
