// src/services/blog.rs

//! Blog data access.

use std::sync::Arc;

use serde_json::{Value, json};

use super::{Fetcher, JsonSource};
use crate::config::Config;
use crate::error::Result;
use crate::loader::{
    CircuitBreaker, LoadOptions, LoadResult, RetryPolicy, safe_load_blog_post,
    safe_load_blog_posts,
};
use crate::logging::ErrorLogger;
use crate::models::BlogPost;
use crate::utils::http::encode_segment;
use crate::utils::{unwrap_item, unwrap_list};

const BLOG_PATH: &str = "/api/blog";
const CATEGORIES_PATH: &str = "/api/blog/categories";

/// Loads blog posts and categories through the blog circuit breaker.
pub struct BlogRepository {
    fetcher: Fetcher,
    options: LoadOptions,
}

impl BlogRepository {
    pub fn new(source: Arc<dyn JsonSource>) -> Self {
        Self {
            fetcher: Fetcher::new("blog", source, CircuitBreaker::blog()),
            options: LoadOptions::default(),
        }
    }

    pub fn from_config(source: Arc<dyn JsonSource>, config: &Config) -> Self {
        Self::new(source)
            .with_breaker(CircuitBreaker::from_config("blog", &config.breakers.blog))
            .with_retry(RetryPolicy::from(&config.retry))
            .with_options(config.loader)
            .with_logger(ErrorLogger::from_config(&config.logging))
    }

    pub fn with_breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.fetcher.breaker = breaker;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.fetcher.retry = retry;
        self
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_logger(mut self, logger: ErrorLogger) -> Self {
        self.fetcher.logger = logger;
        self
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.fetcher.breaker
    }

    /// Fetch, validate and parse every post.
    pub async fn load_blog_posts(&self) -> Result<LoadResult<Vec<BlogPost>>> {
        let fetcher = &self.fetcher;
        let loaded = safe_load_blog_posts(
            || async move {
                let payload = fetcher.fetch(BLOG_PATH).await?;
                Ok(unwrap_list(payload, &["posts", "blogs"]))
            },
            json!([]),
            &self.options,
        )
        .await?;
        Ok(loaded.into_entities::<BlogPost>())
    }

    /// Every valid post, or an empty list when loading fails.
    pub async fn get_all_blog_posts(&self) -> Vec<BlogPost> {
        match self.load_blog_posts().await {
            Ok(loaded) => loaded.data,
            Err(e) => {
                log::warn!("Serving empty blog post list: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn get_blog_post_by_id(&self, id: &str) -> Option<BlogPost> {
        let path = format!("{}/{}", BLOG_PATH, encode_segment(id));
        let fetcher = &self.fetcher;
        let path = path.as_str();

        let loaded = safe_load_blog_post(
            || async move {
                let payload = fetcher.fetch_optional(path, id).await?;
                Ok(unwrap_item(payload, &["post", "blog"]))
            },
            &self.options,
        )
        .await;

        match loaded {
            Ok(loaded) => loaded.into_entity::<BlogPost>().data,
            Err(e) => {
                log::debug!("Blog post {} unavailable: {}", id, e);
                None
            }
        }
    }

    /// Distinct category names in the order the API lists them.
    ///
    /// Entries may be plain strings or objects with a `name`; anything
    /// else is skipped.
    pub async fn get_blog_categories(&self) -> Vec<String> {
        let payload = match self.fetcher.fetch(CATEGORIES_PATH).await {
            Ok(payload) => unwrap_list(payload, &["categories"]),
            Err(_) => return Vec::new(),
        };
        let Value::Array(entries) = payload else {
            log::warn!("Unexpected blog categories payload, expected a list");
            return Vec::new();
        };

        let mut categories: Vec<String> = Vec::with_capacity(entries.len());
        for entry in &entries {
            let name = match entry {
                Value::String(name) => Some(name.as_str()),
                Value::Object(obj) => obj.get("name").and_then(Value::as_str),
                _ => None,
            };
            if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
                if !categories.iter().any(|c| c == name) {
                    categories.push(name.to_string());
                }
            }
        }
        categories
    }

    /// Posts whose category matches, ignoring case.
    pub async fn get_blog_posts_by_category(&self, category: &str) -> Vec<BlogPost> {
        let wanted = category.trim().to_lowercase();
        self.get_all_blog_posts()
            .await
            .into_iter()
            .filter(|post| post.category.to_lowercase() == wanted)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::AppError;
    use crate::loader::CircuitState;
    use crate::logging::MemorySink;
    use crate::services::test_support::StubSource;

    fn post(id: &str, category: &str) -> Value {
        json!({
            "id": id,
            "title": format!("Post {id}"),
            "excerpt": "Short",
            "content": "Long",
            "author": "Priya",
            "date": "2024-05-01",
            "category": category,
            "readTime": 4,
            "image": "/img/post.jpg"
        })
    }

    fn repository(source: Arc<StubSource>) -> (BlogRepository, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let repo = BlogRepository::new(source)
            .with_retry(RetryPolicy::new(1, Duration::ZERO))
            .with_logger(ErrorLogger::new(sink.clone()));
        (repo, sink)
    }

    #[tokio::test]
    async fn test_posts_by_category_ignores_case() {
        let source = Arc::new(StubSource::new(|_| {
            Ok(json!({
                "posts": [post("a", "Visas"), post("b", "Scholarships"), post("c", "visas")]
            }))
        }));
        let (repo, _) = repository(source);

        let ids: Vec<String> = repo
            .get_blog_posts_by_category("VISAS")
            .await
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[tokio::test]
    async fn test_mistyped_image_is_reported() {
        let source = Arc::new(StubSource::new(|_| {
            let mut bad = post("b", "Visas");
            bad["image"] = json!(123);
            Ok(json!([post("a", "Visas"), bad]))
        }));
        let (repo, _) = repository(source);

        let loaded = repo.load_blog_posts().await.unwrap();
        assert_eq!(loaded.data.len(), 1);
        assert!(loaded.has_errors);
        assert_eq!(loaded.errors, ["Blog post 2: image must be a string"]);
    }

    #[tokio::test]
    async fn test_categories_accept_strings_and_objects() {
        let source = Arc::new(StubSource::new(|_| {
            Ok(json!({
                "data": ["Visas", { "name": "Scholarships", "count": 3 }, "Visas", 42, { "slug": "x" }]
            }))
        }));
        let (repo, _) = repository(source.clone());

        assert_eq!(repo.get_blog_categories().await, ["Visas", "Scholarships"]);
        assert_eq!(source.paths(), ["/api/blog/categories"]);
    }

    #[tokio::test]
    async fn test_categories_empty_on_failure() {
        let source = Arc::new(StubSource::new(|_| Err(AppError::Network("timeout".into()))));
        let (repo, sink) = repository(source);

        assert!(repo.get_blog_categories().await.is_empty());
        assert_eq!(sink.records()[0].context, "NETWORK_ERROR");
    }

    #[tokio::test]
    async fn test_missing_post_logs_404() {
        let source = Arc::new(StubSource::new(|path| Err(AppError::not_found(path))));
        let (repo, sink) = repository(source);

        assert!(repo.get_blog_post_by_id("gone").await.is_none());
        assert_eq!(sink.records()[0].context, "404_BLOG");
        assert_eq!(repo.breaker().get_state().failures, 0);
    }

    #[tokio::test]
    async fn test_post_by_id_unwraps_data() {
        let source = Arc::new(StubSource::new(|_| Ok(json!({ "data": post("ielts-tips", "Tests") }))));
        let (repo, _) = repository(source.clone());

        let found = repo.get_blog_post_by_id("ielts-tips").await.unwrap();
        assert_eq!(found.category, "Tests");
        assert_eq!(source.paths(), ["/api/blog/ielts-tips"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blog_breaker_opens_after_three_failures() {
        let source = Arc::new(StubSource::new(|_| Err(AppError::Status {
            status: 503,
            url: "http://localhost/api/blog".into(),
        })));
        let (repo, _) = repository(source.clone());

        for _ in 0..3 {
            assert!(repo.get_all_blog_posts().await.is_empty());
        }
        assert_eq!(repo.breaker().get_state().state, CircuitState::Open);
        assert_eq!(source.calls(), 3);

        assert!(repo.get_all_blog_posts().await.is_empty());
        assert_eq!(source.calls(), 3);

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(repo.get_all_blog_posts().await.is_empty());
        assert_eq!(source.calls(), 4);
    }
}
