// src/services/courses.rs

//! Course data access.

use std::sync::Arc;

use serde_json::json;

use super::{Fetcher, JsonSource};
use crate::config::Config;
use crate::error::Result;
use crate::loader::{
    CircuitBreaker, LoadOptions, LoadResult, RetryPolicy, safe_load_course, safe_load_courses,
};
use crate::logging::ErrorLogger;
use crate::models::Course;
use crate::utils::http::encode_segment;
use crate::utils::{unwrap_item, unwrap_list};

const COURSES_PATH: &str = "/api/courses";

/// Loads courses through the courses circuit breaker.
pub struct CourseRepository {
    fetcher: Fetcher,
    options: LoadOptions,
}

impl CourseRepository {
    /// Repository with the default courses breaker and retry policy.
    pub fn new(source: Arc<dyn JsonSource>) -> Self {
        Self {
            fetcher: Fetcher::new("course", source, CircuitBreaker::courses()),
            options: LoadOptions::default(),
        }
    }

    /// Repository wired from the `retry`, `breakers.courses`, `loader`
    /// and `logging` sections.
    pub fn from_config(source: Arc<dyn JsonSource>, config: &Config) -> Self {
        Self::new(source)
            .with_breaker(CircuitBreaker::from_config("courses", &config.breakers.courses))
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

    /// Fetch, validate and parse the course list.
    ///
    /// Invalid records are dropped from `data` and described in `errors`.
    pub async fn load_courses(&self) -> Result<LoadResult<Vec<Course>>> {
        let fetcher = &self.fetcher;
        let loaded = safe_load_courses(
            || async move {
                let payload = fetcher.fetch(COURSES_PATH).await?;
                Ok(unwrap_list(payload, &["courses"]))
            },
            json!([]),
            &self.options,
        )
        .await?;
        Ok(loaded.into_entities::<Course>())
    }

    /// Every valid course, or an empty list when loading fails.
    pub async fn get_course_data_for_server(&self) -> Vec<Course> {
        match self.load_courses().await {
            Ok(loaded) => loaded.data,
            Err(e) => {
                log::warn!("Serving empty course list: {}", e);
                Vec::new()
            }
        }
    }

    /// One course by id; `None` when it is missing, invalid or unreachable.
    pub async fn get_course_by_id(&self, id: &str) -> Option<Course> {
        let path = format!("{}/{}", COURSES_PATH, encode_segment(id));
        let fetcher = &self.fetcher;
        let path = path.as_str();

        let loaded = safe_load_course(
            || async move {
                let payload = fetcher.fetch_optional(path, id).await?;
                Ok(unwrap_item(payload, &["course"]))
            },
            &self.options,
        )
        .await;

        match loaded {
            Ok(loaded) => loaded.into_entity::<Course>().data,
            Err(e) => {
                log::debug!("Course {} unavailable: {}", id, e);
                None
            }
        }
    }
}
