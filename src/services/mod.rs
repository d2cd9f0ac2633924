//! Data access services.
//!
//! Repositories own the resilience pieces for their resource type: a
//! circuit breaker, a retry policy, loader options and an error logger.
//! Every fetch goes breaker → retry → source, and failures surface to
//! callers as empty lists or `None`.

pub mod api;
pub mod blog;
pub mod courses;

use std::sync::Arc;

use serde_json::Value;

pub use api::{ApiClient, JsonSource};
pub use blog::BlogRepository;
pub use courses::CourseRepository;

use crate::error::{AppError, Result};
use crate::loader::{CircuitBreaker, RetryPolicy};
use crate::logging::ErrorLogger;

/// Shared fetch path for one resource type.
struct Fetcher {
    resource: &'static str,
    source: Arc<dyn JsonSource>,
    breaker: CircuitBreaker,
    retry: RetryPolicy,
    logger: ErrorLogger,
}

impl Fetcher {
    fn new(resource: &'static str, source: Arc<dyn JsonSource>, breaker: CircuitBreaker) -> Self {
        Self {
            resource,
            source,
            breaker,
            retry: RetryPolicy::default(),
            logger: ErrorLogger::default(),
        }
    }

    /// Fetch through the breaker, retrying transient failures.
    async fn fetch(&self, path: &str) -> Result<Value> {
        let source = self.source.as_ref();
        let retry = self.retry;
        let result = self
            .breaker
            .execute(|| retry.run(move || source.get_json(path)))
            .await;
        if let Err(error) = &result {
            self.report_failure(path, None, error);
        }
        result
    }

    /// Fetch a single record; a 404 yields `Null` and is neither retried
    /// nor counted against the breaker.
    async fn fetch_optional(&self, path: &str, id: &str) -> Result<Value> {
        let source = self.source.as_ref();
        let retry = self.retry;
        let result = self
            .breaker
            .execute(|| {
                retry.run(move || async move {
                    match source.get_json(path).await {
                        Err(error) if error.is_not_found() => Ok(Value::Null),
                        other => other,
                    }
                })
            })
            .await;

        match &result {
            Ok(Value::Null) => self.logger.log_404_error(self.resource, id),
            Ok(_) => {}
            Err(error) => self.report_failure(path, Some(id), error),
        }
        result
    }

    fn report_failure(&self, path: &str, id: Option<&str>, error: &AppError) {
        match error {
            AppError::CircuitOpen { .. } => {
                self.logger.log_data_fetch_error(self.resource, error, id)
            }
            _ => self.logger.log_fetch_failure(self.resource, path, error),
        }
    }
}
