// src/loader/retry.rs

//! Bounded retry with linear backoff.

use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::{AppError, Result};

/// How many times to call a loader and how long to wait between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_retries: u32,
    /// Attempt `n` is followed by a wait of `n * delay`
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_retries, config.delay())
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub async fn run<T, F, Fut>(&self, loader: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        retry_data_load(loader, self.max_retries, self.delay).await
    }
}

/// Call `loader` until it succeeds or `max_retries` attempts have failed.
///
/// The wait after failed attempt `n` is `delay * n`. A `max_retries` of 0
/// still makes one attempt. When every attempt fails the last error is
/// wrapped in a [`AppError::DataLoad`] whose message names the attempt count.
pub async fn retry_data_load<T, F, Fut>(mut loader: F, max_retries: u32, delay: Duration) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = max_retries.max(1);
    let mut attempt = 1;

    loop {
        match loader().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt >= attempts => {
                return Err(AppError::data_load(
                    format!("Failed after {} attempts: {}", attempts, error),
                    "retry",
                    Some(error),
                ));
            }
            Err(error) => {
                let wait = delay.saturating_mul(attempt);
                log::warn!(
                    "Attempt {}/{} failed: {}. Retrying in {}ms",
                    attempt,
                    attempts,
                    error,
                    wait.as_millis()
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
        }
    }
}
