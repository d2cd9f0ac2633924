//! Circuit Breaker pattern implementation.
//!
//! Stops calling an upstream that keeps failing. Each resource type gets
//! its own breaker so a broken courses endpoint does not block the blog.
//!
//! ```text
//! closed --(max_failures reached)--> open
//! open   --(timeout elapsed)-------> half-open
//! half-open --(success)------------> closed
//! half-open --(failure)------------> open
//! ```
//!
//! The breaker gates on the state seen when a call starts and never holds
//! its lock across the wrapped operation, so concurrent calls admitted
//! while closed all run.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;

use crate::config::BreakerConfig;
use crate::error::{AppError, Result};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    /// Calls go through
    Closed,
    /// Calls are rejected without running
    Open,
    /// The next call is a trial call
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Failures counted before the breaker opens. Default: 5
    pub max_failures: u32,
    /// How long the breaker stays open after the last failure. Default: 60s
    pub timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            timeout: Duration::from_secs(60),
        }
    }
}

impl From<&BreakerConfig> for CircuitBreakerConfig {
    fn from(config: &BreakerConfig) -> Self {
        Self {
            max_failures: config.max_failures,
            timeout: config.timeout(),
        }
    }
}

/// Read-only view of a breaker for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    pub failures: u32,
    pub last_failure_time: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failures: u32,
    last_failure: Option<Instant>,
    last_failure_at: Option<DateTime<Utc>>,
}

impl BreakerInner {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            failures: 0,
            last_failure: None,
            last_failure_at: None,
        }
    }
}

/// Per-resource circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a breaker that opens after `max_failures` and cools down for `timeout`.
    pub fn new(name: impl Into<String>, max_failures: u32, timeout: Duration) -> Self {
        Self::with_config(
            name,
            CircuitBreakerConfig {
                max_failures,
                timeout,
            },
        )
    }

    /// Create a breaker with an explicit configuration.
    pub fn with_config(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerInner::closed()),
        }
    }

    pub fn from_config(name: impl Into<String>, config: &BreakerConfig) -> Self {
        Self::with_config(name, config.into())
    }

    /// Breaker for course data: 5 failures, 60 second cool-down.
    pub fn courses() -> Self {
        Self::new("courses", 5, Duration::from_secs(60))
    }

    /// Breaker for blog data: 3 failures, 30 second cool-down.
    pub fn blog() -> Self {
        Self::new("blog", 3, Duration::from_secs(30))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state, failure count and last failure time. Does not
    /// advance the state machine.
    pub fn get_state(&self) -> CircuitSnapshot {
        let inner = self.inner.lock();
        CircuitSnapshot {
            state: inner.state,
            failures: inner.failures,
            last_failure_time: inner.last_failure_at,
        }
    }

    /// Force the breaker back to closed.
    pub fn reset(&self) {
        *self.inner.lock() = BreakerInner::closed();
    }

    /// Run `operation` unless the breaker is open.
    ///
    /// An open breaker whose timeout has elapsed since the last failure
    /// moves to half-open and lets this call through. Success closes the
    /// breaker and clears the failure count; failure counts towards
    /// `max_failures` and reopens a half-open breaker.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.admit()?;
        let result = operation().await;
        match &result {
            Ok(_) => self.record_success(),
            Err(error) => self.record_failure(error),
        }
        result
    }

    fn admit(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state != CircuitState::Open {
            return Ok(());
        }

        let cooled_down = inner
            .last_failure
            .is_none_or(|at| at.elapsed() >= self.config.timeout);
        if !cooled_down {
            log::debug!("Circuit breaker '{}': OPEN, rejecting call", self.name);
            return Err(AppError::CircuitOpen {
                name: self.name.clone(),
            });
        }

        inner.state = CircuitState::HalfOpen;
        log::info!("Circuit breaker '{}': HALF-OPEN, probing upstream", self.name);
        Ok(())
    }

    fn record_success(&self) {
        let mut inner = self.inner.lock();
        if inner.state != CircuitState::Closed {
            log::info!("Circuit breaker '{}': CLOSED after successful call", self.name);
        }
        inner.state = CircuitState::Closed;
        inner.failures = 0;
    }

    fn record_failure(&self, error: &AppError) {
        let mut inner = self.inner.lock();
        inner.failures = inner.failures.saturating_add(1);
        inner.last_failure = Some(Instant::now());
        inner.last_failure_at = Some(Utc::now());

        if inner.failures >= self.config.max_failures {
            if inner.state != CircuitState::Open {
                log::error!(
                    "Circuit breaker '{}': OPEN after {} failures (last: {})",
                    self.name,
                    inner.failures,
                    error
                );
            }
            inner.state = CircuitState::Open;
        }
    }
}

/// Run `loader` through `breaker`, substituting `fallback` on any failure.
///
/// Without a fallback the failure (including an open breaker) is returned.
pub async fn safe_load_with_circuit_breaker<T, F, Fut>(
    loader: F,
    breaker: &CircuitBreaker,
    fallback: Option<T>,
) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match breaker.execute(loader).await {
        Ok(value) => Ok(value),
        Err(error) => match fallback {
            Some(value) => {
                log::warn!(
                    "Circuit breaker '{}' call failed, using fallback: {}",
                    breaker.name(),
                    error
                );
                Ok(value)
            }
            None => Err(error),
        },
    }
}
