//! Resilient data loading.
//!
//! - `safe`: run a loader, validate what it returns, report instead of failing
//! - `retry`: bounded attempts with linear backoff
//! - `circuit_breaker`: per-resource guard that stops calling a failing upstream

pub mod circuit_breaker;
mod envelope;
pub mod retry;
pub mod safe;

pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitSnapshot, CircuitState,
    safe_load_with_circuit_breaker,
};
pub use envelope::{LoadOptions, LoadResult};
pub use retry::{RetryPolicy, retry_data_load};
pub use safe::{
    safe_load_blog_post, safe_load_blog_posts, safe_load_course, safe_load_courses,
    safe_load_many, safe_load_one,
};
