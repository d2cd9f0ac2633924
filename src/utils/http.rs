// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use url::Url;

use crate::config::ApiConfig;
use crate::error::Result;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &ApiConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Append an endpoint path to a base URL, keeping any path prefix the
/// base already has.
pub fn join_url(base: &Url, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Ok(Url::parse(&joined)?)
}

/// Percent-encode a value for use as a single path segment.
pub fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_keeps_prefix() {
        let base = Url::parse("https://example.com/backend/").unwrap();
        assert_eq!(
            join_url(&base, "/api/courses").unwrap().as_str(),
            "https://example.com/backend/api/courses"
        );

        let base = Url::parse("http://localhost:3000").unwrap();
        assert_eq!(
            join_url(&base, "api/blog").unwrap().as_str(),
            "http://localhost:3000/api/blog"
        );
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("42"), "42");
        assert_eq!(encode_segment("a b/c+d"), "a%20b%2Fc%2Bd");
    }

    #[test]
    fn test_create_client() {
        assert!(create_async_client(&ApiConfig::default()).is_ok());
    }
}
