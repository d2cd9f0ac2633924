// src/services/api.rs

//! Catalogue API client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use crate::config::ApiConfig;
use crate::error::{AppError, Result};
use crate::utils::http::{create_async_client, join_url};

/// Anything that can answer a GET with JSON.
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// Fetch `path` and decode the body.
    ///
    /// A 404 is reported as [`AppError::NotFound`], other non-success
    /// statuses as [`AppError::Status`].
    async fn get_json(&self, path: &str) -> Result<Value>;
}

/// HTTP client for the catalogue REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client from configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = create_async_client(config)?;
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL of an endpoint path.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        join_url(&self.base_url, path)
    }
}

#[async_trait]
impl JsonSource for ApiClient {
    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.endpoint(path)?;
        log::debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::not_found(path));
        }
        if !status.is_success() {
            return Err(AppError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
