// src/error.rs

//! Unified error handling for the data-loading layer.

use std::fmt;

use thiserror::Error;

/// Result type alias for data-loading operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A value failed schema checks
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
        value: Option<String>,
    },

    /// A loader failed after retries, or with no fallback configured
    #[error("{message}")]
    DataLoad {
        message: String,
        origin: String,
        #[source]
        original: Option<Box<AppError>>,
    },

    /// The API answered 404 for a resource
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// The API answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    /// Transport-level failure outside the HTTP client
    #[error("Network error: {0}")]
    Network(String),

    /// A circuit breaker rejected the call without running it
    #[error("Circuit breaker is open")]
    CircuitOpen { name: String },

    /// Failure reported by a caller-supplied loader
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error without field context.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
            value: None,
        }
    }

    /// Create a validation error for a specific field and offending value.
    pub fn invalid_field(
        field: impl Into<String>,
        value: impl fmt::Display,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
            value: Some(value.to_string()),
        }
    }

    /// Create a data load error wrapping the underlying failure.
    pub fn data_load(
        message: impl Into<String>,
        origin: impl Into<String>,
        original: Option<AppError>,
    ) -> Self {
        Self::DataLoad {
            message: message.into(),
            origin: origin.into(),
            original: original.map(Box::new),
        }
    }

    /// Create a not-found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a generic error from a message.
    pub fn other(message: impl fmt::Display) -> Self {
        Self::Other(message.to_string())
    }

    /// Whether the failure happened at the transport level (the request
    /// never produced a response).
    pub fn is_network(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            Self::Network(_) => true,
            Self::DataLoad {
                original: Some(inner),
                ..
            } => inner.is_network(),
            _ => false,
        }
    }

    /// Whether the API reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Status { status, .. } => *status == 404,
            Self::DataLoad {
                original: Some(inner),
                ..
            } => inner.is_not_found(),
            _ => false,
        }
    }
}
