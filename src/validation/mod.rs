// src/validation/mod.rs

//! Schema checks for raw API payloads.
//!
//! Validators are pure: they take any JSON value and report errors
//! (the value is unusable as the entity) and warnings (recommended
//! fields are missing). Nothing here logs or performs I/O.

mod blog;
mod course;
mod fields;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;

pub use blog::validate_blog_post;
pub use course::validate_course;
pub use fields::parse_date;

/// Outcome of validating one candidate value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// First field that failed, with its offending value when present
    #[serde(skip)]
    first_failure: Option<(String, Option<String>)>,
}

impl ValidationReport {
    /// A report holding a single error.
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            warnings: Vec::new(),
            first_failure: None,
        }
    }

    /// True exactly when there are no errors; warnings never count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Record an error against a field and the value it held.
    pub(crate) fn invalid(&mut self, field: &str, value: &Value, message: impl Into<String>) {
        self.note_failure(field, Some(value.to_string()));
        self.error(message);
    }

    pub(crate) fn missing(&mut self, field: &str) {
        self.note_failure(field, None);
        self.error(format!("Missing required field: {field}"));
    }

    fn note_failure(&mut self, field: &str, value: Option<String>) {
        if self.first_failure.is_none() && self.errors.is_empty() {
            self.first_failure = Some((field.to_string(), value));
        }
    }

    /// Name of the first field that failed, if the first error was field-level.
    pub fn first_field(&self) -> Option<&str> {
        self.first_failure.as_ref().map(|(field, _)| field.as_str())
    }

    /// Append another report's messages.
    pub fn merge(&mut self, other: ValidationReport) {
        if self.errors.is_empty() && self.first_failure.is_none() {
            self.first_failure = other.first_failure;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Prefix every message with a label, e.g. `"Course 3"`.
    pub fn prefixed(self, label: &str) -> Self {
        let prefix = |m: String| format!("{label}: {m}");
        Self {
            errors: self.errors.into_iter().map(prefix).collect(),
            warnings: self.warnings.into_iter().map(prefix).collect(),
            first_failure: self.first_failure,
        }
    }

    /// Turn the errors into a single validation error carrying the first
    /// failing field and value.
    pub fn into_error(self, label: &str) -> AppError {
        let message = format!("Invalid {label}: {}", self.errors.join("; "));
        match self.first_failure {
            Some((field, Some(value))) => AppError::invalid_field(field, value, message),
            Some((field, None)) => AppError::Validation {
                message,
                field: Some(field),
                value: None,
            },
            None => AppError::validation(message),
        }
    }
}

/// A record shape that can be validated, sanitized and parsed from JSON.
pub trait Entity: DeserializeOwned + Sized {
    /// Human label used in messages, e.g. `"Course"`.
    const LABEL: &'static str;

    /// Check a raw value against the entity schema.
    fn validate(value: &Value) -> ValidationReport;

    /// Best-effort coercion into the entity, `None` when unrecoverable.
    fn sanitize(value: &Value) -> Option<Self>;

    /// Validate, then build the typed entity.
    fn parse(value: &Value) -> Result<Self, ValidationReport> {
        let report = Self::validate(value);
        if !report.is_valid() {
            return Err(report);
        }
        serde_json::from_value(value.clone()).map_err(|e| {
            ValidationReport::from_error(format!("{} could not be read: {e}", Self::LABEL))
        })
    }
}
