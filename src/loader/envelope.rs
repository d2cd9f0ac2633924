// src/loader/envelope.rs

//! Options and result envelope shared by the safe loaders.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{Entity, ValidationReport};

/// Safe loader behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Run the validator over loaded items
    #[serde(default = "enabled")]
    pub validate_items: bool,

    /// Log validation problems and loader failures
    #[serde(default = "enabled")]
    pub log_errors: bool,

    /// Return an error instead of the fallback when loading fails
    #[serde(default)]
    pub throw_on_failure: bool,
}

fn enabled() -> bool {
    true
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            validate_items: true,
            log_errors: true,
            throw_on_failure: false,
        }
    }
}

impl LoadOptions {
    pub fn throwing(mut self) -> Self {
        self.throw_on_failure = true;
        self
    }

    pub fn quiet(mut self) -> Self {
        self.log_errors = false;
        self
    }

    pub fn without_validation(mut self) -> Self {
        self.validate_items = false;
        self
    }
}

/// Loaded data together with what was wrong with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadResult<T> {
    pub data: T,
    pub has_errors: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl<T> LoadResult<T> {
    /// Clean result with no findings.
    pub fn ok(data: T) -> Self {
        Self {
            data,
            has_errors: false,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Result carrying a validation report's findings.
    pub fn with_report(data: T, report: ValidationReport) -> Self {
        Self {
            data,
            has_errors: !report.errors.is_empty(),
            errors: report.errors,
            warnings: report.warnings,
        }
    }

    /// Result for a failed load, carrying the fallback.
    pub fn failed(fallback: T, message: impl Into<String>) -> Self {
        Self {
            data: fallback,
            has_errors: true,
            errors: vec![message.into()],
            warnings: Vec::new(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadResult<U> {
        LoadResult {
            data: f(self.data),
            has_errors: self.has_errors,
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}

impl LoadResult<Value> {
    /// Keep only the elements that parse as `E`.
    ///
    /// This is the one place loaded lists are filtered: safe loaders
    /// report, callers that want typed data come through here. Every
    /// dropped element is described in `errors` under its 1-based label.
    pub fn into_entities<E: Entity>(self) -> LoadResult<Vec<E>> {
        let LoadResult {
            data,
            mut has_errors,
            mut errors,
            warnings,
        } = self;

        let items = match data {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            _ => {
                has_errors = true;
                errors.push(format!("Expected a list of {} records", E::LABEL));
                Vec::new()
            }
        };

        let total = items.len();
        let mut entities: Vec<E> = Vec::with_capacity(total);
        for (index, item) in items.iter().enumerate() {
            match E::parse(item) {
                Ok(entity) => entities.push(entity),
                Err(report) => {
                    has_errors = true;
                    let label = format!("{} {}", E::LABEL, index + 1);
                    for error in report.prefixed(&label).errors {
                        if !errors.contains(&error) {
                            errors.push(error);
                        }
                    }
                }
            }
        }
        let dropped = total - entities.len();
        if dropped > 0 {
            log::warn!(
                "Dropped {} of {} {} records that failed validation",
                dropped,
                total,
                E::LABEL
            );
        }

        LoadResult {
            data: entities,
            has_errors,
            errors,
            warnings,
        }
    }
}

impl LoadResult<Option<Value>> {
    /// Parse a singular payload; a value that does not parse becomes `None`.
    pub fn into_entity<E: Entity>(self) -> LoadResult<Option<E>> {
        let mut result = self.map(|data| data.map(|value| E::parse(&value)));
        match result.data.take() {
            Some(Ok(entity)) => result.map(|_| Some(entity)),
            Some(Err(report)) => {
                result.has_errors = true;
                for error in report.errors {
                    if !result.errors.contains(&error) {
                        result.errors.push(error);
                    }
                }
                result.map(|_| None)
            }
            None => result.map(|_| None),
        }
    }
}
