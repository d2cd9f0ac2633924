// src/loader/safe.rs

//! Safe loaders: run a loader, validate its payload, report problems.
//!
//! Loaded data is returned as-is, invalid items included. Failures become
//! the fallback plus an error message unless `throw_on_failure` is set.

use std::future::Future;

use serde_json::Value;

use crate::error::{AppError, Result};
use crate::loader::{LoadOptions, LoadResult};
use crate::models::{BlogPost, Course};
use crate::validation::{Entity, ValidationReport};

fn log_report(label: &str, report: &ValidationReport) {
    if !report.errors.is_empty() {
        log::error!(
            "{} data validation errors: {}",
            label,
            report.errors.join("; ")
        );
    }
    if !report.warnings.is_empty() {
        log::warn!(
            "{} data validation warnings: {}",
            label,
            report.warnings.join("; ")
        );
    }
}

fn load_failure<T>(
    label: &str,
    error: AppError,
    fallback: T,
    options: &LoadOptions,
) -> Result<LoadResult<T>> {
    let message = error.to_string();
    if options.log_errors {
        log::error!("Failed to load {} data: {}", label, message);
    }
    if options.throw_on_failure {
        return Err(AppError::data_load(
            format!("Failed to load {} data: {}", label.to_lowercase(), message),
            label,
            Some(error),
        ));
    }
    Ok(LoadResult::failed(fallback, message))
}

/// Load a list of `E` records.
///
/// When the payload is an array and `validate_items` is set, each element
/// is validated and its messages are prefixed with a 1-based label such as
/// `"Course 3: "`. A payload of another shape is returned unvalidated.
pub async fn safe_load_many<E, F, Fut>(
    loader: F,
    fallback: Value,
    options: &LoadOptions,
) -> Result<LoadResult<Value>>
where
    E: Entity,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    let data = match loader().await {
        Ok(data) => data,
        Err(error) => return load_failure(E::LABEL, error, fallback, options),
    };

    let mut report = ValidationReport::default();
    if options.validate_items {
        if let Some(items) = data.as_array() {
            for (index, item) in items.iter().enumerate() {
                let label = format!("{} {}", E::LABEL, index + 1);
                report.merge(E::validate(item).prefixed(&label));
            }
        }
    }

    if options.log_errors {
        log_report(E::LABEL, &report);
    }

    Ok(LoadResult::with_report(data, report))
}

/// Load a single `E` record.
///
/// A `null` payload means "not found" and yields `None` with no errors.
/// An invalid record yields `None` with the validation errors, or a
/// validation error when `throw_on_failure` is set.
pub async fn safe_load_one<E, F, Fut>(
    loader: F,
    options: &LoadOptions,
) -> Result<LoadResult<Option<Value>>>
where
    E: Entity,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    let data = match loader().await {
        Ok(Value::Null) => return Ok(LoadResult::ok(None)),
        Ok(data) => data,
        Err(error) => return load_failure(E::LABEL, error, None, options),
    };

    if !options.validate_items {
        return Ok(LoadResult::ok(Some(data)));
    }

    let report = E::validate(&data);
    if options.log_errors {
        log_report(E::LABEL, &report);
    }

    if report.is_valid() {
        return Ok(LoadResult::with_report(Some(data), report));
    }
    if options.throw_on_failure {
        return Err(report.into_error(E::LABEL));
    }
    Ok(LoadResult::with_report(None, report))
}

pub async fn safe_load_courses<F, Fut>(
    loader: F,
    fallback: Value,
    options: &LoadOptions,
) -> Result<LoadResult<Value>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    safe_load_many::<Course, _, _>(loader, fallback, options).await
}

pub async fn safe_load_course<F, Fut>(
    loader: F,
    options: &LoadOptions,
) -> Result<LoadResult<Option<Value>>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    safe_load_one::<Course, _, _>(loader, options).await
}

pub async fn safe_load_blog_posts<F, Fut>(
    loader: F,
    fallback: Value,
    options: &LoadOptions,
) -> Result<LoadResult<Value>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    safe_load_many::<BlogPost, _, _>(loader, fallback, options).await
}

pub async fn safe_load_blog_post<F, Fut>(
    loader: F,
    options: &LoadOptions,
) -> Result<LoadResult<Option<Value>>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    safe_load_one::<BlogPost, _, _>(loader, options).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn course(serial: u64, ielts: f64) -> Value {
        json!({
            "serialNo": serial,
            "university": "X",
            "programName": "Y",
            "campus": "Main",
            "country": "UK",
            "duration": "1 year",
            "openIntakes": "September",
            "intakeYear": "2025",
            "entryRequirements": "2:1",
            "yearlyTuitionFees": "GBP 30,000",
            "ieltsScore": ielts,
            "ieltsNoBandLessThan": 6,
            "studyLevel": "Masters",
            "applicationDeadline": "June"
        })
    }

    #[tokio::test]
    async fn reports_invalid_items_without_filtering() {
        let payload = json!([course(1, -5.0)]);
        let expected = payload.clone();

        let result = safe_load_courses(|| async { Ok(payload) }, json!([]), &LoadOptions::default())
            .await
            .unwrap();

        assert!(result.has_errors);
        assert_eq!(
            result.errors,
            ["Course 1: ieltsScore must be a number between 0 and 9"]
        );
        assert_eq!(result.data, expected);
    }

    #[tokio::test]
    async fn labels_are_one_based_and_collect_warnings() {
        let mut third = course(3, 6.0);
        third.as_object_mut().unwrap().remove("studyLevel");
        let payload = json!([course(1, 6.0), course(2, 6.0), third]);

        let result = safe_load_courses(|| async { Ok(payload) }, json!([]), &LoadOptions::default())
            .await
            .unwrap();

        assert!(!result.has_errors);
        assert_eq!(result.warnings, ["Course 3: Missing recommended field: studyLevel"]);
    }

    #[tokio::test]
    async fn loader_failure_returns_fallback() {
        let result = safe_load_courses(
            || async { Err(AppError::other("boom")) },
            json!([]),
            &LoadOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(result.data, json!([]));
        assert!(result.has_errors);
        assert_eq!(result.errors, ["boom"]);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn loader_failure_throws_when_asked() {
        let err = safe_load_blog_posts(
            || async { Err(AppError::other("boom")) },
            json!([]),
            &LoadOptions::default().throwing(),
        )
        .await
        .unwrap_err();

        match err {
            AppError::DataLoad {
                message,
                origin,
                original,
            } => {
                assert_eq!(message, "Failed to load blog post data: boom");
                assert_eq!(origin, "Blog post");
                assert_eq!(original.map(|e| e.to_string()), Some("boom".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn skips_validation_when_disabled() {
        let payload = json!([course(1, 42.0)]);
        let result = safe_load_courses(
            || async { Ok(payload) },
            json!([]),
            &LoadOptions::default().without_validation(),
        )
        .await
        .unwrap();
        assert!(!result.has_errors);
    }

    #[tokio::test]
    async fn single_invalid_course_becomes_none() {
        let result = safe_load_course(|| async { Ok(course(4, 11.0)) }, &LoadOptions::default())
            .await
            .unwrap();
        assert!(result.data.is_none());
        assert!(result.has_errors);
        assert_eq!(result.errors, ["ieltsScore must be a number between 0 and 9"]);
    }

    #[tokio::test]
    async fn single_invalid_course_throws_validation_error() {
        let err = safe_load_course(
            || async { Ok(course(4, 11.0)) },
            &LoadOptions::default().throwing(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("ieltsScore"));
        match err {
            AppError::Validation { field, value, .. } => {
                assert_eq!(field.as_deref(), Some("ieltsScore"));
                assert_eq!(value.as_deref(), Some("11.0"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_field_error_names_field_without_value() {
        let mut payload = course(4, 7.0);
        payload.as_object_mut().unwrap().remove("university");
        let err = safe_load_course(|| async { Ok(payload) }, &LoadOptions::default().throwing())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation { field: Some(ref f), value: None, .. } if f == "university"
        ));
    }

    #[tokio::test]
    async fn single_valid_and_missing() {
        let result = safe_load_course(|| async { Ok(course(4, 7.0)) }, &LoadOptions::default())
            .await
            .unwrap();
        assert!(result.data.is_some());
        assert!(!result.has_errors);

        let result = safe_load_blog_post(|| async { Ok(Value::Null) }, &LoadOptions::default())
            .await
            .unwrap();
        assert!(result.data.is_none());
        assert!(!result.has_errors);
    }
}
