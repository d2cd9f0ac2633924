// src/validation/fields.rs

//! Field-level checks shared by the entity validators.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use super::ValidationReport;

pub(crate) type Object = Map<String, Value>;

/// The value of a field, treating `null` the same as absence.
pub(crate) fn present<'a>(obj: &'a Object, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

pub(crate) fn require_non_empty_string(obj: &Object, field: &str, report: &mut ValidationReport) {
    match present(obj, field) {
        None => report.missing(field),
        Some(Value::String(s)) if !s.trim().is_empty() => {}
        Some(v) => report.invalid(field, v, format!("{field} must be a non-empty string")),
    }
}

pub(crate) fn require_string(obj: &Object, field: &str, report: &mut ValidationReport) {
    match present(obj, field) {
        None => report.missing(field),
        Some(Value::String(_)) => {}
        Some(v) => report.invalid(field, v, format!("{field} must be a string")),
    }
}

fn in_range(value: &Value, min: f64, max: f64) -> bool {
    value.as_f64().is_some_and(|n| (min..=max).contains(&n))
}

/// A required number inside an inclusive range.
pub(crate) fn require_number_in_range(
    obj: &Object,
    field: &str,
    min: f64,
    max: f64,
    report: &mut ValidationReport,
) {
    match present(obj, field) {
        None => report.missing(field),
        Some(v) if in_range(v, min, max) => {}
        Some(v) => report.invalid(field, v, format!("{field} must be a number between {min} and {max}")),
    }
}

/// An optional number inside an inclusive range; `null` means unset.
pub(crate) fn optional_number_in_range(
    obj: &Object,
    field: &str,
    min: f64,
    max: f64,
    report: &mut ValidationReport,
) {
    if let Some(v) = present(obj, field) {
        if !in_range(v, min, max) {
            report.invalid(field, v, format!("{field} must be a number between {min} and {max}"));
        }
    }
}

/// An optional number with no known bound; only the type is checked.
pub(crate) fn optional_number(obj: &Object, field: &str, report: &mut ValidationReport) {
    if let Some(v) = present(obj, field) {
        if !v.is_number() {
            report.invalid(field, v, format!("{field} must be a number"));
        }
    }
}

/// An optional array whose elements must all be strings.
pub(crate) fn optional_string_array(obj: &Object, field: &str, report: &mut ValidationReport) {
    if let Some(v) = present(obj, field) {
        let ok = v
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string));
        if !ok {
            report.invalid(field, v, format!("{field} must be an array of strings"));
        }
    }
}

/// An optional string; `null` means unset.
pub(crate) fn optional_string(obj: &Object, field: &str, report: &mut ValidationReport) {
    if let Some(v) = present(obj, field) {
        if !v.is_string() {
            report.invalid(field, v, format!("{field} must be a string"));
        }
    }
}

/// An optional identifier sent either as a string or as a number.
pub(crate) fn optional_id(obj: &Object, field: &str, report: &mut ValidationReport) {
    if let Some(v) = present(obj, field) {
        if !(v.is_string() || v.is_number()) {
            report.invalid(field, v, format!("{field} must be a string or a number"));
        }
    }
}

/// Warn when a recommended field is absent, null or blank.
///
/// The field's type is checked separately; a present value is never
/// reported here.
pub(crate) fn recommend(obj: &Object, field: &str, report: &mut ValidationReport) {
    let missing = match present(obj, field) {
        None => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    };
    if missing {
        report.warn(format!("Missing recommended field: {field}"));
    }
}

/// A recommended string: a wrong type is an error, absence a warning.
pub(crate) fn recommend_string(obj: &Object, field: &str, report: &mut ValidationReport) {
    optional_string(obj, field, report);
    recommend(obj, field, report);
}

/// Parse the date formats the API is known to send.
///
/// Accepts RFC 3339, RFC 2822, `YYYY-MM-DD` and `YYYY-MM-DDTHH:MM:SS[.fff]`
/// (read as UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Object {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn null_counts_as_missing() {
        let obj = object(json!({ "title": null }));
        let mut report = ValidationReport::default();
        require_non_empty_string(&obj, "title", &mut report);
        assert_eq!(report.errors, ["Missing required field: title"]);
    }

    #[test]
    fn string_array_rejects_mixed_elements() {
        let obj = object(json!({ "tags": ["a", 1], "ok": ["a", "b"], "empty": [] }));
        let mut report = ValidationReport::default();
        optional_string_array(&obj, "tags", &mut report);
        optional_string_array(&obj, "ok", &mut report);
        optional_string_array(&obj, "empty", &mut report);
        optional_string_array(&obj, "absent", &mut report);
        assert_eq!(report.errors, ["tags must be an array of strings"]);
    }

    #[test]
    fn range_check_is_inclusive() {
        let mut report = ValidationReport::default();
        for n in [0.0, 4.5, 9.0] {
            let obj = object(json!({ "ieltsScore": n }));
            require_number_in_range(&obj, "ieltsScore", 0.0, 9.0, &mut report);
        }
        assert!(report.is_valid());

        for n in [-1.0, 9.1] {
            let obj = object(json!({ "ieltsScore": n }));
            require_number_in_range(&obj, "ieltsScore", 0.0, 9.0, &mut report);
        }
        let obj = object(json!({ "ieltsScore": "7" }));
        require_number_in_range(&obj, "ieltsScore", 0.0, 9.0, &mut report);
        assert_eq!(report.errors.len(), 3);
        assert_eq!(report.errors[0], "ieltsScore must be a number between 0 and 9");
    }

    #[test]
    fn recommended_string_checks_type() {
        let obj = object(json!({ "studyLevel": 5, "image": "", "slug": null, "id": 12 }));
        let mut report = ValidationReport::default();
        recommend_string(&obj, "studyLevel", &mut report);
        recommend_string(&obj, "image", &mut report);
        recommend_string(&obj, "applicationDeadline", &mut report);
        optional_string(&obj, "slug", &mut report);
        optional_id(&obj, "id", &mut report);
        assert_eq!(report.errors, ["studyLevel must be a string"]);
        assert_eq!(report.first_field(), Some("studyLevel"));
        assert_eq!(
            report.warnings,
            [
                "Missing recommended field: image",
                "Missing recommended field: applicationDeadline"
            ]
        );

        let obj = object(json!({ "id": { "value": 1 } }));
        let mut report = ValidationReport::default();
        optional_id(&obj, "id", &mut report);
        assert_eq!(report.errors, ["id must be a string or a number"]);
    }

    #[test]
    fn parses_known_date_formats() {
        assert!(parse_date("2024-05-01").is_some());
        assert!(parse_date("2024-05-01T10:30:00Z").is_some());
        assert!(parse_date("2024-05-01T10:30:00.250").is_some());
        assert!(parse_date("2024-05-01T10:30:00").is_some());
        assert!(parse_date("Wed, 01 May 2024 10:30:00 +0000").is_some());
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("2024-13-01").is_none());
        assert!(parse_date("").is_none());
    }
}
