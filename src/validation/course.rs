// src/validation/course.rs

//! Course schema.

use serde_json::Value;

use super::fields::{
    optional_id, optional_number, optional_number_in_range, optional_string_array, present,
    recommend_string, require_non_empty_string, require_number_in_range, require_string,
};
use super::{Entity, ValidationReport};
use crate::models::Course;
use crate::sanitize::sanitize_course;

/// Descriptive fields that must be non-empty strings.
pub(crate) const DESCRIPTIVE_FIELDS: [&str; 4] = ["university", "programName", "campus", "country"];

/// Free-text logistics fields; any string is accepted.
pub(crate) const LOGISTICS_FIELDS: [&str; 5] = [
    "duration",
    "openIntakes",
    "intakeYear",
    "entryRequirements",
    "yearlyTuitionFees",
];

/// Optional string-array fields.
pub(crate) const LIST_FIELDS: [&str; 4] = [
    "scholarships",
    "careerProspects",
    "accreditation",
    "specializations",
];

/// Validate a raw course payload.
pub fn validate_course(value: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();
    let Some(obj) = value.as_object() else {
        report.error("Course data must be an object");
        return report;
    };

    match present(obj, "serialNo") {
        None => report.missing("serialNo"),
        Some(v) if v.as_u64().is_some_and(|n| n > 0) => {}
        Some(v) => report.invalid("serialNo", v, "serialNo must be a positive integer"),
    }
    optional_id(obj, "id", &mut report);

    for field in DESCRIPTIVE_FIELDS {
        require_non_empty_string(obj, field, &mut report);
    }
    for field in LOGISTICS_FIELDS {
        require_string(obj, field, &mut report);
    }

    require_number_in_range(obj, "ieltsScore", 0.0, 9.0, &mut report);
    require_number_in_range(obj, "ieltsNoBandLessThan", 0.0, 9.0, &mut report);
    optional_number_in_range(obj, "pteScore", 0.0, 90.0, &mut report);
    optional_number_in_range(obj, "pteNoBandLessThan", 0.0, 90.0, &mut report);
    optional_number_in_range(obj, "toeflScore", 0.0, 120.0, &mut report);
    optional_number_in_range(obj, "duolingo", 0.0, 160.0, &mut report);
    optional_number(obj, "gmatScore", &mut report);
    optional_number(obj, "greScore", &mut report);

    for field in LIST_FIELDS {
        optional_string_array(obj, field, &mut report);
    }

    recommend_string(obj, "studyLevel", &mut report);
    recommend_string(obj, "applicationDeadline", &mut report);

    report
}

impl Entity for Course {
    const LABEL: &'static str = "Course";

    fn validate(value: &Value) -> ValidationReport {
        validate_course(value)
    }

    fn sanitize(value: &Value) -> Option<Self> {
        sanitize_course(value)
    }
}
