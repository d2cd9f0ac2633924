// src/sanitize.rs

//! Best-effort coercion of malformed payloads into entities.
//!
//! Required fields are always filled: values are coerced to the expected
//! type and fall back to a fixed default when coercion fails. Optional
//! fields are copied only when present with the right type and are
//! otherwise left out. None of these functions fail; the worst case is
//! `None` for a payload with nothing to anchor on.

use serde_json::{Map, Value};

use crate::models::{BlogPost, Course};
use crate::validation::parse_date;

type Object = Map<String, Value>;

const DEFAULT_UNIVERSITY: &str = "Unknown University";
const DEFAULT_PROGRAM: &str = "Unknown Program";
const DEFAULT_CAMPUS: &str = "Main Campus";
const DEFAULT_COUNTRY: &str = "Unknown";

const DEFAULT_TITLE: &str = "Untitled";
const DEFAULT_AUTHOR: &str = "Admin";
const DEFAULT_CATEGORY: &str = "General";
const DEFAULT_DATE: &str = "1970-01-01";

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Scalar to trimmed string; empty results count as failed coercion.
fn coerce_string(value: Option<&Value>) -> Option<String> {
    let s = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// Scalar to finite number.
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn string_or(obj: &Object, field: &str, default: &str) -> String {
    coerce_string(obj.get(field)).unwrap_or_else(|| default.to_string())
}

fn number_or(obj: &Object, field: &str, default: f64) -> f64 {
    coerce_number(obj.get(field)).unwrap_or(default)
}

fn optional_string(obj: &Object, field: &str) -> Option<String> {
    match obj.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn optional_number(obj: &Object, field: &str) -> Option<f64> {
    obj.get(field).filter(|v| v.is_number()).and_then(Value::as_f64)
}

/// Keep the string elements of an array, trimmed; non-arrays are dropped.
fn string_list(obj: &Object, field: &str) -> Option<Vec<String>> {
    let items = obj.get(field)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn serial_number(value: Option<&Value>) -> u64 {
    coerce_number(value)
        .filter(|n| *n >= 1.0 && n.fract() == 0.0 && *n <= u64::MAX as f64)
        .map(|n| n as u64)
        .unwrap_or(0)
}

/// Normalize a raw course payload.
///
/// Returns `None` when the value is not an object or when `serialNo`,
/// `university` and `programName` are all missing.
pub fn sanitize_course(value: &Value) -> Option<Course> {
    let obj = value.as_object()?;
    if ["serialNo", "university", "programName"]
        .iter()
        .all(|field| is_blank(obj.get(*field)))
    {
        return None;
    }

    Some(Course {
        serial_no: serial_number(obj.get("serialNo")),
        id: coerce_string(obj.get("id")),
        university: string_or(obj, "university", DEFAULT_UNIVERSITY),
        program_name: string_or(obj, "programName", DEFAULT_PROGRAM),
        campus: string_or(obj, "campus", DEFAULT_CAMPUS),
        country: string_or(obj, "country", DEFAULT_COUNTRY),
        duration: string_or(obj, "duration", ""),
        open_intakes: string_or(obj, "openIntakes", ""),
        intake_year: string_or(obj, "intakeYear", ""),
        entry_requirements: string_or(obj, "entryRequirements", ""),
        yearly_tuition_fees: string_or(obj, "yearlyTuitionFees", ""),
        ielts_score: number_or(obj, "ieltsScore", 0.0),
        ielts_no_band_less_than: number_or(obj, "ieltsNoBandLessThan", 0.0),
        pte_score: optional_number(obj, "pteScore"),
        pte_no_band_less_than: optional_number(obj, "pteNoBandLessThan"),
        toefl_score: optional_number(obj, "toeflScore"),
        duolingo: optional_number(obj, "duolingo"),
        gmat_score: optional_number(obj, "gmatScore"),
        gre_score: optional_number(obj, "greScore"),
        study_level: optional_string(obj, "studyLevel"),
        application_deadline: optional_string(obj, "applicationDeadline"),
        scholarships: string_list(obj, "scholarships"),
        career_prospects: string_list(obj, "careerProspects"),
        accreditation: string_list(obj, "accreditation"),
        specializations: string_list(obj, "specializations"),
    })
}

/// Sanitize every recoverable element of an array payload.
pub fn sanitize_courses(value: &Value) -> Vec<Course> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(sanitize_course).collect())
        .unwrap_or_default()
}

fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Normalize a raw blog post payload.
///
/// Returns `None` unless the value is an object with an `id` or a `title`.
/// A missing id is derived from the slug, then from the title.
pub fn sanitize_blog_post(value: &Value) -> Option<BlogPost> {
    let obj = value.as_object()?;
    if is_blank(obj.get("id")) && is_blank(obj.get("title")) {
        return None;
    }

    let title = string_or(obj, "title", DEFAULT_TITLE);
    let slug = optional_string(obj, "slug");
    let id = coerce_string(obj.get("id"))
        .or_else(|| slug.clone())
        .unwrap_or_else(|| slugify(&title));
    let date = coerce_string(obj.get("date"))
        .filter(|d| parse_date(d).is_some())
        .unwrap_or_else(|| DEFAULT_DATE.to_string());

    Some(BlogPost {
        id,
        title,
        excerpt: string_or(obj, "excerpt", ""),
        content: string_or(obj, "content", ""),
        author: string_or(obj, "author", DEFAULT_AUTHOR),
        date,
        category: string_or(obj, "category", DEFAULT_CATEGORY),
        read_time: optional_number(obj, "readTime").filter(|n| *n > 0.0),
        tags: string_list(obj, "tags").unwrap_or_default(),
        image: optional_string(obj, "image"),
        slug,
    })
}
