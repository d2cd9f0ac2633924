// src/validation/blog.rs

//! Blog post schema.

use serde_json::Value;

use super::fields::{
    optional_string, optional_string_array, parse_date, present, recommend, recommend_string,
    require_non_empty_string,
};
use super::{Entity, ValidationReport};
use crate::models::BlogPost;
use crate::sanitize::sanitize_blog_post;

/// Fields every post must carry as non-empty strings.
pub(crate) const REQUIRED_FIELDS: [&str; 7] = [
    "id", "title", "excerpt", "content", "author", "date", "category",
];

/// Validate a raw blog post payload.
pub fn validate_blog_post(value: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();
    let Some(obj) = value.as_object() else {
        report.error("Blog post data must be an object");
        return report;
    };

    for field in REQUIRED_FIELDS {
        require_non_empty_string(obj, field, &mut report);
    }

    if let Some(date) = present(obj, "date") {
        if let Some(raw) = date.as_str() {
            if !raw.trim().is_empty() && parse_date(raw).is_none() {
                report.invalid("date", date, "date must be a valid date");
            }
        }
    }

    if let Some(read_time) = present(obj, "readTime") {
        if !read_time.as_f64().is_some_and(|n| n > 0.0) {
            report.invalid("readTime", read_time, "readTime must be a positive number");
        }
    }

    optional_string_array(obj, "tags", &mut report);
    optional_string(obj, "slug", &mut report);

    recommend_string(obj, "image", &mut report);
    recommend(obj, "readTime", &mut report);

    report
}

impl Entity for BlogPost {
    const LABEL: &'static str = "Blog post";

    fn validate(value: &Value) -> ValidationReport {
        validate_blog_post(value)
    }

    fn sanitize(value: &Value) -> Option<Self> {
        sanitize_blog_post(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid_post() -> Value {
        json!({
            "id": "ielts-tips",
            "title": "Ten IELTS Tips",
            "excerpt": "Score higher on test day",
            "content": "<p>Practice.</p>",
            "author": "Admissions Team",
            "date": "2024-08-01T09:00:00Z",
            "category": "Exams",
            "readTime": 5,
            "tags": ["IELTS", "exams"],
            "image": "https://cdn.example.com/ielts.jpg"
        })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut post = valid_post();
        post[field] = value;
        post
    }

    #[test]
    fn accepts_complete_post() {
        let report = validate_blog_post(&valid_post());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn rejects_non_objects() {
        let report = validate_blog_post(&json!(["not", "a", "post"]));
        assert_eq!(report.errors, ["Blog post data must be an object"]);
    }

    #[test]
    fn every_required_field_is_named_when_missing() {
        for field in REQUIRED_FIELDS {
            let mut post = valid_post();
            post.as_object_mut().unwrap().remove(field);
            let report = validate_blog_post(&post);
            assert_eq!(report.errors, [format!("Missing required field: {field}")]);
        }
    }

    #[test]
    fn id_must_be_a_string() {
        let report = validate_blog_post(&with("id", json!(17)));
        assert_eq!(report.errors, ["id must be a non-empty string"]);
    }

    #[test]
    fn date_must_parse() {
        let report = validate_blog_post(&with("date", json!("next tuesday")));
        assert_eq!(report.errors, ["date must be a valid date"]);
        assert!(validate_blog_post(&with("date", json!("2023-12-31"))).is_valid());
    }

    #[test]
    fn read_time_must_be_positive() {
        for value in [json!(0), json!(-4), json!("5 min")] {
            let report = validate_blog_post(&with("readTime", value));
            assert_eq!(report.errors, ["readTime must be a positive number"]);
        }
    }

    #[test]
    fn tags_must_be_strings() {
        let report = validate_blog_post(&with("tags", json!(["visa", null])));
        assert_eq!(report.errors, ["tags must be an array of strings"]);
    }

    #[test]
    fn missing_image_and_read_time_warn() {
        let mut post = valid_post();
        let obj = post.as_object_mut().unwrap();
        obj.remove("image");
        obj.remove("readTime");
        let report = validate_blog_post(&post);
        assert!(report.is_valid());
        assert_eq!(
            report.warnings,
            ["Missing recommended field: image", "Missing recommended field: readTime"]
        );
    }

    #[test]
    fn optional_strings_are_type_checked() {
        let report = validate_blog_post(&with("image", json!(123)));
        assert_eq!(report.errors, ["image must be a string"]);
        assert!(report.warnings.is_empty());
        assert_eq!(report.first_field(), Some("image"));

        let report = validate_blog_post(&with("slug", json!(["ielts"])));
        assert_eq!(report.errors, ["slug must be a string"]);
        assert!(BlogPost::parse(&with("slug", json!("ten-ielts-tips"))).is_ok());
    }

    #[test]
    fn null_tags_parse_as_empty() {
        let post = BlogPost::parse(&with("tags", Value::Null)).unwrap();
        assert!(post.tags.is_empty());
    }

    #[test]
    fn parse_yields_typed_post() {
        let post = BlogPost::parse(&valid_post()).unwrap();
        assert_eq!(post.tags, ["IELTS", "exams"]);
        assert!(BlogPost::parse(&with("title", json!(""))).is_err());
    }
}
