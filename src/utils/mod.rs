//! Utility functions and helpers.

pub mod http;

use serde_json::Value;

/// Keys a list endpoint may wrap its array under, besides resource names.
const LIST_WRAPPERS: [&str; 2] = ["data", "items"];

/// Pull the array out of a list response.
///
/// Accepts a bare array, or an object holding the array under `data`,
/// `items` or one of `names`. Anything else is returned untouched.
pub fn unwrap_list(value: Value, names: &[&str]) -> Value {
    match value {
        Value::Object(mut obj) => {
            let key = LIST_WRAPPERS
                .iter()
                .chain(names)
                .find(|key| obj.get(**key).is_some_and(Value::is_array))
                .map(|key| key.to_string());
            match key.and_then(|key| obj.remove(&key)) {
                Some(list) => list,
                None => Value::Object(obj),
            }
        }
        other => other,
    }
}

/// Pull the record out of a single-entity response wrapped under `data`
/// or one of `names`.
pub fn unwrap_item(value: Value, names: &[&str]) -> Value {
    match value {
        Value::Object(mut obj) => {
            let key = ["data"]
                .iter()
                .chain(names)
                .find(|key| obj.get(**key).is_some_and(Value::is_object))
                .map(|key| key.to_string());
            match key.and_then(|key| obj.remove(&key)) {
                Some(item) => item,
                None => Value::Object(obj),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unwrap_list() {
        assert_eq!(unwrap_list(json!([1, 2]), &["courses"]), json!([1, 2]));
        assert_eq!(unwrap_list(json!({ "data": [1] }), &["courses"]), json!([1]));
        assert_eq!(
            unwrap_list(json!({ "courses": [3], "total": 1 }), &["courses"]),
            json!([3])
        );
        assert_eq!(
            unwrap_list(json!({ "message": "oops" }), &["courses"]),
            json!({ "message": "oops" })
        );
    }

    #[test]
    fn test_unwrap_item() {
        assert_eq!(
            unwrap_item(json!({ "data": { "id": "a" } }), &["post"]),
            json!({ "id": "a" })
        );
        assert_eq!(
            unwrap_item(json!({ "course": { "serialNo": 1 } }), &["course"]),
            json!({ "serialNo": 1 })
        );
        assert_eq!(unwrap_item(json!({ "id": "a" }), &["post"]), json!({ "id": "a" }));
        assert_eq!(unwrap_item(Value::Null, &["post"]), Value::Null);
    }
}
