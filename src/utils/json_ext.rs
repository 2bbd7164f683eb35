//! JSON manipulation utilities.
//!
//! Provides the `ResultPath`/JSON-pointer style path get/set used by the
//! JSONPath processing strategy, and the partial-deep-equal rule the mock
//! engine's conditional variant matches inputs against.

use serde_json::{Map, Value};

/// Get a value addressed by a dot-separated path (e.g. "user.profile.name").
///
/// # Examples
///
/// ```rust
/// use sfn_harness::utils::json_ext::get_by_path;
/// use serde_json::json;
///
/// let data = json!({"user": {"profile": {"name": "Alice"}}});
/// assert_eq!(get_by_path(&data, "user.profile.name"), Some(&json!("Alice")));
/// ```
#[must_use]
pub fn get_by_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(obj) => current = obj.get(part)?,
            Value::Array(arr) => current = arr.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Set a value at a dot-separated path, creating intermediate objects as needed.
///
/// Used by the `ResultPath` merge step: the result of a state is written back
/// into a clone of the original input at the given path; `$` (meaning
/// "replace the whole input") is handled by the caller before this is
/// reached.
///
/// # Examples
///
/// ```rust
/// use sfn_harness::utils::json_ext::set_by_path;
/// use serde_json::json;
///
/// let mut data = json!({});
/// set_by_path(&mut data, "user.name", json!("Alice"));
/// assert_eq!(data, json!({"user": {"name": "Alice"}}));
/// ```
pub fn set_by_path(target: &mut Value, path: &str, value: Value) {
    if path.is_empty() {
        *target = value;
        return;
    }
    let parts: Vec<&str> = path.split('.').collect();
    let mut current = target;
    for part in &parts[..parts.len() - 1] {
        if !matches!(current, Value::Object(_)) {
            *current = Value::Object(Map::new());
        }
        let Value::Object(obj) = current else {
            unreachable!()
        };
        current = obj
            .entry((*part).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !matches!(current, Value::Object(_)) {
        *current = Value::Object(Map::new());
    }
    let Value::Object(obj) = current else {
        unreachable!()
    };
    obj.insert(parts[parts.len() - 1].to_string(), value);
}

/// Partial-deep-equal: every key in `pattern` must appear in `actual` with an
/// equal sub-value, recursively; arrays must match length and element-wise.
/// Used by the mock engine's `conditional` variant to match a `when.input`
/// pattern against a state's actual input.
///
/// # Examples
///
/// ```rust
/// use sfn_harness::utils::json_ext::partial_deep_equal;
/// use serde_json::json;
///
/// let pattern = json!({"status": "active"});
/// let actual = json!({"status": "active", "id": 7});
/// assert!(partial_deep_equal(&pattern, &actual));
/// assert!(!partial_deep_equal(&json!({"status": "closed"}), &actual));
/// ```
#[must_use]
pub fn partial_deep_equal(pattern: &Value, actual: &Value) -> bool {
    match (pattern, actual) {
        (Value::Object(pat_obj), Value::Object(act_obj)) => pat_obj
            .iter()
            .all(|(k, v)| act_obj.get(k).is_some_and(|av| partial_deep_equal(v, av))),
        (Value::Array(pat_arr), Value::Array(act_arr)) => {
            pat_arr.len() == act_arr.len()
                && pat_arr
                    .iter()
                    .zip(act_arr.iter())
                    .all(|(p, a)| partial_deep_equal(p, a))
        }
        (pat, act) => pat == act,
    }
}
