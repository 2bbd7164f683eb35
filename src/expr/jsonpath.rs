//! The JSONPath expression evaluator: path extraction over `jsonpath_lib`
//! plus dispatch into the `States.*` intrinsic family.

use super::intrinsics;
use crate::error::EvalError;
use serde_json::Value;

/// Evaluate a JSONPath expression against `data`, returning the first match
/// or `Value::Null` when nothing matches (AWS semantics: a miss is `null`,
/// not an error — callers that need to distinguish missing-vs-null use
/// `path_exists` instead).
pub fn evaluate(path: &str, data: &Value) -> Result<Value, EvalError> {
    let mut matches = jsonpath_lib::select(data, path).map_err(|e| EvalError::JsonPath {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    Ok(matches.pop().cloned().unwrap_or(Value::Null))
}

/// `true` when `path` resolves to at least one value (including an explicit
/// `null`), `false` when the path has no match at all. Backs the `IsPresent`
/// choice operator, which AWS defines over raw path existence.
pub fn path_exists(path: &str, data: &Value) -> bool {
    jsonpath_lib::select(data, path)
        .map(|matches| !matches.is_empty())
        .unwrap_or(false)
}

/// Evaluate a `States.Name(arg1, arg2, ...)` intrinsic call string against
/// `data`/`bindings`, recursively evaluating any nested JSONPath or
/// intrinsic arguments first.
pub fn evaluate_intrinsic(
    expr: &str,
    data: &Value,
    bindings: &std::collections::BTreeMap<String, Value>,
) -> Result<Value, EvalError> {
    let (name, raw_args) = parse_call(expr).ok_or_else(|| EvalError::BadIntrinsicArgs {
        name: expr.to_string(),
        reason: "not a States.* call expression".to_string(),
    })?;
    let args = raw_args
        .into_iter()
        .map(|arg| evaluate_argument(arg.trim(), data, bindings))
        .collect::<Result<Vec<_>, _>>()?;
    intrinsics::call(name.trim_start_matches("States."), &args)
}

fn evaluate_argument(
    arg: &str,
    data: &Value,
    bindings: &std::collections::BTreeMap<String, Value>,
) -> Result<Value, EvalError> {
    if arg.starts_with("States.") {
        evaluate_intrinsic(arg, data, bindings)
    } else if let Some(var_name) = arg.strip_prefix('$').filter(|rest| {
        !rest.starts_with('.') && !rest.starts_with('[') && !rest.is_empty()
    }) {
        bindings
            .get(var_name)
            .cloned()
            .ok_or_else(|| EvalError::UnboundVariable {
                name: var_name.to_string(),
            })
    } else if arg.starts_with('$') {
        evaluate(arg, data)
    } else if let Ok(number) = arg.parse::<f64>() {
        Ok(serde_json::json!(number))
    } else if arg.starts_with('\'') && arg.ends_with('\'') && arg.len() >= 2 {
        Ok(serde_json::json!(&arg[1..arg.len() - 1]))
    } else {
        serde_json::from_str(arg).map_err(|_| EvalError::BadIntrinsicArgs {
            name: arg.to_string(),
            reason: "could not evaluate intrinsic argument".to_string(),
        })
    }
}

/// Split `States.Name(a, b, c)` into `("States.Name", ["a", "b", "c"])`,
/// respecting nested parens/brackets and quoted strings when splitting on
/// commas.
fn parse_call(expr: &str) -> Option<(&str, Vec<&str>)> {
    let expr = expr.trim();
    let open = expr.find('(')?;
    if !expr.ends_with(')') {
        return None;
    }
    let name = &expr[..open];
    let inner = &expr[open + 1..expr.len() - 1];
    if inner.trim().is_empty() {
        return Some((name, Vec::new()));
    }
    Some((name, split_args(inner)))
}

fn split_args(inner: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut in_quotes = false;
    let mut start = 0usize;
    let bytes = inner.as_bytes();
    for (i, c) in inner.char_indices() {
        match c {
            '\'' => in_quotes = !in_quotes,
            '(' | '[' if !in_quotes => depth += 1,
            ')' | ']' if !in_quotes => depth -= 1,
            ',' if depth == 0 && !in_quotes => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let _ = bytes;
    args.push(inner[start..].trim());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn evaluate_returns_null_on_miss() {
        let data = json!({"a": 1});
        assert_eq!(evaluate("$.missing", &data).unwrap(), Value::Null);
    }

    #[test]
    fn path_exists_distinguishes_null_field_from_missing() {
        let data = json!({"a": null});
        assert!(path_exists("$.a", &data));
        assert!(!path_exists("$.b", &data));
    }

    #[test]
    fn evaluate_intrinsic_resolves_nested_jsonpath_args() {
        let data = json!({"v": 7});
        let bindings = Default::default();
        let result = evaluate_intrinsic("States.MathAdd($.v, $.v)", &data, &bindings).unwrap();
        assert_eq!(result, json!(14));
    }

    #[test]
    fn parse_call_splits_nested_args() {
        let (name, args) = parse_call("States.Array(States.MathAdd(1, 2), 'x')").unwrap();
        assert_eq!(name, "States.Array");
        assert_eq!(args, vec!["States.MathAdd(1, 2)", "'x'"]);
    }
}
