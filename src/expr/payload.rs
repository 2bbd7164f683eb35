//! The JSONPath "payload template" processor: evaluates the `key.$`
//! convention used by `Parameters`/`ResultSelector`/`ItemSelector` in
//! JSONPath-mode states.

use super::jsonpath;
use crate::error::EvalError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Evaluate a payload template against `data`, the variable `bindings`, and
/// the synthesized `$$` context object.
///
/// Recurses into plain object/array structure; any key ending in `.$` is
/// replaced (key suffix stripped) by evaluating its string value as either a
/// context reference (`$$....`), an intrinsic call (`States....`), a variable
/// reference (`$name...`), or a plain JSONPath expression.
pub fn evaluate_template(
    template: &Value,
    data: &Value,
    bindings: &BTreeMap<String, Value>,
    context_object: &Value,
) -> Result<Value, EvalError> {
    match template {
        Value::Object(obj) => {
            let mut out = serde_json::Map::new();
            for (key, value) in obj {
                if let Some(base) = key.strip_suffix(".$") {
                    let expr = value.as_str().ok_or_else(|| EvalError::BadIntrinsicArgs {
                        name: key.clone(),
                        reason: "a '.$' key must have a string expression value".to_string(),
                    })?;
                    out.insert(base.to_string(), evaluate_expr(expr, data, bindings, context_object)?);
                } else {
                    out.insert(
                        key.clone(),
                        evaluate_template(value, data, bindings, context_object)?,
                    );
                }
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => {
            let evaluated = items
                .iter()
                .map(|item| evaluate_template(item, data, bindings, context_object))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(evaluated))
        }
        scalar => Ok(scalar.clone()),
    }
}

fn evaluate_expr(
    expr: &str,
    data: &Value,
    bindings: &BTreeMap<String, Value>,
    context_object: &Value,
) -> Result<Value, EvalError> {
    if let Some(context_path) = expr.strip_prefix("$$") {
        let path = if context_path.is_empty() {
            "$".to_string()
        } else {
            format!("${context_path}")
        };
        return jsonpath::evaluate(&path, context_object);
    }
    if expr.starts_with("States.") {
        return jsonpath::evaluate_intrinsic(expr, data, bindings);
    }
    if let Some(rest) = expr.strip_prefix('$') {
        if !rest.starts_with('.') && !rest.starts_with('[') && !rest.is_empty() {
            let (var_name, residual) = split_variable_reference(rest);
            let base = bindings
                .get(var_name)
                .cloned()
                .ok_or_else(|| EvalError::UnboundVariable {
                    name: var_name.to_string(),
                })?;
            return if residual.is_empty() {
                Ok(base)
            } else {
                jsonpath::evaluate(&format!("${residual}"), &base)
            };
        }
    }
    jsonpath::evaluate(expr, data)
}

/// Split `"name.sub.path"` into `("name", ".sub.path")`.
fn split_variable_reference(rest: &str) -> (&str, &str) {
    let split_at = rest
        .find(['.', '['])
        .unwrap_or(rest.len());
    (&rest[..split_at], &rest[split_at..])
}

/// Build the `{Map: {Item: {Index, Value}}, Input: <original>}` context used
/// while evaluating a Map iteration's `ItemSelector`/`Parameters`.
pub fn map_item_context(index: usize, value: &Value, original_input: &Value) -> Value {
    serde_json::json!({
        "Map": {"Item": {"Index": index, "Value": value}},
        "Input": original_input,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_dollar_suffix_and_evaluates_jsonpath() {
        let template = json!({"id.$": "$.id", "tag": "x"});
        let data = json!({"id": 7});
        let bindings = BTreeMap::new();
        let result = evaluate_template(&template, &data, &bindings, &Value::Null).unwrap();
        assert_eq!(result, json!({"id": 7, "tag": "x"}));
    }

    #[test]
    fn resolves_intrinsic_calls() {
        let template = json!({"doubled.$": "States.MathAdd($.v, $.v)"});
        let data = json!({"v": 7});
        let result = evaluate_template(&template, &data, &BTreeMap::new(), &Value::Null).unwrap();
        assert_eq!(result, json!({"doubled": 14}));
    }

    #[test]
    fn resolves_variable_references_with_residual_path() {
        let template = json!({"name.$": "$user.profile.name"});
        let mut bindings = BTreeMap::new();
        bindings.insert("user".to_string(), json!({"profile": {"name": "Alice"}}));
        let result = evaluate_template(&template, &Value::Null, &bindings, &Value::Null).unwrap();
        assert_eq!(result, json!({"name": "Alice"}));
    }

    #[test]
    fn resolves_context_object_references() {
        let template = json!({"idx.$": "$$.Map.Item.Index"});
        let ctx = map_item_context(2, &json!("v"), &json!({}));
        let result = evaluate_template(&template, &Value::Null, &BTreeMap::new(), &ctx).unwrap();
        assert_eq!(result, json!({"idx": 2}));
    }
}
