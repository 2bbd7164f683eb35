//! The two state processing pipelines AWS defines per query language:
//! JSONPath's `InputPath -> Parameters -> ... -> ResultSelector ->
//! ResultPath -> OutputPath` and JSONata's `Arguments -> ... -> Assign ->
//! Output`. An executor calls `preprocess` to build a state's effective
//! input, runs its core action, then calls `postprocess` to fold the result
//! back into the execution's data and variables.

use crate::asl::state::Transform;
use crate::error::EvalError;
use crate::expr::{jsonata, jsonpath, payload, Bindings};
use serde_json::Value;

/// Strips a leading `$.` or bare `$` from a `ResultPath`/similar JSONPath
/// reference, leaving the dot-path form `set_by_path`/`get_by_path` expect.
fn strip_root(path: &str) -> &str {
    path.strip_prefix("$.").or_else(|| path.strip_prefix('$')).unwrap_or(path)
}

pub trait ProcessingStrategy {
    /// Build the effective input handed to a state's core action.
    fn preprocess(
        &self,
        transform: &Transform,
        raw_input: &Value,
        bindings: &mut Bindings,
        context_object: &Value,
    ) -> Result<Value, EvalError>;

    /// Fold a state's raw action result back into the execution's data,
    /// returning the state's output (what the next state receives as
    /// input).
    fn postprocess(
        &self,
        transform: &Transform,
        raw_input: &Value,
        result: &Value,
        bindings: &mut Bindings,
        context_object: &Value,
    ) -> Result<Value, EvalError>;
}

pub struct JsonPathStrategy;

impl ProcessingStrategy for JsonPathStrategy {
    fn preprocess(
        &self,
        transform: &Transform,
        raw_input: &Value,
        bindings: &mut Bindings,
        context_object: &Value,
    ) -> Result<Value, EvalError> {
        let after_input_path = match &transform.input_path {
            Some(path) => jsonpath::evaluate(path, raw_input)?,
            None => raw_input.clone(),
        };
        match &transform.parameters {
            Some(template) => payload::evaluate_template(template, &after_input_path, &bindings.variables, context_object),
            None => Ok(after_input_path),
        }
    }

    fn postprocess(
        &self,
        transform: &Transform,
        raw_input: &Value,
        result: &Value,
        bindings: &mut Bindings,
        context_object: &Value,
    ) -> Result<Value, EvalError> {
        let selected = match &transform.result_selector {
            Some(template) => payload::evaluate_template(template, result, &bindings.variables, context_object)?,
            None => result.clone(),
        };
        let merged = match transform.result_path.as_deref() {
            Some("DISCARD") => raw_input.clone(),
            Some("$") | None => selected,
            Some(path) => {
                let mut base = raw_input.clone();
                crate::utils::json_ext::set_by_path(&mut base, strip_root(path), selected);
                base
            }
        };
        match &transform.output_path {
            Some(path) => jsonpath::evaluate(path, &merged),
            None => Ok(merged),
        }
    }
}

pub struct JsonataStrategy;

impl ProcessingStrategy for JsonataStrategy {
    fn preprocess(
        &self,
        transform: &Transform,
        raw_input: &Value,
        bindings: &mut Bindings,
        _context_object: &Value,
    ) -> Result<Value, EvalError> {
        bindings.states_input = Some(raw_input.clone());
        match &transform.arguments {
            Some(template) => jsonata::evaluate_template(template, raw_input, bindings),
            None => Ok(raw_input.clone()),
        }
    }

    fn postprocess(
        &self,
        transform: &Transform,
        raw_input: &Value,
        result: &Value,
        bindings: &mut Bindings,
        _context_object: &Value,
    ) -> Result<Value, EvalError> {
        bindings.states_result = Some(result.clone());
        if let Some(assign) = &transform.assign {
            let evaluated = jsonata::evaluate_template(assign, result, bindings)?;
            if let Value::Object(obj) = evaluated {
                for (k, v) in obj {
                    bindings.variables.insert(k, v);
                }
            }
        }
        let _ = raw_input;
        match &transform.output {
            Some(template) => jsonata::evaluate_template(template, result, bindings),
            None => Ok(result.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn jsonpath_strategy_applies_input_path_then_parameters() {
        let strategy = JsonPathStrategy;
        let mut bindings = Bindings::new();
        let transform = Transform {
            input_path: Some("$.payload".to_string()),
            parameters: Some(json!({"id.$": "$.id"})),
            ..Default::default()
        };
        let input = json!({"payload": {"id": 7}, "ignored": true});
        let effective = strategy
            .preprocess(&transform, &input, &mut bindings, &Value::Null)
            .unwrap();
        assert_eq!(effective, json!({"id": 7}));
    }

    #[test]
    fn jsonpath_strategy_merges_result_at_result_path() {
        let strategy = JsonPathStrategy;
        let mut bindings = Bindings::new();
        let transform = Transform {
            result_path: Some("$.output".to_string()),
            ..Default::default()
        };
        let raw_input = json!({"a": 1});
        let result = json!({"b": 2});
        let merged = strategy
            .postprocess(&transform, &raw_input, &result, &mut bindings, &Value::Null)
            .unwrap();
        assert_eq!(merged, json!({"a": 1, "output": {"b": 2}}));
    }

    #[test]
    fn jsonpath_strategy_discard_result_path_keeps_input_unchanged() {
        let strategy = JsonPathStrategy;
        let mut bindings = Bindings::new();
        let transform = Transform {
            result_path: Some("DISCARD".to_string()),
            ..Default::default()
        };
        let raw_input = json!({"a": 1});
        let merged = strategy
            .postprocess(&transform, &raw_input, &json!({"b": 2}), &mut bindings, &Value::Null)
            .unwrap();
        assert_eq!(merged, raw_input);
    }

    #[test]
    fn jsonata_strategy_evaluates_arguments_against_raw_input() {
        let strategy = JsonataStrategy;
        let mut bindings = Bindings::new();
        let transform = Transform {
            arguments: Some(json!({"doubled": "{% x * 2 %}"})),
            ..Default::default()
        };
        let input = json!({"x": 3});
        let effective = strategy
            .preprocess(&transform, &input, &mut bindings, &Value::Null)
            .unwrap();
        assert_eq!(effective, json!({"doubled": 6}));
    }

    #[test]
    fn jsonata_strategy_assign_updates_bindings_variables() {
        let strategy = JsonataStrategy;
        let mut bindings = Bindings::new();
        let transform = Transform {
            assign: Some(json!({"total": "{% x %}"})),
            ..Default::default()
        };
        let _ = strategy
            .postprocess(&transform, &Value::Null, &json!({"x": 9}), &mut bindings, &Value::Null)
            .unwrap();
        assert_eq!(bindings.variables.get("total"), Some(&json!(9)));
    }
}
