//! `Succeed` and `Fail`: the two terminal non-error and error exits.

use super::StepOutcome;
use crate::asl::state::{FailState, SucceedState};
use crate::error::HarnessError;
use crate::expr::{jsonpath, Bindings};
use serde_json::Value;

pub fn execute_succeed(
    state: &SucceedState,
    raw_input: &Value,
    bindings: &mut Bindings,
    context_object: &Value,
) -> Result<StepOutcome, HarnessError> {
    let strategy = super::strategy_for(state.query_language);
    let effective = strategy.preprocess(&state.transform, raw_input, bindings, context_object)?;
    let output = strategy.postprocess(&state.transform, raw_input, &effective, bindings, context_object)?;
    Ok(StepOutcome::Finished { output })
}

pub fn execute_fail(state: &FailState, raw_input: &Value) -> Result<StepOutcome, HarnessError> {
    let error = resolve_field(&state.error, &state.error_path, raw_input)?.unwrap_or_else(|| "States.Fail".to_string());
    let cause = resolve_field(&state.cause, &state.cause_path, raw_input)?.unwrap_or_default();
    Ok(StepOutcome::Failed { error, cause })
}

fn resolve_field(literal: &Option<String>, path: &Option<String>, raw_input: &Value) -> Result<Option<String>, HarnessError> {
    if let Some(value) = literal {
        return Ok(Some(value.clone()));
    }
    if let Some(path) = path {
        let value = jsonpath::evaluate(path, raw_input)?;
        return Ok(match value {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        });
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asl::state::Transform;
    use crate::types::QueryLanguage;
    use serde_json::json;

    #[test]
    fn fail_uses_literal_error_and_cause() {
        let state = FailState {
            query_language: QueryLanguage::JsonPath,
            error: Some("Custom.Error".to_string()),
            cause: Some("something broke".to_string()),
            error_path: None,
            cause_path: None,
        };
        let outcome = execute_fail(&state, &Value::Null).unwrap();
        assert!(matches!(outcome, StepOutcome::Failed { error, cause } if error == "Custom.Error" && cause == "something broke"));
    }

    #[test]
    fn fail_resolves_error_path() {
        let state = FailState {
            query_language: QueryLanguage::JsonPath,
            error: None,
            cause: None,
            error_path: Some("$.err".to_string()),
            cause_path: None,
        };
        let outcome = execute_fail(&state, &json!({"err": "Dynamic.Error"})).unwrap();
        assert!(matches!(outcome, StepOutcome::Failed { error, .. } if error == "Dynamic.Error"));
    }

    #[test]
    fn succeed_applies_output_path() {
        let state = SucceedState {
            query_language: QueryLanguage::JsonPath,
            transform: Transform { output_path: Some("$.keep".to_string()), ..Default::default() },
        };
        let mut bindings = Bindings::new();
        let outcome = execute_succeed(&state, &json!({"keep": 1, "drop": 2}), &mut bindings, &Value::Null).unwrap();
        assert!(matches!(outcome, StepOutcome::Finished { output } if output == json!(1)));
    }
}
