//! `Pass`: produces its `Result` literal (or the post-`Parameters` input,
//! when no `Result` is set) with no side effects.

use super::{strategy_for, transition_outcome, StepOutcome};
use crate::asl::state::PassState;
use crate::error::HarnessError;
use crate::expr::Bindings;
use serde_json::Value;

pub fn execute(
    state: &PassState,
    raw_input: &Value,
    bindings: &mut Bindings,
    context_object: &Value,
) -> Result<StepOutcome, HarnessError> {
    let strategy = strategy_for(state.query_language);
    let effective = strategy.preprocess(&state.transform, raw_input, bindings, context_object)?;
    let raw_result = state.result.clone().unwrap_or(effective);
    let output = strategy.postprocess(&state.transform, raw_input, &raw_result, bindings, context_object)?;
    Ok(transition_outcome(&state.transition, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asl::state::{Transform, Transition};
    use crate::types::QueryLanguage;
    use serde_json::json;

    #[test]
    fn pass_with_result_overrides_input() {
        let state = PassState {
            query_language: QueryLanguage::JsonPath,
            result: Some(json!({"fixed": true})),
            transform: Transform::default(),
            transition: Transition::End,
        };
        let mut bindings = Bindings::new();
        let outcome = execute(&state, &json!({"x": 1}), &mut bindings, &Value::Null).unwrap();
        assert!(matches!(outcome, StepOutcome::Finished { output } if output == json!({"fixed": true})));
    }

    #[test]
    fn pass_without_result_passes_input_through() {
        let state = PassState {
            query_language: QueryLanguage::JsonPath,
            result: None,
            transform: Transform::default(),
            transition: Transition::Next("Next".to_string()),
        };
        let mut bindings = Bindings::new();
        let outcome = execute(&state, &json!({"x": 1}), &mut bindings, &Value::Null).unwrap();
        assert!(matches!(outcome, StepOutcome::Next { output, next } if output == json!({"x": 1}) && next == "Next"));
    }
}
