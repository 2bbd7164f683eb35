//! `Task`: invokes a resource through the [`MockEngine`] in place of a real
//! AWS service call, applying `Retry`/`Catch` around the invocation.

use super::{merge_caught_error, strategy_for, transition_outcome, StepOutcome};
use crate::asl::state::TaskState;
use crate::error::HarnessError;
use crate::expr::Bindings;
use crate::mock::MockEngine;
use crate::resilience::{choose_resolution, fresh_attempts, Resolution};
use serde_json::Value;
use std::time::Duration;

pub async fn execute(
    state_name: &str,
    state: &TaskState,
    raw_input: &Value,
    bindings: &mut Bindings,
    context_object: &Value,
    mocks: &MockEngine,
    wait_cap: Duration,
) -> Result<StepOutcome, HarnessError> {
    let strategy = strategy_for(state.query_language);
    let effective = strategy.preprocess(&state.transform, raw_input, bindings, context_object)?;
    let mut attempts = fresh_attempts(&state.retry);

    loop {
        match mocks.invoke(state_name, &state.resource, &effective) {
            Ok(raw_result) => {
                let output = strategy.postprocess(&state.transform, raw_input, &raw_result, bindings, context_object)?;
                return Ok(transition_outcome(&state.transition, output));
            }
            Err(task_err) => match choose_resolution(&state.retry, &state.catch, &mut attempts, &task_err) {
                Resolution::Retry(delay) => {
                    tokio::time::sleep(delay.min(wait_cap)).await;
                }
                Resolution::Catch { next, result_path } => {
                    let merged = merge_caught_error(raw_input, &task_err.to_json(), result_path.as_deref());
                    return Ok(StepOutcome::Next { output: merged, next });
                }
                Resolution::Propagate => return Err(HarnessError::Task(task_err)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asl::state::{Catcher, Transform, Transition};
    use crate::mock::{MockConfig, MockDefinition};
    use crate::types::QueryLanguage;
    use rustc_hash::FxHashMap;
    use serde_json::json;

    fn state(catch: Vec<Catcher>) -> TaskState {
        TaskState {
            query_language: QueryLanguage::JsonPath,
            resource: "arn:aws:states:::lambda:invoke".to_string(),
            transform: Transform::default(),
            retry: Vec::new(),
            catch,
            transition: Transition::End,
        }
    }

    #[tokio::test]
    async fn unmocked_task_gets_default_service_shape() {
        let mocks = MockEngine::empty();
        let mut bindings = Bindings::new();
        let outcome = execute("A", &state(vec![]), &json!({}), &mut bindings, &Value::Null, &mocks, Duration::from_millis(5))
            .await
            .unwrap();
        assert!(matches!(outcome, StepOutcome::Finished { output } if output["StatusCode"] == json!(200)));
    }

    #[tokio::test]
    async fn error_mock_is_caught_and_routes_to_catcher() {
        let mut mocks = FxHashMap::default();
        mocks.insert("A".to_string(), MockDefinition::Error { error: "States.TaskFailed".to_string(), cause: Some("boom".to_string()), probability: Some(1.0) });
        let engine = MockEngine::new(MockConfig { mocks });
        let catch = vec![Catcher { error_equals: vec!["States.ALL".to_string()], next: "Cleanup".to_string(), result_path: None }];
        let mut bindings = Bindings::new();
        let outcome = execute("A", &state(catch), &json!({"a": 1}), &mut bindings, &Value::Null, &engine, Duration::from_millis(5))
            .await
            .unwrap();
        match outcome {
            StepOutcome::Next { output, next } => {
                assert_eq!(next, "Cleanup");
                assert_eq!(output["Error"], json!("States.TaskFailed"));
            }
            other => panic!("expected Next outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn uncaught_error_propagates() {
        let mut mocks = FxHashMap::default();
        mocks.insert("A".to_string(), MockDefinition::Error { error: "States.TaskFailed".to_string(), cause: None, probability: Some(1.0) });
        let engine = MockEngine::new(MockConfig { mocks });
        let mut bindings = Bindings::new();
        let err = execute("A", &state(vec![]), &json!({}), &mut bindings, &Value::Null, &engine, Duration::from_millis(5))
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::Task(_)));
    }
}
