//! `Parallel`: runs every branch against the same input concurrently and
//! collects an array of branch outputs in branch order. Branches read a
//! shallow copy of the outer variable scope but never write back to it.

use super::{merge_caught_error, strategy_for, transition_outcome, StepOutcome};
use crate::asl::state::ParallelState;
use crate::config::HarnessConfig;
use crate::context::{ExecutionContext, ParallelExecutionRecord};
use crate::error::{HarnessError, TaskError};
use crate::expr::Bindings;
use crate::machine_executor::{run_machine_with_variables, RunStatus};
use crate::mock::MockEngine;
use crate::resilience::{choose_resolution, fresh_attempts, Resolution};
use serde_json::Value;

pub async fn execute(
    state_name: &str,
    state: &ParallelState,
    raw_input: &Value,
    bindings: &mut Bindings,
    context_object: &Value,
    config: &HarnessConfig,
    mocks: &MockEngine,
    ctx: &mut ExecutionContext,
) -> Result<StepOutcome, HarnessError> {
    let strategy = strategy_for(state.query_language);
    let effective = strategy.preprocess(&state.transform, raw_input, bindings, context_object)?;
    let mut attempts = fresh_attempts(&state.retry);

    loop {
        let branch_futures = state.branches.iter().map(|branch| {
            let input = effective.clone();
            run_machine_with_variables(branch, input, config, mocks, config.step_limit_sub, bindings.variables.clone())
        });
        let results = futures_util::future::join_all(branch_futures).await;

        let mut outputs = Vec::with_capacity(results.len());
        let mut branch_paths = Vec::with_capacity(results.len());
        let mut first_failure: Option<TaskError> = None;
        for result in results {
            match result {
                Ok(run) => {
                    branch_paths.push(run.execution_path.clone());
                    match run.status {
                        RunStatus::Succeeded(output) => outputs.push(output),
                        RunStatus::Failed { error, cause } => {
                            first_failure.get_or_insert_with(|| TaskError::new(error, cause));
                        }
                    }
                }
                Err(err) => {
                    branch_paths.push(Vec::new());
                    first_failure.get_or_insert_with(|| TaskError::new("States.Runtime", err.to_string()));
                }
            }
        }

        ctx.parallel_executions.push(ParallelExecutionRecord {
            state: state_name.to_string(),
            branch_count: state.branches.len(),
            branch_paths,
        });

        match first_failure {
            None => {
                let raw_result = Value::Array(outputs);
                let output = strategy.postprocess(&state.transform, raw_input, &raw_result, bindings, context_object)?;
                return Ok(transition_outcome(&state.transition, output));
            }
            Some(task_err) => match choose_resolution(&state.retry, &state.catch, &mut attempts, &task_err) {
                Resolution::Retry(delay) => {
                    tokio::time::sleep(delay.min(config.wait_cap)).await;
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
    use crate::asl::state::{PassState, StateMachine, Transform, Transition};
    use crate::types::QueryLanguage;
    use rustc_hash::FxHashMap;
    use serde_json::json;

    fn one_state_branch(result: Value) -> StateMachine {
        let mut states = FxHashMap::default();
        states.insert(
            "Only".to_string(),
            crate::asl::state::State::Pass(PassState {
                query_language: QueryLanguage::JsonPath,
                result: Some(result),
                transform: Transform::default(),
                transition: Transition::End,
            }),
        );
        StateMachine { start_at: "Only".to_string(), states, query_language: QueryLanguage::JsonPath }
    }

    #[tokio::test]
    async fn branch_outputs_collect_in_branch_order() {
        let state = ParallelState {
            query_language: QueryLanguage::JsonPath,
            branches: vec![one_state_branch(json!(1)), one_state_branch(json!(2))],
            transform: Transform::default(),
            retry: Vec::new(),
            catch: Vec::new(),
            transition: Transition::End,
        };
        let mut bindings = Bindings::new();
        let config = HarnessConfig::default();
        let mocks = MockEngine::empty();
        let mut ctx = ExecutionContext::new(json!({}));
        let outcome = execute("Estimates", &state, &json!({}), &mut bindings, &Value::Null, &config, &mocks, &mut ctx)
            .await
            .unwrap();
        assert!(matches!(outcome, StepOutcome::Finished { output } if output == json!([1, 2])));
        assert_eq!(ctx.parallel_executions.len(), 1);
        assert_eq!(ctx.parallel_executions[0].branch_count, 2);
    }

    fn var_reading_branch() -> StateMachine {
        let mut states = FxHashMap::default();
        states.insert(
            "ReadVar".to_string(),
            crate::asl::state::State::Pass(PassState {
                query_language: QueryLanguage::JsonPath,
                result: None,
                transform: Transform { parameters: Some(json!({"seen.$": "$flag"})), ..Default::default() },
                transition: Transition::End,
            }),
        );
        StateMachine { start_at: "ReadVar".to_string(), states, query_language: QueryLanguage::JsonPath }
    }

    #[tokio::test]
    async fn branches_read_outer_variables() {
        let state = ParallelState {
            query_language: QueryLanguage::JsonPath,
            branches: vec![var_reading_branch(), var_reading_branch()],
            transform: Transform::default(),
            retry: Vec::new(),
            catch: Vec::new(),
            transition: Transition::End,
        };
        let mut bindings = Bindings::new();
        bindings.variables.insert("flag".to_string(), json!("outer"));
        let config = HarnessConfig::default();
        let mocks = MockEngine::empty();
        let mut ctx = ExecutionContext::new(json!({}));
        let outcome = execute("Estimates", &state, &json!({}), &mut bindings, &Value::Null, &config, &mocks, &mut ctx)
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            StepOutcome::Finished { output } if output == json!([{"seen": "outer"}, {"seen": "outer"}])
        ));
    }
}
