//! Drives a single [`StateMachine`] from its `StartAt` state to a terminal
//! outcome, dispatching each step to the matching `executor::*` module and
//! enforcing the step-count ceiling that stands in for AWS's execution
//! history limit.

use crate::asl::state::{State, StateMachine};
use crate::config::HarnessConfig;
use crate::context::{ExecutionContext, MapExecutionRecord, ParallelExecutionRecord, StateExecutionRecord};
use crate::error::{ControlError, HarnessError};
use crate::executor::{choice, map, parallel, pass, succeed_fail, task, wait, StepOutcome};
use crate::expr::Bindings;
use crate::mock::MockEngine;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub enum RunStatus {
    Succeeded(Value),
    Failed { error: String, cause: String },
}

#[derive(Debug, Clone)]
pub struct MachineResult {
    pub status: RunStatus,
    pub variables: BTreeMap<String, Value>,
    pub execution_path: Vec<String>,
    pub state_executions: Vec<StateExecutionRecord>,
    pub map_executions: Vec<MapExecutionRecord>,
    pub parallel_executions: Vec<ParallelExecutionRecord>,
}

/// Run `machine` to completion with no inherited variable scope, bounding the
/// number of state transitions by `step_limit` (the top-level caller uses
/// [`HarnessConfig::step_limit_top`]; Map/Parallel sub-executions use
/// [`HarnessConfig::step_limit_sub`]).
pub async fn run_machine(
    machine: &StateMachine,
    input: Value,
    config: &HarnessConfig,
    mocks: &MockEngine,
    step_limit: u32,
) -> Result<MachineResult, HarnessError> {
    run_machine_with_variables(machine, input, config, mocks, step_limit, BTreeMap::new()).await
}

/// Run `machine` to completion, seeding its variable scope with
/// `initial_variables` read-only (the sub-execution may shadow them locally
/// via its own `Assign`s, but writes never propagate back to the caller).
/// Parallel branches and Inline Map iterations use this to inherit outer
/// variables; Distributed Map iterations call [`run_machine`] instead to
/// stay isolated.
pub async fn run_machine_with_variables(
    machine: &StateMachine,
    input: Value,
    config: &HarnessConfig,
    mocks: &MockEngine,
    step_limit: u32,
    initial_variables: BTreeMap<String, Value>,
) -> Result<MachineResult, HarnessError> {
    let mut ctx = ExecutionContext::new(input.clone());
    let mut bindings = Bindings::new().with_variables(initial_variables);
    let mut current = machine.start_at.clone();
    let mut data = input;
    let mut steps: u32 = 0;

    loop {
        steps += 1;
        if steps > step_limit {
            return Err(ControlError::StepLimitExceeded { state: current, limit: step_limit }.into());
        }
        ctx.enter_state(&current);
        let state = machine
            .get(&current)
            .ok_or_else(|| ControlError::UnknownState(current.clone()))?;
        let context_object = ctx.context_object();

        let outcome = dispatch(&current, state, &data, &mut bindings, &context_object, config, mocks, &mut ctx).await?;

        match outcome {
            StepOutcome::Next { output, next } => {
                data = output;
                current = next;
            }
            StepOutcome::Finished { output } => {
                return Ok(MachineResult {
                    status: RunStatus::Succeeded(output),
                    variables: bindings.variables,
                    execution_path: ctx.execution_path,
                    state_executions: ctx.state_executions,
                    map_executions: ctx.map_executions,
                    parallel_executions: ctx.parallel_executions,
                });
            }
            StepOutcome::Failed { error, cause } => {
                return Ok(MachineResult {
                    status: RunStatus::Failed { error, cause },
                    variables: bindings.variables,
                    execution_path: ctx.execution_path,
                    state_executions: ctx.state_executions,
                    map_executions: ctx.map_executions,
                    parallel_executions: ctx.parallel_executions,
                });
            }
        }
    }
}

async fn dispatch(
    state_name: &str,
    state: &State,
    data: &Value,
    bindings: &mut Bindings,
    context_object: &Value,
    config: &HarnessConfig,
    mocks: &MockEngine,
    ctx: &mut ExecutionContext,
) -> Result<StepOutcome, HarnessError> {
    match state {
        State::Pass(s) => pass::execute(s, data, bindings, context_object),
        State::Task(s) => task::execute(state_name, s, data, bindings, context_object, mocks, config.wait_cap).await,
        State::Wait(s) => wait::execute(s, data, bindings, context_object, config.wait_cap).await,
        State::Choice(s) => choice::execute(state_name, s, data, bindings, context_object),
        State::Succeed(s) => succeed_fail::execute_succeed(s, data, bindings, context_object),
        State::Fail(s) => succeed_fail::execute_fail(s, data),
        State::Parallel(s) => parallel::execute(state_name, s, data, bindings, context_object, config, mocks, ctx).await,
        State::Map(s) => map::execute(state_name, s, data, bindings, context_object, config, mocks, ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asl::builder::compile;
    use serde_json::json;

    #[tokio::test]
    async fn runs_a_pass_chain_to_completion() {
        let doc = json!({
            "StartAt": "A",
            "States": {
                "A": {"Type": "Pass", "Result": {"step": 1}, "Next": "B"},
                "B": {"Type": "Pass", "End": true}
            }
        });
        let machine = compile(&doc).unwrap();
        let config = HarnessConfig::default();
        let mocks = MockEngine::empty();
        let result = run_machine(&machine, json!({}), &config, &mocks, config.step_limit_top).await.unwrap();
        assert!(matches!(result.status, RunStatus::Succeeded(output) if output == json!({"step": 1})));
        assert_eq!(result.execution_path, vec!["A", "B"]);
        assert_eq!(result.state_executions.len(), 2);
        assert_eq!(result.state_executions[0].name, "A");
        assert!(result.map_executions.is_empty());
        assert!(result.parallel_executions.is_empty());
    }

    #[tokio::test]
    async fn fail_state_produces_failed_status() {
        let doc = json!({
            "StartAt": "Boom",
            "States": {"Boom": {"Type": "Fail", "Error": "Bad.Thing", "Cause": "oops"}}
        });
        let machine = compile(&doc).unwrap();
        let config = HarnessConfig::default();
        let mocks = MockEngine::empty();
        let result = run_machine(&machine, json!({}), &config, &mocks, config.step_limit_top).await.unwrap();
        assert!(matches!(result.status, RunStatus::Failed { error, .. } if error == "Bad.Thing"));
    }

    #[tokio::test]
    async fn step_limit_is_enforced_against_infinite_loops() {
        let doc = json!({
            "StartAt": "Loop",
            "States": {"Loop": {"Type": "Pass", "Next": "Loop"}}
        });
        let machine = compile(&doc).unwrap();
        let config = HarnessConfig::default();
        let mocks = MockEngine::empty();
        let err = run_machine(&machine, json!({}), &config, &mocks, 5).await.unwrap_err();
        assert!(matches!(err, HarnessError::Control(ControlError::StepLimitExceeded { limit: 5, .. })));
    }
}
