//! Mutable execution state threaded through a state machine run: current
//! data, the fixed `$$` pseudo-context, declared variables, and the
//! execution-path/history records AWS exposes via `States.DescribeExecution`.

use crate::types::fixed_context;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// One completed state's recorded execution, surfaced in `$$.State`.
#[derive(Debug, Clone)]
pub struct StateExecutionRecord {
    pub name: String,
    pub entered_time: String,
}

/// One Map state invocation's fan-out metadata.
#[derive(Debug, Clone)]
pub struct MapExecutionRecord {
    pub state: String,
    pub iteration_count: usize,
    pub iteration_paths: Vec<Vec<String>>,
    pub item_count: usize,
    pub result_count: Option<usize>,
}

/// One Parallel state invocation's fan-out metadata.
#[derive(Debug, Clone)]
pub struct ParallelExecutionRecord {
    pub state: String,
    pub branch_count: usize,
    pub branch_paths: Vec<Vec<String>>,
}

/// The full mutable context carried across a state machine run.
///
/// `original_input` never changes after construction; `input` is replaced at
/// each state transition with that state's output.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub input: Value,
    pub original_input: Value,
    pub current_state: Option<String>,
    pub execution_path: Vec<String>,
    pub variables: BTreeMap<String, Value>,
    pub state_executions: Vec<StateExecutionRecord>,
    pub map_executions: Vec<MapExecutionRecord>,
    pub parallel_executions: Vec<ParallelExecutionRecord>,
}

impl ExecutionContext {
    #[must_use]
    pub fn new(input: Value) -> Self {
        Self {
            original_input: input.clone(),
            input,
            current_state: None,
            execution_path: Vec::new(),
            variables: BTreeMap::new(),
            state_executions: Vec::new(),
            map_executions: Vec::new(),
            parallel_executions: Vec::new(),
        }
    }

    /// Record entry into `state_name`, pushing it onto both the execution
    /// path and the state-execution history.
    pub fn enter_state(&mut self, state_name: &str) {
        self.current_state = Some(state_name.to_string());
        self.execution_path.push(state_name.to_string());
        self.state_executions.push(StateExecutionRecord {
            name: state_name.to_string(),
            entered_time: fixed_context::STATE_ENTERED_TIME.to_string(),
        });
    }

    /// Build the `$$` context object visible to `Parameters`/`Arguments`
    /// templates and intrinsic evaluation at the current point in the run.
    #[must_use]
    pub fn context_object(&self) -> Value {
        let state = self.current_state.as_deref().unwrap_or_default();
        json!({
            "Execution": {
                "Id": fixed_context::EXECUTION_ID,
                "Input": self.original_input,
                "Name": fixed_context::EXECUTION_NAME,
                "RoleArn": fixed_context::EXECUTION_ROLE_ARN,
                "StartTime": fixed_context::EXECUTION_START_TIME,
            },
            "State": {
                "EnteredTime": fixed_context::STATE_ENTERED_TIME,
                "Name": state,
            },
            "StateMachine": {
                "Id": fixed_context::STATE_MACHINE_ID,
                "Name": fixed_context::STATE_MACHINE_NAME,
            },
        })
    }

    /// Build the Map-iteration context object (`$$.Map.Item`) nested under
    /// the base context for the iteration at `index`.
    #[must_use]
    pub fn map_context_object(&self, index: usize, item_value: &Value) -> Value {
        let mut base = self.context_object();
        if let Value::Object(ref mut obj) = base {
            obj.insert(
                "Map".to_string(),
                json!({"Item": {"Index": index, "Value": item_value}}),
            );
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_state_records_path_and_history() {
        let mut ctx = ExecutionContext::new(json!({"a": 1}));
        ctx.enter_state("First");
        ctx.enter_state("Second");
        assert_eq!(ctx.execution_path, vec!["First", "Second"]);
        assert_eq!(ctx.state_executions.len(), 2);
        assert_eq!(ctx.current_state.as_deref(), Some("Second"));
    }

    #[test]
    fn context_object_exposes_original_input_and_current_state() {
        let mut ctx = ExecutionContext::new(json!({"a": 1}));
        ctx.enter_state("First");
        let obj = ctx.context_object();
        assert_eq!(obj["Execution"]["Input"], json!({"a": 1}));
        assert_eq!(obj["State"]["Name"], json!("First"));
    }

    #[test]
    fn map_context_object_nests_item_under_base_context() {
        let ctx = ExecutionContext::new(json!(null));
        let obj = ctx.map_context_object(3, &json!("x"));
        assert_eq!(obj["Map"]["Item"]["Index"], json!(3));
        assert_eq!(obj["Map"]["Item"]["Value"], json!("x"));
        assert!(obj.get("Execution").is_some());
    }
}
