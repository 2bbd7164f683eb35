//! Error taxonomy for the interpreter and mock engine.
//!
//! Mirrors the shape of the upstream framework's error design: scoped,
//! `thiserror`-derived enums per concern, each carrying a `miette`
//! diagnostic code and help text, plus a chain-of-causes [`TaskError`] for
//! the AWS `{type, cause, message}` triples threaded through `Retry`/`Catch`.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while compiling a raw ASL document into a typed state machine.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    #[error("missing required field '{field}' on state '{state}'")]
    #[diagnostic(code(sfn_harness::build::missing_field))]
    MissingField { state: String, field: &'static str },

    #[error("unknown state type '{type_name}' on state '{state}'")]
    #[diagnostic(code(sfn_harness::build::unknown_type))]
    UnknownType { state: String, type_name: String },

    #[error("state '{state}' uses field '{field}' which is forbidden in {mode} mode")]
    #[diagnostic(
        code(sfn_harness::build::mode_violation),
        help("JSONPath-only fields cannot appear on a JSONata state and vice versa")
    )]
    ModeViolation {
        state: String,
        field: &'static str,
        mode: &'static str,
    },

    #[error("'{target}' referenced from '{state}' is not a defined state")]
    #[diagnostic(code(sfn_harness::build::unresolved_target))]
    UnresolvedTarget { state: String, target: String },

    #[error("malformed choice rule on state '{state}': {reason}")]
    #[diagnostic(code(sfn_harness::build::bad_choice_rule))]
    BadChoiceRule { state: String, reason: String },

    #[error("JSONata condition on state '{state}' must be wrapped in {{% %}}")]
    #[diagnostic(code(sfn_harness::build::bad_jsonata_condition))]
    BadJsonataCondition { state: String },

    #[error("'StartAt' target '{start_at}' is not a key of 'States'")]
    #[diagnostic(code(sfn_harness::build::bad_start_at))]
    BadStartAt { start_at: String },

    #[error("invalid JSON document: {0}")]
    #[diagnostic(code(sfn_harness::build::json))]
    Json(#[from] serde_json::Error),
}

/// Errors raised while evaluating JSONPath/JSONata expressions or payload templates.
#[derive(Debug, Error, Diagnostic)]
pub enum EvalError {
    #[error("Invalid path '{path}': The choice state's condition path references an invalid value")]
    #[diagnostic(code(sfn_harness::eval::invalid_choice_path))]
    InvalidChoicePath { path: String },

    #[error("unknown intrinsic function '{name}'")]
    #[diagnostic(code(sfn_harness::eval::unknown_intrinsic))]
    UnknownIntrinsic { name: String },

    #[error("intrinsic '{name}' called with wrong arity or argument types: {reason}")]
    #[diagnostic(code(sfn_harness::eval::bad_intrinsic_args))]
    BadIntrinsicArgs { name: String, reason: String },

    #[error("JSONata evaluation failed: {0}")]
    #[diagnostic(code(sfn_harness::eval::jsonata))]
    Jsonata(String),

    #[error("JSONPath evaluation failed for '{path}': {reason}")]
    #[diagnostic(code(sfn_harness::eval::jsonpath))]
    JsonPath { path: String, reason: String },

    #[error("unbound variable '${name}'")]
    #[diagnostic(code(sfn_harness::eval::unbound_variable))]
    UnboundVariable { name: String },
}

/// An AWS-style task error triple, chained to preserve nested causes.
///
/// Modeled on the upstream `LadderError`: a message, an optional boxed
/// cause, and a `Display`/`Error::source` impl that walks the chain.
#[derive(Debug, Clone)]
pub struct TaskError {
    pub kind: String,
    pub message: String,
    pub cause: Option<Box<TaskError>>,
}

impl TaskError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            cause: None,
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: TaskError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// `true` when `error_equals` (from a `Retry`/`Catch` entry) matches this error's kind.
    #[must_use]
    pub fn matches(&self, error_equals: &[String]) -> bool {
        error_equals
            .iter()
            .any(|pattern| pattern == "States.ALL" || pattern == "States.TaskFailed" || pattern == &self.kind)
    }

    /// Render as the `{type, cause, message}` JSON shape ASL error records use.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "Error": self.kind,
            "Cause": self.message,
        })
    }
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for TaskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn std::error::Error + 'static))
    }
}

/// Control-flow failures: no matching choice, exceeded step budget, composite-state failure.
#[derive(Debug, Error, Diagnostic)]
pub enum ControlError {
    #[error("no choice rule matched and no Default is defined on '{state}'")]
    #[diagnostic(code(sfn_harness::control::no_matching_choice))]
    NoMatchingChoice { state: String },

    #[error("maximum steps exceeded ({limit}) while executing '{state}'")]
    #[diagnostic(
        code(sfn_harness::control::step_limit_exceeded),
        help("the state machine likely contains an unbounded loop")
    )]
    StepLimitExceeded { state: String, limit: u32 },

    #[error("Branch execution failed: {0}")]
    #[diagnostic(code(sfn_harness::control::branch_failed))]
    BranchFailed(String),

    #[error("Item processing failed: {0}")]
    #[diagnostic(code(sfn_harness::control::item_failed))]
    ItemFailed(String),

    #[error("state '{0}' is not defined")]
    #[diagnostic(code(sfn_harness::control::unknown_state))]
    UnknownState(String),
}

/// Mock configuration/loading failures.
#[derive(Debug, Error, Diagnostic)]
pub enum MockError {
    #[error("conditional mock rule for '{state}' is missing the required 'input' key under 'when'")]
    #[diagnostic(
        code(sfn_harness::mock::missing_when_input),
        help("use `when: {{ input: <pattern> }}`, not a bare partial object")
    )]
    MissingWhenInput { state: String },

    #[error("no conditional rule matched for state '{state}' and no default is defined")]
    #[diagnostic(code(sfn_harness::mock::no_matching_rule))]
    NoMatchingRule { state: String },

    #[error("mock data file '{path}' could not be read: {reason}")]
    #[diagnostic(code(sfn_harness::mock::file_read))]
    FileRead { path: String, reason: String },

    #[error("mock data file '{path}' has an unsupported or undetected format")]
    #[diagnostic(code(sfn_harness::mock::unknown_format))]
    UnknownFormat { path: String },

    #[error("unsupported ItemReader resource kind '{resource}'")]
    #[diagnostic(code(sfn_harness::mock::unsupported_item_reader))]
    UnsupportedItemReader { resource: String },

    #[error("S3 listing item at index {index} is missing the required 'Key' field")]
    #[diagnostic(code(sfn_harness::mock::missing_key))]
    MissingKey { index: usize },
}

/// Top-level error union for anything a library caller can observe directly
/// (construction, fatal control-flow, and I/O-adjacent mock failures).
/// Per-state runtime failures are instead captured into `ExecutionResult`.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Control(#[from] ControlError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Mock(#[from] MockError),

    #[error("task failed: {0}")]
    #[diagnostic(code(sfn_harness::task_failed))]
    Task(TaskError),
}

impl From<TaskError> for HarnessError {
    fn from(value: TaskError) -> Self {
        HarnessError::Task(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_error_matches_states_all() {
        let err = TaskError::new("States.TaskFailed", "boom");
        assert!(err.matches(&["States.ALL".to_string()]));
    }

    #[test]
    fn task_error_matches_user_code_exactly() {
        let err = TaskError::new("Lambda.Unknown", "boom");
        assert!(err.matches(&["Lambda.Unknown".to_string()]));
        assert!(!err.matches(&["Lambda.ServiceException".to_string()]));
    }

    #[test]
    fn task_error_chain_reports_source() {
        use std::error::Error as _;
        let inner = TaskError::new("Inner", "root cause");
        let outer = TaskError::new("Outer", "wrapper").with_cause(inner);
        assert_eq!(outer.source().unwrap().to_string(), "Inner: root cause");
    }
}
