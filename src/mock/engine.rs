//! Resolves a `Task` state's resource invocation against the loaded mock
//! configuration, falling back to a plausible service-shaped default
//! response when a state has no mock defined.

use super::config::{MockConfig, MockDefinition};
use crate::error::TaskError;
use crate::utils::json_ext::partial_deep_equal;
use rustc_hash::FxHashMap;
use serde_json::{json, Value};
use std::sync::Mutex;

pub struct MockEngine {
    config: MockConfig,
    call_counts: Mutex<FxHashMap<String, u32>>,
}

impl MockEngine {
    #[must_use]
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            call_counts: Mutex::new(FxHashMap::default()),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(MockConfig::empty())
    }

    /// The mock file path configured for `state_name`'s `ItemReader`, if any.
    #[must_use]
    pub fn item_reader_path(&self, state_name: &str) -> Option<&str> {
        match self.config.mocks.get(state_name) {
            Some(MockDefinition::ItemReader { path }) => Some(path),
            _ => None,
        }
    }

    /// Clear stateful call counters, as a test runner does between cases.
    pub fn reset(&self) {
        self.call_counts.lock().expect("mock call-count lock poisoned").clear();
    }

    /// Resolve `state_name`'s `Task` invocation against `input`, returning
    /// either a mocked/default result or the `TaskError` a mock throws.
    pub fn invoke(&self, state_name: &str, resource: &str, input: &Value) -> Result<Value, TaskError> {
        match self.config.mocks.get(state_name) {
            Some(def) => self.apply(state_name, def, input),
            None => Ok(default_response_for(resource)),
        }
    }

    fn apply(&self, state_name: &str, def: &MockDefinition, input: &Value) -> Result<Value, TaskError> {
        match def {
            MockDefinition::Fixed { response } => Ok(response.clone()),
            MockDefinition::Conditional { rules, default } => rules
                .iter()
                .find(|rule| rule.when.input.as_ref().is_none_or(|pattern| partial_deep_equal(pattern, input)))
                .map(|rule| rule.response.clone())
                .or_else(|| default.clone())
                .ok_or_else(|| TaskError::new("States.MockError", format!("no conditional mock rule matched for state '{state_name}'"))),
            MockDefinition::Stateful { responses } => {
                if responses.is_empty() {
                    return Err(TaskError::new("States.MockError", format!("stateful mock for '{state_name}' has no responses")));
                }
                let mut counts = self.call_counts.lock().expect("mock call-count lock poisoned");
                let count = counts.entry(state_name.to_string()).or_insert(0);
                let index = (*count as usize) % responses.len();
                *count += 1;
                Ok(responses[index].clone())
            }
            MockDefinition::Error { error, cause, probability } => {
                let p = probability.unwrap_or(1.0).clamp(0.0, 1.0);
                if rand::random_range(0.0..1.0) < p {
                    Err(TaskError::new(error.clone(), cause.clone().unwrap_or_default()))
                } else {
                    Ok(Value::Null)
                }
            }
            MockDefinition::ItemReader { .. } => Err(TaskError::new(
                "States.MockError",
                format!("state '{state_name}' mocks an ItemReader, not a Task invocation"),
            )),
        }
    }
}

/// A plausible default response shaped after the AWS service the resource
/// ARN names, used when a `Task` state has no mock of its own. Keeps
/// unmocked paths through a workflow exercisable rather than erroring.
fn default_response_for(resource: &str) -> Value {
    if resource.contains("lambda") {
        json!({"StatusCode": 200, "Payload": {}})
    } else if resource.contains("sns") {
        json!({"MessageId": "00000000-0000-0000-0000-000000000000"})
    } else if resource.contains("sqs") {
        json!({"MD5OfMessageBody": "", "MessageId": "00000000-0000-0000-0000-000000000000"})
    } else if resource.contains("dynamodb") {
        json!({"Attributes": {}})
    } else if resource.contains("states") {
        json!({"ExecutionArn": "arn:aws:states:us-east-1:123456789012:execution:mock:mock", "StartDate": 0})
    } else {
        Value::Object(serde_json::Map::new())
    }
}
