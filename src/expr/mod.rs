//! The two expression-language evaluators (JSONPath, JSONata) and the
//! JSONPath payload-template processor built on top of the former.

pub mod intrinsics;
pub mod jsonata;
pub mod jsonpath;
pub mod payload;

use serde_json::Value;

/// Bindings an expression evaluator resolves `$name`-style references against.
///
/// Shared by both evaluators so the processing strategies (`crate::strategy`)
/// can build one bindings set regardless of which mode a state runs under.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    pub variables: std::collections::BTreeMap<String, Value>,
    pub states_input: Option<Value>,
    pub states_result: Option<Value>,
    pub states_context: Option<Value>,
}

impl Bindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_variables(mut self, variables: std::collections::BTreeMap<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    #[must_use]
    pub fn with_states_input(mut self, value: Value) -> Self {
        self.states_input = Some(value);
        self
    }

    #[must_use]
    pub fn with_states_result(mut self, value: Value) -> Self {
        self.states_result = Some(value);
        self
    }

    #[must_use]
    pub fn with_states_context(mut self, value: Value) -> Self {
        self.states_context = Some(value);
        self
    }
}
