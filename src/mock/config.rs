//! The mock configuration schema: one [`MockDefinition`] per state name,
//! deserialized from the JSON/YAML file a harness run is pointed at.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;

/// A single conditional branch: if `when.input` partially matches the
/// state's actual input, `response` is returned.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionalRule {
    pub when: WhenClause,
    pub response: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhenClause {
    pub input: Option<Value>,
}

/// One state's mocked behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MockDefinition {
    /// Always returns the same response.
    Fixed { response: Value },
    /// Returns the first rule whose `when.input` partially matches, falling
    /// back to `default` when present.
    Conditional {
        rules: Vec<ConditionalRule>,
        #[serde(default)]
        default: Option<Value>,
    },
    /// Cycles through `responses` by call count modulo `responses.len()`.
    Stateful { responses: Vec<Value> },
    /// Throws a `TaskError` with probability `probability` (default `1.0`),
    /// otherwise falls through to `States.ALL` handling by the caller.
    Error {
        error: String,
        #[serde(default)]
        cause: Option<String>,
        #[serde(default)]
        probability: Option<f64>,
    },
    /// Delegates to the mock file loader for `Map` states backed by an
    /// `ItemReader`, rather than a `Task` invocation.
    ItemReader { path: String },
}

/// A loaded mock configuration: state name to mocked behavior.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct MockConfig {
    pub mocks: FxHashMap<String, MockDefinition>,
}

impl MockConfig {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(raw: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(raw.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_fixed_and_conditional_definitions() {
        let raw = json!({
            "GetUser": {"type": "fixed", "response": {"name": "Alice"}},
            "Classify": {
                "type": "conditional",
                "rules": [{"when": {"input": {"tier": "gold"}}, "response": {"discount": 0.2}}],
                "default": {"discount": 0.0}
            }
        });
        let config = MockConfig::from_json(&raw).unwrap();
        assert!(matches!(config.mocks.get("GetUser"), Some(MockDefinition::Fixed { .. })));
        assert!(matches!(config.mocks.get("Classify"), Some(MockDefinition::Conditional { .. })));
    }
}
