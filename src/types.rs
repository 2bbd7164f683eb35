//! Shared domain identifiers: the expression-language mode and the fixed
//! pseudo-values AWS assigns to the synthesized context object.
//!
//! Modeled after the upstream `NodeKind`/`ChannelType` convention: small
//! tagged enums with `Display` and round-trip-friendly `serde` derives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The expression language a state (or the whole machine) evaluates under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryLanguage {
    #[serde(rename = "JSONPath")]
    JsonPath,
    #[serde(rename = "JSONata")]
    Jsonata,
}

impl Default for QueryLanguage {
    fn default() -> Self {
        QueryLanguage::JsonPath
    }
}

impl fmt::Display for QueryLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryLanguage::JsonPath => write!(f, "JSONPath"),
            QueryLanguage::Jsonata => write!(f, "JSONata"),
        }
    }
}

/// Fixed pseudo-values AWS Step Functions assigns for reproducible test runs.
pub mod fixed_context {
    pub const EXECUTION_ID: &str =
        "arn:aws:states:us-east-1:123456789012:execution:StateMachine:test-execution";
    pub const EXECUTION_NAME: &str = "test-execution";
    pub const EXECUTION_START_TIME: &str = "2024-01-01T00:00:00.000Z";
    pub const EXECUTION_ROLE_ARN: &str = "arn:aws:iam::123456789012:role/StepFunctionsRole";
    pub const STATE_MACHINE_NAME: &str = "StateMachine";
    pub const STATE_MACHINE_ID: &str =
        "arn:aws:states:us-east-1:123456789012:stateMachine:StateMachine";
    pub const STATE_ENTERED_TIME: &str = "2024-01-01T00:00:00.000Z";
}
