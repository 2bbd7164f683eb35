//! # sfn-harness: a local Amazon States Language interpreter and test harness
//!
//! Runs ASL state machines — both JSONPath- and JSONata-flavored — against a
//! programmable mock engine instead of real AWS services, for fast,
//! deterministic workflow tests.
//!
//! ## Core Concepts
//!
//! - **[`asl`]**: the typed state model, built from raw JSON by a validating
//!   factory (construction errors surface before a single state runs).
//! - **[`expr`]**: the two expression pipelines — JSONPath path extraction
//!   plus `States.*` intrinsics, and a hand-rolled JSONata-subset evaluator.
//! - **[`strategy`]**: the per-query-language input/output transform
//!   pipeline every non-terminal state runs through.
//! - **[`executor`]** / **[`machine_executor`]**: per-state-type execution
//!   and the step loop that drives a state machine to completion.
//! - **[`mock`]**: resolves `Task` invocations against fixed, conditional,
//!   stateful, or error-injecting mock definitions.
//!
//! ## Quick Start
//!
//! ```
//! use sfn_harness::asl::builder::compile;
//! use sfn_harness::config::HarnessConfig;
//! use sfn_harness::machine_executor::{run_machine, RunStatus};
//! use sfn_harness::mock::MockEngine;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let doc = json!({
//!     "StartAt": "Greet",
//!     "States": {
//!         "Greet": {
//!             "Type": "Pass",
//!             "Parameters": {"greeting.$": "States.Format('Hello, {}!', $.name)"},
//!             "End": true
//!         }
//!     }
//! });
//! let machine = compile(&doc).unwrap();
//! let config = HarnessConfig::default();
//! let mocks = MockEngine::empty();
//!
//! let result = run_machine(&machine, json!({"name": "Ada"}), &config, &mocks, config.step_limit_top)
//!     .await
//!     .unwrap();
//!
//! match result.status {
//!     RunStatus::Succeeded(output) => assert_eq!(output, json!({"greeting": "Hello, Ada!"})),
//!     RunStatus::Failed { .. } => panic!("expected success"),
//! }
//! # }
//! ```
//!
//! ### Mocking a Task
//!
//! ```
//! use sfn_harness::mock::{MockConfig, MockDefinition, MockEngine};
//! use serde_json::json;
//!
//! let raw = json!({"ChargeCard": {"type": "fixed", "response": {"status": "charged"}}});
//! let engine = MockEngine::new(MockConfig::from_json(&raw).unwrap());
//! let response = engine.invoke("ChargeCard", "arn:aws:states:::lambda:invoke", &json!({})).unwrap();
//! assert_eq!(response, json!({"status": "charged"}));
//! # let _ = MockDefinition::Fixed { response: json!(null) };
//! ```
//!
//! ## Module Guide
//!
//! - [`asl`] - the tagged state-variant model and its build-time validator
//! - [`expr`] - JSONPath/intrinsics and the JSONata-subset evaluator
//! - [`strategy`] - JSONPath vs JSONata input/output transform pipelines
//! - [`context`] - the mutable `$$` execution context
//! - [`resilience`] - shared `Retry`/`Catch` resolution
//! - [`executor`] - one module per ASL state type
//! - [`machine_executor`] - the state-machine step loop
//! - [`mock`] - the mock engine and mock-file loader
//! - [`config`] - harness-wide tunables (step limits, wait cap, mock base path)
//! - [`error`] - the error taxonomy (`BuildError`, `EvalError`, `ControlError`, `MockError`, `TaskError`)
//! - [`types`] - shared small types (`QueryLanguage`, fixed pseudo-context values)
//! - [`utils`] - JSON path get/set and partial-deep-equal helpers

pub mod asl;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod expr;
pub mod machine_executor;
pub mod mock;
pub mod resilience;
pub mod strategy;
pub mod types;
pub mod utils;
