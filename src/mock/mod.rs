//! The mock engine: resolves `Task` invocations and `Map` `ItemReader`s
//! against a loaded configuration instead of calling real AWS services.

pub mod config;
pub mod engine;
pub mod loader;

pub use config::{ConditionalRule, MockConfig, MockDefinition, WhenClause};
pub use engine::MockEngine;
