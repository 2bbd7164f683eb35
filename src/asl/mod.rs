//! The Amazon States Language model: typed states ([`state`]) built from raw
//! JSON by a validating factory ([`builder`]).

pub mod builder;
pub mod state;

pub use builder::compile;
pub use state::{State, StateMachine, Transition};
