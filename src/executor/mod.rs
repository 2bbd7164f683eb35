//! Per-state-type execution: one module per ASL state type, each
//! implementing the same `preprocess -> core action -> postprocess` shape
//! via the [`crate::strategy::ProcessingStrategy`] the state's query
//! language selects.

pub mod choice;
pub mod map;
pub mod parallel;
pub mod pass;
pub mod succeed_fail;
pub mod task;
pub mod wait;

use crate::asl::state::Transition;
use crate::strategy::{JsonPathStrategy, JsonataStrategy, ProcessingStrategy};
use crate::types::QueryLanguage;
use crate::utils::json_ext;
use serde_json::Value;

/// What a single state step produced: where to go next, or that the
/// machine has finished (successfully or not).
#[derive(Debug, Clone)]
pub enum StepOutcome {
    Next { output: Value, next: String },
    Finished { output: Value },
    Failed { error: String, cause: String },
}

pub(crate) fn strategy_for(lang: QueryLanguage) -> Box<dyn ProcessingStrategy> {
    match lang {
        QueryLanguage::JsonPath => Box::new(JsonPathStrategy),
        QueryLanguage::Jsonata => Box::new(JsonataStrategy),
    }
}

pub(crate) fn transition_outcome(transition: &Transition, output: Value) -> StepOutcome {
    match transition {
        Transition::Next(next) => StepOutcome::Next { output, next: next.clone() },
        Transition::End => StepOutcome::Finished { output },
    }
}

/// Merge a caught error's JSON (`{"Error": ..., "Cause": ...}`) back onto the
/// state's original input at `result_path`, the way AWS's `Catch.ResultPath`
/// is defined: `None`/`"$"` replaces the whole input, a path merges it in.
pub(crate) fn merge_caught_error(raw_input: &Value, error_json: &Value, result_path: Option<&str>) -> Value {
    match result_path {
        None | Some("$") => error_json.clone(),
        Some(path) => {
            let mut base = raw_input.clone();
            let stripped = path.strip_prefix("$.").or_else(|| path.strip_prefix('$')).unwrap_or(path);
            json_ext::set_by_path(&mut base, stripped, error_json.clone());
            base
        }
    }
}
