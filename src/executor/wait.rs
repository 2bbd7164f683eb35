//! `Wait`: suspends for a fixed duration, a JSONPath-resolved duration, or
//! until a timestamp, then passes its input through unchanged.

use super::{strategy_for, transition_outcome, StepOutcome};
use crate::asl::state::WaitState;
use crate::error::HarnessError;
use crate::expr::{jsonpath, Bindings};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;

pub async fn execute(
    state: &WaitState,
    raw_input: &Value,
    bindings: &mut Bindings,
    context_object: &Value,
    wait_cap: Duration,
) -> Result<StepOutcome, HarnessError> {
    let strategy = strategy_for(state.query_language);
    let effective = strategy.preprocess(&state.transform, raw_input, bindings, context_object)?;
    let seconds = resolve_wait_seconds(state, &effective)?;
    let duration = Duration::from_secs_f64(seconds.max(0.0)).min(wait_cap);
    tokio::time::sleep(duration).await;
    let output = strategy.postprocess(&state.transform, raw_input, &effective, bindings, context_object)?;
    Ok(transition_outcome(&state.transition, output))
}

fn resolve_wait_seconds(state: &WaitState, effective: &Value) -> Result<f64, HarnessError> {
    if let Some(seconds) = state.seconds {
        return Ok(seconds);
    }
    if let Some(path) = &state.seconds_path {
        return Ok(jsonpath::evaluate(path, effective)?.as_f64().unwrap_or(0.0));
    }
    if let Some(timestamp) = &state.timestamp {
        return Ok(seconds_until(timestamp));
    }
    if let Some(path) = &state.timestamp_path {
        let value = jsonpath::evaluate(path, effective)?;
        return Ok(value.as_str().map(seconds_until).unwrap_or(0.0));
    }
    Ok(0.0)
}

fn seconds_until(timestamp: &str) -> f64 {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(target) => (target.with_timezone(&Utc) - Utc::now()).num_milliseconds() as f64 / 1000.0,
        Err(_) => 0.0,
    }
}
