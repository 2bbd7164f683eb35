//! `Map`: iterates a collection, running the `ItemProcessor` once per item
//! (bounded by `MaxConcurrency`) and collecting ordered outputs. `Inline`
//! iterations inherit the outer variable scope read-only; `Distributed`
//! iterations run isolated. An `Inline` Map degrades to sequential iteration
//! whenever the outer scope already holds variables, since concurrent
//! iterations must not observe each other's (nonexistent) writes but a
//! non-empty outer scope signals a workflow that relies on evaluation order.

use super::{merge_caught_error, strategy_for, transition_outcome, StepOutcome};
use crate::asl::state::{ItemBatcherSpec, MapMode, MapState, ToleranceValue};
use crate::config::HarnessConfig;
use crate::context::{ExecutionContext, MapExecutionRecord};
use crate::error::{HarnessError, MockError, TaskError};
use crate::expr::{jsonpath, payload, Bindings};
use crate::machine_executor::{run_machine_with_variables, MachineResult, RunStatus};
use crate::mock::MockEngine;
use crate::resilience::{choose_resolution, fresh_attempts, Resolution};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

pub async fn execute(
    state_name: &str,
    state: &MapState,
    raw_input: &Value,
    bindings: &mut Bindings,
    context_object: &Value,
    config: &HarnessConfig,
    mocks: &MockEngine,
    ctx: &mut ExecutionContext,
) -> Result<StepOutcome, HarnessError> {
    let strategy = strategy_for(state.query_language);
    let effective = strategy.preprocess(&state.transform, raw_input, bindings, context_object)?;
    let raw_items = resolve_items(state_name, state, &effective, config, mocks)?;
    let item_count = raw_items.len();
    let items = match &state.item_batcher {
        Some(batcher) => apply_batching(batcher, raw_items),
        None => raw_items,
    };
    let mut attempts = fresh_attempts(&state.retry);
    let sequential = state.mode == MapMode::Inline && !bindings.variables.is_empty();
    let iteration_variables = if state.mode == MapMode::Inline { bindings.variables.clone() } else { BTreeMap::new() };

    loop {
        let slots = if sequential {
            run_sequential(state, &items, &effective, &iteration_variables, config, mocks).await
        } else {
            run_concurrent(state, &items, &effective, &iteration_variables, config, mocks).await
        };

        let mut outputs = Vec::with_capacity(slots.len());
        let mut iteration_paths = Vec::with_capacity(slots.len());
        let mut failures = 0usize;
        let mut first_failure: Option<TaskError> = None;
        for slot in slots.into_iter().flatten() {
            match slot {
                Ok(run) => {
                    iteration_paths.push(run.execution_path.clone());
                    match run.status {
                        RunStatus::Succeeded(output) => outputs.push(output),
                        RunStatus::Failed { error, cause } => {
                            failures += 1;
                            first_failure.get_or_insert_with(|| TaskError::new(error, cause));
                        }
                    }
                }
                Err(err) => {
                    iteration_paths.push(Vec::new());
                    failures += 1;
                    first_failure.get_or_insert_with(|| TaskError::new("States.Runtime", err.to_string()));
                }
            }
        }

        if first_failure.is_none() || within_tolerance(state, failures, items.len(), &effective) {
            let result_count = outputs.len();
            ctx.map_executions.push(MapExecutionRecord {
                state: state_name.to_string(),
                iteration_count: items.len(),
                iteration_paths,
                item_count,
                result_count: Some(result_count),
            });
            let raw_result = match &state.result_writer {
                Some(writer) => json!({
                    "ProcessedItemCount": result_count,
                    "ResultWriterDetails": {"Bucket": writer.bucket, "Prefix": writer.prefix},
                }),
                None => Value::Array(outputs),
            };
            let output = strategy.postprocess(&state.transform, raw_input, &raw_result, bindings, context_object)?;
            return Ok(transition_outcome(&state.transition, output));
        }

        ctx.map_executions.push(MapExecutionRecord {
            state: state_name.to_string(),
            iteration_count: items.len(),
            iteration_paths,
            item_count,
            result_count: None,
        });

        let task_err = first_failure.expect("failure branch always records a TaskError");
        match choose_resolution(&state.retry, &state.catch, &mut attempts, &task_err) {
            Resolution::Retry(delay) => {
                tokio::time::sleep(delay.min(config.wait_cap)).await;
            }
            Resolution::Catch { next, result_path } => {
                let merged = merge_caught_error(raw_input, &task_err.to_json(), result_path.as_deref());
                return Ok(StepOutcome::Next { output: merged, next });
            }
            Resolution::Propagate => return Err(HarnessError::Task(task_err)),
        }
    }
}

/// Groups raw items into `{...BatchInput, Items: [...]}` objects bounded by
/// `MaxItemsPerBatch` (count) and `MaxInputBytesPerBatch` (serialized size).
fn apply_batching(batcher: &ItemBatcherSpec, items: Vec<Value>) -> Vec<Value> {
    let max_items = batcher.max_items_per_batch.map(|n| n as usize).unwrap_or(usize::MAX).max(1);
    let max_bytes = batcher.max_input_bytes_per_batch.map(|n| n as usize).unwrap_or(usize::MAX);

    let mut batches = Vec::new();
    let mut current: Vec<Value> = Vec::new();
    let mut current_bytes = 0usize;

    for item in items {
        let item_bytes = serde_json::to_vec(&item).map(|v| v.len()).unwrap_or(0);
        let would_overflow_count = current.len() >= max_items;
        let would_overflow_bytes = !current.is_empty() && current_bytes + item_bytes > max_bytes;
        if would_overflow_count || would_overflow_bytes {
            batches.push(finish_batch(batcher, std::mem::take(&mut current)));
            current_bytes = 0;
        }
        current_bytes += item_bytes;
        current.push(item);
    }
    if !current.is_empty() {
        batches.push(finish_batch(batcher, current));
    }
    batches
}

fn finish_batch(batcher: &ItemBatcherSpec, items: Vec<Value>) -> Value {
    let mut batch = match &batcher.batch_input {
        Some(Value::Object(map)) => map.clone(),
        _ => serde_json::Map::new(),
    };
    batch.insert("Items".to_string(), Value::Array(items));
    Value::Object(batch)
}

fn as_item_array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

type IterationSlot = Option<Result<MachineResult, HarnessError>>;

fn iteration_input(
    state: &MapState,
    index: usize,
    item: &Value,
    original_input: &Value,
    variables: &BTreeMap<String, Value>,
) -> Result<Value, HarnessError> {
    match state.item_selector.as_ref().or(state.parameters.as_ref()) {
        Some(template) => {
            let map_ctx = payload::map_item_context(index, item, original_input);
            payload::evaluate_template(template, item, variables, &map_ctx).map_err(HarnessError::from)
        }
        None => Ok(item.clone()),
    }
}

/// Every iteration fans out behind a `MaxConcurrency`-sized semaphore; each
/// writes its output into a pre-sized slot so ordering survives completion
/// order.
async fn run_concurrent(
    state: &MapState,
    items: &[Value],
    effective: &Value,
    variables: &BTreeMap<String, Value>,
    config: &HarnessConfig,
    mocks: &MockEngine,
) -> Vec<IterationSlot> {
    let concurrency = state.max_concurrency.filter(|&c| c > 0).unwrap_or(items.len().max(1) as u32);
    let semaphore = Arc::new(Semaphore::new(concurrency as usize));

    let futures = items.iter().enumerate().map(|(index, item)| {
        let semaphore = semaphore.clone();
        async move {
            let _permit = semaphore.acquire_owned().await.expect("map semaphore closed unexpectedly");
            let input = match iteration_input(state, index, item, effective, variables) {
                Ok(v) => v,
                Err(e) => return (index, Err(e)),
            };
            (
                index,
                Box::pin(run_machine_with_variables(&state.item_processor, input, config, mocks, config.step_limit_sub, variables.clone()))
                    .await,
            )
        }
    });

    let mut slots: Vec<IterationSlot> = (0..items.len()).map(|_| None).collect();
    for (index, result) in futures_util::future::join_all(futures).await {
        slots[index] = Some(result);
    }
    slots
}

/// Runs each iteration to completion before starting the next, for the
/// degraded Inline case where a non-empty outer scope implies the workflow
/// depends on evaluation order.
async fn run_sequential(
    state: &MapState,
    items: &[Value],
    effective: &Value,
    variables: &BTreeMap<String, Value>,
    config: &HarnessConfig,
    mocks: &MockEngine,
) -> Vec<IterationSlot> {
    let mut slots = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let result = match iteration_input(state, index, item, effective, variables) {
            Ok(input) => {
                Box::pin(run_machine_with_variables(&state.item_processor, input, config, mocks, config.step_limit_sub, variables.clone()))
                    .await
            }
            Err(e) => Err(e),
        };
        slots.push(Some(result));
    }
    slots
}

fn resolve_items(
    state_name: &str,
    state: &MapState,
    effective: &Value,
    config: &HarnessConfig,
    mocks: &MockEngine,
) -> Result<Vec<Value>, HarnessError> {
    if let Some(items) = &state.items {
        return Ok(as_item_array(items.clone()));
    }
    if let Some(path) = &state.items_path {
        return Ok(as_item_array(jsonpath::evaluate(path, effective)?));
    }
    if let Some(reader) = &state.item_reader {
        return match mocks.item_reader_path(state_name) {
            Some(raw_path) => {
                let resolved = crate::mock::loader::resolve_path(config.mock_base_path.as_deref(), raw_path);
                let mut items = crate::mock::loader::load_items(&resolved)?;
                if let Some(max) = reader.max_items {
                    items.truncate(max as usize);
                }
                Ok(items)
            }
            None => Err(MockError::UnsupportedItemReader { resource: reader.resource.clone() }.into()),
        };
    }
    Ok(Vec::new())
}

/// Resolves a `Count` literal directly, or a `Path` variant against the
/// preprocessed (post-`InputPath`/`Parameters`) input.
fn tolerance_count(value: &ToleranceValue, effective: &Value) -> Option<f64> {
    match value {
        ToleranceValue::Count(limit) => Some(*limit),
        ToleranceValue::Path(path) => jsonpath::evaluate(path, effective).ok().and_then(|v| v.as_f64()),
    }
}

fn within_tolerance(state: &MapState, failures: usize, total: usize, effective: &Value) -> bool {
    if failures == 0 {
        return true;
    }
    if let Some(tolerance) = &state.tolerated_failure_count {
        if let Some(limit) = tolerance_count(tolerance, effective) {
            if (failures as f64) <= limit {
                return true;
            }
        }
    }
    if let Some(tolerance) = &state.tolerated_failure_percentage {
        if let Some(limit_pct) = tolerance_count(tolerance, effective) {
            let pct = (failures as f64 / total.max(1) as f64) * 100.0;
            if pct <= limit_pct {
                return true;
            }
        }
    }
    false
}
