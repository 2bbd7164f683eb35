//! The factory: the single place raw ASL JSON is discriminated into the
//! typed [`super::state`] model. After `compile` returns, no downcast or
//! re-validation is ever needed by an executor.

use super::state::*;
use crate::error::BuildError;
use crate::types::QueryLanguage;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

/// Compile a top-level ASL document (`StartAt`/`States`[/`QueryLanguage`])
/// into a [`StateMachine`].
pub fn compile(doc: &Value) -> Result<StateMachine, BuildError> {
    compile_machine(doc, QueryLanguage::JsonPath, "<machine>")
}

fn mode_of(obj: &Map<String, Value>, inherited: QueryLanguage) -> QueryLanguage {
    match obj.get("QueryLanguage").and_then(Value::as_str) {
        Some("JSONata") => QueryLanguage::Jsonata,
        Some(_) => QueryLanguage::JsonPath,
        None => inherited,
    }
}

fn compile_machine(
    raw: &Value,
    inherited: QueryLanguage,
    machine_label: &str,
) -> Result<StateMachine, BuildError> {
    let obj = raw.as_object().ok_or_else(|| BuildError::MissingField {
        state: machine_label.to_string(),
        field: "States",
    })?;
    let lang = mode_of(obj, inherited);
    let start_at = obj
        .get("StartAt")
        .and_then(Value::as_str)
        .ok_or_else(|| BuildError::MissingField {
            state: machine_label.to_string(),
            field: "StartAt",
        })?
        .to_string();
    let states_obj = obj
        .get("States")
        .and_then(Value::as_object)
        .ok_or_else(|| BuildError::MissingField {
            state: machine_label.to_string(),
            field: "States",
        })?;

    let mut states = FxHashMap::default();
    for (name, raw_state) in states_obj {
        states.insert(name.clone(), compile_state(name, raw_state, lang)?);
    }
    if !states.contains_key(&start_at) {
        return Err(BuildError::BadStartAt { start_at });
    }
    for (name, state) in &states {
        for target in collect_targets(state) {
            if !states.contains_key(&target) {
                return Err(BuildError::UnresolvedTarget {
                    state: name.clone(),
                    target,
                });
            }
        }
    }
    Ok(StateMachine {
        start_at,
        states,
        query_language: lang,
    })
}

fn collect_targets(state: &State) -> Vec<String> {
    let mut out = Vec::new();
    let push_transition = |t: &Transition, out: &mut Vec<String>| {
        if let Transition::Next(n) = t {
            out.push(n.clone());
        }
    };
    let push_catch = |catch: &[Catcher], out: &mut Vec<String>| {
        for c in catch {
            out.push(c.next.clone());
        }
    };
    match state {
        State::Pass(s) => push_transition(&s.transition, &mut out),
        State::Task(s) => {
            push_transition(&s.transition, &mut out);
            push_catch(&s.catch, &mut out);
        }
        State::Wait(s) => push_transition(&s.transition, &mut out),
        State::Choice(s) => {
            for rule in &s.choices {
                out.push(rule.next.clone());
            }
            if let Some(d) = &s.default {
                out.push(d.clone());
            }
        }
        State::Succeed(_) | State::Fail(_) => {}
        State::Parallel(s) => {
            push_transition(&s.transition, &mut out);
            push_catch(&s.catch, &mut out);
        }
        State::Map(s) => {
            push_transition(&s.transition, &mut out);
            push_catch(&s.catch, &mut out);
        }
    }
    out
}

fn obj_of<'a>(raw: &'a Value, name: &str) -> Result<&'a Map<String, Value>, BuildError> {
    raw.as_object().ok_or_else(|| BuildError::MissingField {
        state: name.to_string(),
        field: "Type",
    })
}

fn compile_state(name: &str, raw: &Value, inherited_lang: QueryLanguage) -> Result<State, BuildError> {
    let obj = obj_of(raw, name)?;
    let lang = mode_of(obj, inherited_lang);
    let type_name = obj
        .get("Type")
        .and_then(Value::as_str)
        .ok_or_else(|| BuildError::MissingField {
            state: name.to_string(),
            field: "Type",
        })?;
    match type_name {
        "Pass" => compile_pass(name, obj, lang),
        "Task" => compile_task(name, obj, lang),
        "Wait" => compile_wait(name, obj, lang),
        "Choice" => compile_choice(name, obj, lang),
        "Succeed" => compile_succeed(name, obj, lang),
        "Fail" => compile_fail(name, obj, lang),
        "Parallel" => compile_parallel(name, obj, lang),
        "Map" => compile_map(name, obj, lang),
        other => Err(BuildError::UnknownType {
            state: name.to_string(),
            type_name: other.to_string(),
        }),
    }
}

const JSONPATH_ONLY_FIELDS: &[&str] = &[
    "InputPath",
    "OutputPath",
    "Parameters",
    "ResultPath",
    "ResultSelector",
    "ItemsPath",
    "SecondsPath",
    "TimestampPath",
];

fn check_mode_violations(
    name: &str,
    obj: &Map<String, Value>,
    mode: QueryLanguage,
) -> Result<(), BuildError> {
    if mode == QueryLanguage::Jsonata {
        for field in JSONPATH_ONLY_FIELDS {
            if obj.contains_key(*field) {
                return Err(BuildError::ModeViolation {
                    state: name.to_string(),
                    field,
                    mode: "JSONata",
                });
            }
        }
    }
    Ok(())
}

fn parse_transform(
    name: &str,
    obj: &Map<String, Value>,
    mode: QueryLanguage,
) -> Result<Transform, BuildError> {
    check_mode_violations(name, obj, mode)?;
    Ok(Transform {
        input_path: obj.get("InputPath").and_then(Value::as_str).map(String::from),
        parameters: obj.get("Parameters").cloned(),
        arguments: obj.get("Arguments").cloned(),
        result_selector: obj.get("ResultSelector").cloned(),
        result_path: match obj.get("ResultPath") {
            Some(Value::Null) => Some("DISCARD".to_string()),
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        },
        output_path: obj.get("OutputPath").and_then(Value::as_str).map(String::from),
        assign: obj.get("Assign").cloned(),
        output: obj.get("Output").cloned(),
    })
}

fn parse_transition(name: &str, obj: &Map<String, Value>) -> Result<Transition, BuildError> {
    let next = obj.get("Next").and_then(Value::as_str);
    let end = obj.get("End").and_then(Value::as_bool).unwrap_or(false);
    match (next, end) {
        (Some(n), false) => Ok(Transition::Next(n.to_string())),
        (None, true) => Ok(Transition::End),
        (Some(_), true) => Err(BuildError::BadChoiceRule {
            state: name.to_string(),
            reason: "a state cannot set both 'Next' and 'End: true'".to_string(),
        }),
        (None, false) => Err(BuildError::MissingField {
            state: name.to_string(),
            field: "Next or End",
        }),
    }
}

fn parse_retriers(obj: &Map<String, Value>) -> Vec<Retrier> {
    obj.get("Retry")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_object)
                .map(|r| Retrier {
                    error_equals: string_array(r, "ErrorEquals"),
                    interval_seconds: r.get("IntervalSeconds").and_then(Value::as_u64).unwrap_or(1) as u32,
                    max_attempts: r.get("MaxAttempts").and_then(Value::as_u64).unwrap_or(3) as u32,
                    backoff_rate: r.get("BackoffRate").and_then(Value::as_f64).unwrap_or(2.0),
                    max_delay_seconds: r.get("MaxDelaySeconds").and_then(Value::as_u64).map(|v| v as u32),
                    jitter_strategy: match r.get("JitterStrategy").and_then(Value::as_str) {
                        Some("FULL") => JitterStrategy::Full,
                        _ => JitterStrategy::None,
                    },
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_catchers(obj: &Map<String, Value>) -> Vec<Catcher> {
    obj.get("Catch")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_object)
                .filter_map(|c| {
                    let next = c.get("Next").and_then(Value::as_str)?.to_string();
                    Some(Catcher {
                        error_equals: string_array(c, "ErrorEquals"),
                        next,
                        result_path: c.get("ResultPath").and_then(Value::as_str).map(String::from),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn string_array(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_else(|| vec!["States.ALL".to_string()])
}

fn compile_pass(name: &str, obj: &Map<String, Value>, mode: QueryLanguage) -> Result<State, BuildError> {
    Ok(State::Pass(PassState {
        query_language: mode,
        result: obj.get("Result").cloned(),
        transform: parse_transform(name, obj, mode)?,
        transition: parse_transition(name, obj)?,
    }))
}

fn compile_task(name: &str, obj: &Map<String, Value>, mode: QueryLanguage) -> Result<State, BuildError> {
    let resource = obj
        .get("Resource")
        .and_then(Value::as_str)
        .ok_or_else(|| BuildError::MissingField {
            state: name.to_string(),
            field: "Resource",
        })?
        .to_string();
    Ok(State::Task(TaskState {
        query_language: mode,
        resource,
        transform: parse_transform(name, obj, mode)?,
        retry: parse_retriers(obj),
        catch: parse_catchers(obj),
        transition: parse_transition(name, obj)?,
    }))
}

fn compile_wait(name: &str, obj: &Map<String, Value>, mode: QueryLanguage) -> Result<State, BuildError> {
    Ok(State::Wait(WaitState {
        query_language: mode,
        seconds: obj.get("Seconds").and_then(Value::as_f64),
        seconds_path: obj.get("SecondsPath").and_then(Value::as_str).map(String::from),
        timestamp: obj.get("Timestamp").and_then(Value::as_str).map(String::from),
        timestamp_path: obj.get("TimestampPath").and_then(Value::as_str).map(String::from),
        transform: parse_transform(name, obj, mode)?,
        transition: parse_transition(name, obj)?,
    }))
}

fn compile_succeed(name: &str, obj: &Map<String, Value>, mode: QueryLanguage) -> Result<State, BuildError> {
    Ok(State::Succeed(SucceedState {
        query_language: mode,
        transform: parse_transform(name, obj, mode)?,
    }))
}

fn compile_fail(_name: &str, obj: &Map<String, Value>, mode: QueryLanguage) -> Result<State, BuildError> {
    Ok(State::Fail(FailState {
        query_language: mode,
        error: obj.get("Error").and_then(Value::as_str).map(String::from),
        cause: obj.get("Cause").and_then(Value::as_str).map(String::from),
        error_path: obj.get("ErrorPath").and_then(Value::as_str).map(String::from),
        cause_path: obj.get("CausePath").and_then(Value::as_str).map(String::from),
    }))
}

fn compile_parallel(name: &str, obj: &Map<String, Value>, mode: QueryLanguage) -> Result<State, BuildError> {
    let raw_branches = obj
        .get("Branches")
        .and_then(Value::as_array)
        .ok_or_else(|| BuildError::MissingField {
            state: name.to_string(),
            field: "Branches",
        })?;
    let branches = raw_branches
        .iter()
        .enumerate()
        .map(|(i, b)| compile_machine(b, mode, &format!("{name}[branch {i}]")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(State::Parallel(ParallelState {
        query_language: mode,
        branches,
        transform: parse_transform(name, obj, mode)?,
        retry: parse_retriers(obj),
        catch: parse_catchers(obj),
        transition: parse_transition(name, obj)?,
    }))
}

fn compile_map(name: &str, obj: &Map<String, Value>, mode: QueryLanguage) -> Result<State, BuildError> {
    let processor_obj = obj
        .get("ItemProcessor")
        .or_else(|| obj.get("Iterator"))
        .ok_or_else(|| BuildError::MissingField {
            state: name.to_string(),
            field: "ItemProcessor",
        })?;
    let proc_map = processor_obj.as_object().ok_or_else(|| BuildError::MissingField {
        state: name.to_string(),
        field: "ItemProcessor",
    })?;
    let map_mode = proc_map
        .get("ProcessorConfig")
        .and_then(Value::as_object)
        .and_then(|c| c.get("Mode"))
        .and_then(Value::as_str);
    let mode_tag = match map_mode {
        Some("DISTRIBUTED") => MapMode::Distributed,
        _ => MapMode::Inline,
    };
    let item_processor = Box::new(compile_machine(processor_obj, mode, &format!("{name}[processor]"))?);

    let item_reader = obj.get("ItemReader").and_then(Value::as_object).map(|r| ItemReaderSpec {
        resource: r.get("Resource").and_then(Value::as_str).unwrap_or_default().to_string(),
        parameters: r.get("Parameters").cloned().unwrap_or(Value::Null),
        max_items: r.get("ReaderConfig").and_then(Value::as_object).and_then(|c| c.get("MaxItems")).and_then(Value::as_u64).map(|v| v as u32),
    });
    let item_batcher = obj.get("ItemBatcher").and_then(Value::as_object).map(|b| ItemBatcherSpec {
        max_items_per_batch: b.get("MaxItemsPerBatch").and_then(Value::as_u64).map(|v| v as u32),
        max_input_bytes_per_batch: b.get("MaxInputBytesPerBatch").and_then(Value::as_u64),
        batch_input: b.get("BatchInput").cloned(),
    });
    let result_writer = obj.get("ResultWriter").and_then(Value::as_object).map(|w| ResultWriterSpec {
        resource: w.get("Resource").and_then(Value::as_str).map(String::from),
        bucket: w
            .get("Parameters")
            .and_then(Value::as_object)
            .and_then(|p| p.get("Bucket"))
            .and_then(Value::as_str)
            .map(String::from),
        prefix: w
            .get("Parameters")
            .and_then(Value::as_object)
            .and_then(|p| p.get("Prefix"))
            .and_then(Value::as_str)
            .map(String::from),
    });

    Ok(State::Map(MapState {
        query_language: mode,
        mode: mode_tag,
        items_path: obj.get("ItemsPath").and_then(Value::as_str).map(String::from),
        items: obj.get("Items").cloned(),
        item_selector: obj.get("ItemSelector").cloned(),
        parameters: obj.get("Parameters").cloned(),
        max_concurrency: obj.get("MaxConcurrency").and_then(Value::as_u64).map(|v| v as u32),
        item_processor,
        item_reader,
        item_batcher,
        result_writer,
        tolerated_failure_count: parse_tolerance(obj, "ToleratedFailureCount", "ToleratedFailureCountPath"),
        tolerated_failure_percentage: parse_tolerance(
            obj,
            "ToleratedFailurePercentage",
            "ToleratedFailurePercentagePath",
        ),
        transform: parse_transform(name, obj, mode)?,
        retry: parse_retriers(obj),
        catch: parse_catchers(obj),
        transition: parse_transition(name, obj)?,
    }))
}

fn parse_tolerance(obj: &Map<String, Value>, literal_key: &str, path_key: &str) -> Option<ToleranceValue> {
    if let Some(n) = obj.get(literal_key).and_then(Value::as_f64) {
        return Some(ToleranceValue::Count(n));
    }
    obj.get(path_key)
        .and_then(Value::as_str)
        .map(|p| ToleranceValue::Path(p.to_string()))
}

fn compile_choice(name: &str, obj: &Map<String, Value>, mode: QueryLanguage) -> Result<State, BuildError> {
    let raw_choices = obj
        .get("Choices")
        .and_then(Value::as_array)
        .ok_or_else(|| BuildError::MissingField {
            state: name.to_string(),
            field: "Choices",
        })?;
    let choices = raw_choices
        .iter()
        .map(|c| compile_choice_rule(name, c, mode))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(State::Choice(ChoiceState {
        query_language: mode,
        choices,
        default: obj.get("Default").and_then(Value::as_str).map(String::from),
    }))
}

fn compile_choice_rule(state_name: &str, raw: &Value, mode: QueryLanguage) -> Result<ChoiceRule, BuildError> {
    let obj = raw.as_object().ok_or_else(|| BuildError::BadChoiceRule {
        state: state_name.to_string(),
        reason: "choice rule must be an object".to_string(),
    })?;
    let next = obj
        .get("Next")
        .and_then(Value::as_str)
        .ok_or_else(|| BuildError::BadChoiceRule {
            state: state_name.to_string(),
            reason: "choice rule missing 'Next'".to_string(),
        })?
        .to_string();
    let predicate = if mode == QueryLanguage::Jsonata {
        let condition = obj
            .get("Condition")
            .and_then(Value::as_str)
            .ok_or_else(|| BuildError::BadChoiceRule {
                state: state_name.to_string(),
                reason: "JSONata choice rule missing 'Condition'".to_string(),
            })?;
        let stripped = condition
            .strip_prefix("{%")
            .and_then(|s| s.strip_suffix("%}"))
            .ok_or_else(|| BuildError::BadJsonataCondition {
                state: state_name.to_string(),
            })?
            .trim()
            .to_string();
        Predicate::Jsonata(stripped)
    } else {
        parse_predicate(state_name, obj)?
    };
    Ok(ChoiceRule { predicate, next })
}

fn parse_predicate(state_name: &str, obj: &Map<String, Value>) -> Result<Predicate, BuildError> {
    if let Some(arr) = obj.get("And").and_then(Value::as_array) {
        return Ok(Predicate::And(
            arr.iter()
                .map(|v| parse_predicate_value(state_name, v))
                .collect::<Result<_, _>>()?,
        ));
    }
    if let Some(arr) = obj.get("Or").and_then(Value::as_array) {
        return Ok(Predicate::Or(
            arr.iter()
                .map(|v| parse_predicate_value(state_name, v))
                .collect::<Result<_, _>>()?,
        ));
    }
    if let Some(inner) = obj.get("Not") {
        return Ok(Predicate::Not(Box::new(parse_predicate_value(state_name, inner)?)));
    }
    let variable = obj
        .get("Variable")
        .and_then(Value::as_str)
        .ok_or_else(|| BuildError::BadChoiceRule {
            state: state_name.to_string(),
            reason: "comparison rule missing 'Variable'".to_string(),
        })?
        .to_string();
    let op = parse_comparison_op(state_name, obj)?;
    Ok(Predicate::Compare { variable, op })
}

fn parse_predicate_value(state_name: &str, raw: &Value) -> Result<Predicate, BuildError> {
    let obj = raw.as_object().ok_or_else(|| BuildError::BadChoiceRule {
        state: state_name.to_string(),
        reason: "nested choice predicate must be an object".to_string(),
    })?;
    parse_predicate(state_name, obj)
}

macro_rules! str_op {
    ($obj:expr, $key:expr, $variant:ident) => {
        if let Some(v) = $obj.get($key) {
            return Ok(ComparisonOp::$variant(v.clone()));
        }
    };
}

macro_rules! str_path_op {
    ($obj:expr, $key:expr, $variant:ident) => {
        if let Some(v) = $obj.get($key).and_then(Value::as_str) {
            return Ok(ComparisonOp::$variant(v.to_string()));
        }
    };
}

macro_rules! num_op {
    ($obj:expr, $key:expr, $variant:ident) => {
        if let Some(v) = $obj.get($key).and_then(Value::as_f64) {
            return Ok(ComparisonOp::$variant(v));
        }
    };
}

macro_rules! bool_op {
    ($obj:expr, $key:expr, $variant:ident) => {
        if let Some(v) = $obj.get($key).and_then(Value::as_bool) {
            return Ok(ComparisonOp::$variant(v));
        }
    };
}

fn parse_comparison_op(state_name: &str, obj: &Map<String, Value>) -> Result<ComparisonOp, BuildError> {
    str_op!(obj, "StringEquals", StringEquals);
    str_path_op!(obj, "StringEqualsPath", StringEqualsPath);
    str_path_op!(obj, "StringLessThan", StringLessThan);
    str_path_op!(obj, "StringLessThanPath", StringLessThanPath);
    str_path_op!(obj, "StringGreaterThan", StringGreaterThan);
    str_path_op!(obj, "StringGreaterThanPath", StringGreaterThanPath);
    str_path_op!(obj, "StringLessThanEquals", StringLessThanEquals);
    str_path_op!(obj, "StringLessThanEqualsPath", StringLessThanEqualsPath);
    str_path_op!(obj, "StringGreaterThanEquals", StringGreaterThanEquals);
    str_path_op!(obj, "StringGreaterThanEqualsPath", StringGreaterThanEqualsPath);
    num_op!(obj, "NumericEquals", NumericEquals);
    str_path_op!(obj, "NumericEqualsPath", NumericEqualsPath);
    num_op!(obj, "NumericLessThan", NumericLessThan);
    str_path_op!(obj, "NumericLessThanPath", NumericLessThanPath);
    num_op!(obj, "NumericGreaterThan", NumericGreaterThan);
    str_path_op!(obj, "NumericGreaterThanPath", NumericGreaterThanPath);
    num_op!(obj, "NumericLessThanEquals", NumericLessThanEquals);
    str_path_op!(obj, "NumericLessThanEqualsPath", NumericLessThanEqualsPath);
    num_op!(obj, "NumericGreaterThanEquals", NumericGreaterThanEquals);
    str_path_op!(obj, "NumericGreaterThanEqualsPath", NumericGreaterThanEqualsPath);
    bool_op!(obj, "BooleanEquals", BooleanEquals);
    str_path_op!(obj, "BooleanEqualsPath", BooleanEqualsPath);
    str_path_op!(obj, "TimestampEquals", TimestampEquals);
    str_path_op!(obj, "TimestampEqualsPath", TimestampEqualsPath);
    str_path_op!(obj, "TimestampLessThan", TimestampLessThan);
    str_path_op!(obj, "TimestampLessThanPath", TimestampLessThanPath);
    str_path_op!(obj, "TimestampGreaterThan", TimestampGreaterThan);
    str_path_op!(obj, "TimestampGreaterThanPath", TimestampGreaterThanPath);
    str_path_op!(obj, "TimestampLessThanEquals", TimestampLessThanEquals);
    str_path_op!(obj, "TimestampLessThanEqualsPath", TimestampLessThanEqualsPath);
    str_path_op!(obj, "TimestampGreaterThanEquals", TimestampGreaterThanEquals);
    str_path_op!(obj, "TimestampGreaterThanEqualsPath", TimestampGreaterThanEqualsPath);
    bool_op!(obj, "IsNull", IsNull);
    bool_op!(obj, "IsNumeric", IsNumeric);
    bool_op!(obj, "IsString", IsString);
    bool_op!(obj, "IsBoolean", IsBoolean);
    bool_op!(obj, "IsTimestamp", IsTimestamp);
    bool_op!(obj, "IsPresent", IsPresent);
    str_path_op!(obj, "StringMatches", StringMatches);
    Err(BuildError::BadChoiceRule {
        state: state_name.to_string(),
        reason: "no recognized comparison operator".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compiles_a_pass_chain() {
        let doc = json!({
            "StartAt": "A",
            "States": {
                "A": {"Type": "Pass", "Result": "hi", "Next": "B"},
                "B": {"Type": "Pass", "End": true}
            }
        });
        let machine = compile(&doc).unwrap();
        assert_eq!(machine.start_at, "A");
        assert!(matches!(machine.get("A"), Some(State::Pass(_))));
    }

    #[test]
    fn rejects_unresolved_next_target() {
        let doc = json!({
            "StartAt": "A",
            "States": {"A": {"Type": "Pass", "Next": "Missing"}}
        });
        assert!(matches!(compile(&doc), Err(BuildError::UnresolvedTarget { .. })));
    }

    #[test]
    fn rejects_jsonpath_field_in_jsonata_mode() {
        let doc = json!({
            "QueryLanguage": "JSONata",
            "StartAt": "A",
            "States": {"A": {"Type": "Pass", "InputPath": "$.x", "End": true}}
        });
        assert!(matches!(compile(&doc), Err(BuildError::ModeViolation { .. })));
    }

    #[test]
    fn rejects_both_next_and_end() {
        let doc = json!({
            "StartAt": "A",
            "States": {"A": {"Type": "Pass", "Next": "A", "End": true}}
        });
        assert!(matches!(compile(&doc), Err(BuildError::BadChoiceRule { .. })));
    }

    #[test]
    fn compiles_choice_with_and_combinator() {
        let doc = json!({
            "StartAt": "C",
            "States": {
                "C": {"Type": "Choice", "Choices": [
                    {"And": [{"Variable": "$.x", "NumericGreaterThan": 1}], "Next": "A"}
                ], "Default": "A"},
                "A": {"Type": "Succeed"}
            }
        });
        let machine = compile(&doc).unwrap();
        let State::Choice(c) = machine.get("C").unwrap() else { panic!() };
        assert!(matches!(c.choices[0].predicate, Predicate::And(_)));
    }
}
