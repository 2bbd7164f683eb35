//! `Choice`: picks the next state by evaluating each rule's predicate in
//! order (JSONPath comparison/logical trees, or a raw JSONata boolean
//! condition), falling back to `Default`.

use super::StepOutcome;
use crate::asl::state::{ChoiceState, ComparisonOp, Predicate};
use crate::error::{ControlError, HarnessError};
use crate::expr::{jsonata, jsonpath, Bindings};
use serde_json::Value;
use std::cmp::Ordering;

pub fn execute(
    state_name: &str,
    state: &ChoiceState,
    raw_input: &Value,
    bindings: &Bindings,
    context_object: &Value,
) -> Result<StepOutcome, HarnessError> {
    for rule in &state.choices {
        if evaluate_predicate(&rule.predicate, raw_input, bindings, context_object)? {
            return Ok(StepOutcome::Next { output: raw_input.clone(), next: rule.next.clone() });
        }
    }
    match &state.default {
        Some(default) => Ok(StepOutcome::Next { output: raw_input.clone(), next: default.clone() }),
        None => Err(ControlError::NoMatchingChoice { state: state_name.to_string() }.into()),
    }
}

fn evaluate_predicate(
    predicate: &Predicate,
    data: &Value,
    bindings: &Bindings,
    context_object: &Value,
) -> Result<bool, HarnessError> {
    Ok(match predicate {
        Predicate::And(rules) => {
            for r in rules {
                if !evaluate_predicate(r, data, bindings, context_object)? {
                    return Ok(false);
                }
            }
            true
        }
        Predicate::Or(rules) => {
            for r in rules {
                if evaluate_predicate(r, data, bindings, context_object)? {
                    return Ok(true);
                }
            }
            false
        }
        Predicate::Not(inner) => !evaluate_predicate(inner, data, bindings, context_object)?,
        Predicate::Compare { variable, op } => evaluate_comparison(variable, op, data)?,
        Predicate::Jsonata(expr) => jsonata::evaluate(expr, data, bindings)? == Value::Bool(true),
    })
}

fn parse_ts(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(s).ok().map(|d| d.with_timezone(&chrono::Utc))
}

fn ts_cmp(left: &Value, right: &str) -> Option<Ordering> {
    let l = left.as_str().and_then(parse_ts)?;
    let r = parse_ts(right)?;
    Some(l.cmp(&r))
}

fn resolve_path_value(path: &str, data: &Value) -> Result<Value, HarnessError> {
    Ok(jsonpath::evaluate(path, data)?)
}

fn wildcard_match(pattern: &str, value: &str) -> bool {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'*') => {
                out.push_str("\\*");
                chars.next();
            }
            '*' => out.push_str(".*"),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    regex::Regex::new(&out).is_ok_and(|re| re.is_match(value))
}

fn evaluate_comparison(variable: &str, op: &ComparisonOp, data: &Value) -> Result<bool, HarnessError> {
    let left = jsonpath::evaluate(variable, data)?;
    use ComparisonOp::*;
    Ok(match op {
        StringEquals(v) => left == *v,
        StringEqualsPath(p) => left == resolve_path_value(p, data)?,
        StringLessThan(v) => left.as_str().is_some_and(|l| l < v.as_str()),
        StringLessThanPath(p) => {
            let r = resolve_path_value(p, data)?;
            left.as_str().zip(r.as_str()).is_some_and(|(l, r)| l < r)
        }
        StringGreaterThan(v) => left.as_str().is_some_and(|l| l > v.as_str()),
        StringGreaterThanPath(p) => {
            let r = resolve_path_value(p, data)?;
            left.as_str().zip(r.as_str()).is_some_and(|(l, r)| l > r)
        }
        StringLessThanEquals(v) => left.as_str().is_some_and(|l| l <= v.as_str()),
        StringLessThanEqualsPath(p) => {
            let r = resolve_path_value(p, data)?;
            left.as_str().zip(r.as_str()).is_some_and(|(l, r)| l <= r)
        }
        StringGreaterThanEquals(v) => left.as_str().is_some_and(|l| l >= v.as_str()),
        StringGreaterThanEqualsPath(p) => {
            let r = resolve_path_value(p, data)?;
            left.as_str().zip(r.as_str()).is_some_and(|(l, r)| l >= r)
        }
        NumericEquals(n) => left.as_f64() == Some(*n),
        NumericEqualsPath(p) => left.as_f64() == resolve_path_value(p, data)?.as_f64(),
        NumericLessThan(n) => left.as_f64().is_some_and(|l| l < *n),
        NumericLessThanPath(p) => {
            let r = resolve_path_value(p, data)?;
            left.as_f64().zip(r.as_f64()).is_some_and(|(l, r)| l < r)
        }
        NumericGreaterThan(n) => left.as_f64().is_some_and(|l| l > *n),
        NumericGreaterThanPath(p) => {
            let r = resolve_path_value(p, data)?;
            left.as_f64().zip(r.as_f64()).is_some_and(|(l, r)| l > r)
        }
        NumericLessThanEquals(n) => left.as_f64().is_some_and(|l| l <= *n),
        NumericLessThanEqualsPath(p) => {
            let r = resolve_path_value(p, data)?;
            left.as_f64().zip(r.as_f64()).is_some_and(|(l, r)| l <= r)
        }
        NumericGreaterThanEquals(n) => left.as_f64().is_some_and(|l| l >= *n),
        NumericGreaterThanEqualsPath(p) => {
            let r = resolve_path_value(p, data)?;
            left.as_f64().zip(r.as_f64()).is_some_and(|(l, r)| l >= r)
        }
        BooleanEquals(b) => left.as_bool() == Some(*b),
        BooleanEqualsPath(p) => left.as_bool() == resolve_path_value(p, data)?.as_bool(),
        TimestampEquals(t) => ts_cmp(&left, t) == Some(Ordering::Equal),
        TimestampEqualsPath(p) => {
            let r = resolve_path_value(p, data)?;
            r.as_str().is_some_and(|r| ts_cmp(&left, r) == Some(Ordering::Equal))
        }
        TimestampLessThan(t) => ts_cmp(&left, t) == Some(Ordering::Less),
        TimestampLessThanPath(p) => {
            let r = resolve_path_value(p, data)?;
            r.as_str().is_some_and(|r| ts_cmp(&left, r) == Some(Ordering::Less))
        }
        TimestampGreaterThan(t) => ts_cmp(&left, t) == Some(Ordering::Greater),
        TimestampGreaterThanPath(p) => {
            let r = resolve_path_value(p, data)?;
            r.as_str().is_some_and(|r| ts_cmp(&left, r) == Some(Ordering::Greater))
        }
        TimestampLessThanEquals(t) => matches!(ts_cmp(&left, t), Some(Ordering::Less) | Some(Ordering::Equal)),
        TimestampLessThanEqualsPath(p) => {
            let r = resolve_path_value(p, data)?;
            r.as_str().is_some_and(|r| matches!(ts_cmp(&left, r), Some(Ordering::Less) | Some(Ordering::Equal)))
        }
        TimestampGreaterThanEquals(t) => matches!(ts_cmp(&left, t), Some(Ordering::Greater) | Some(Ordering::Equal)),
        TimestampGreaterThanEqualsPath(p) => {
            let r = resolve_path_value(p, data)?;
            r.as_str().is_some_and(|r| matches!(ts_cmp(&left, r), Some(Ordering::Greater) | Some(Ordering::Equal)))
        }
        IsNull(expected) => left.is_null() == *expected,
        IsNumeric(expected) => left.is_number() == *expected,
        IsString(expected) => left.is_string() == *expected,
        IsBoolean(expected) => left.is_boolean() == *expected,
        IsTimestamp(expected) => left.as_str().is_some_and(|s| parse_ts(s).is_some()) == *expected,
        IsPresent(expected) => jsonpath::path_exists(variable, data) == *expected,
        StringMatches(pattern) => left.as_str().is_some_and(|s| wildcard_match(pattern, s)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asl::state::ChoiceRule;
    use serde_json::json;

    #[test]
    fn picks_first_matching_rule_in_order() {
        let state = ChoiceState {
            query_language: crate::types::QueryLanguage::JsonPath,
            choices: vec![
                ChoiceRule { predicate: Predicate::Compare { variable: "$.score".to_string(), op: ComparisonOp::NumericGreaterThan(90.0) }, next: "A".to_string() },
                ChoiceRule { predicate: Predicate::Compare { variable: "$.score".to_string(), op: ComparisonOp::NumericGreaterThan(50.0) }, next: "B".to_string() },
            ],
            default: Some("C".to_string()),
        };
        let bindings = Bindings::new();
        let outcome = execute("Grade", &state, &json!({"score": 75}), &bindings, &Value::Null).unwrap();
        assert!(matches!(outcome, StepOutcome::Next { next, .. } if next == "B"));
    }

    #[test]
    fn falls_back_to_default_when_nothing_matches() {
        let state = ChoiceState {
            query_language: crate::types::QueryLanguage::JsonPath,
            choices: vec![ChoiceRule { predicate: Predicate::Compare { variable: "$.score".to_string(), op: ComparisonOp::NumericGreaterThan(90.0) }, next: "A".to_string() }],
            default: Some("Fallback".to_string()),
        };
        let bindings = Bindings::new();
        let outcome = execute("Grade", &state, &json!({"score": 1}), &bindings, &Value::Null).unwrap();
        assert!(matches!(outcome, StepOutcome::Next { next, .. } if next == "Fallback"));
    }

    #[test]
    fn no_match_and_no_default_errors() {
        let state = ChoiceState {
            query_language: crate::types::QueryLanguage::JsonPath,
            choices: vec![ChoiceRule { predicate: Predicate::Compare { variable: "$.score".to_string(), op: ComparisonOp::NumericGreaterThan(90.0) }, next: "A".to_string() }],
            default: None,
        };
        let bindings = Bindings::new();
        let err = execute("Grade", &state, &json!({"score": 1}), &bindings, &Value::Null).unwrap_err();
        assert!(matches!(err, HarnessError::Control(ControlError::NoMatchingChoice { .. })));
    }

    #[test]
    fn string_matches_supports_wildcard() {
        assert!(wildcard_match("error.*", "error.Timeout"));
        assert!(!wildcard_match("error.*", "warning.Timeout"));
    }

    #[test]
    fn jsonata_condition_must_evaluate_to_boolean_true() {
        let bindings = Bindings::new().with_variables(std::collections::BTreeMap::new());
        let state = ChoiceState {
            query_language: crate::types::QueryLanguage::Jsonata,
            choices: vec![ChoiceRule { predicate: Predicate::Jsonata("x > 1".to_string()), next: "A".to_string() }],
            default: Some("B".to_string()),
        };
        let outcome = execute("Grade", &state, &json!({"x": 5}), &bindings, &Value::Null).unwrap();
        assert!(matches!(outcome, StepOutcome::Next { next, .. } if next == "A"));
    }
}
