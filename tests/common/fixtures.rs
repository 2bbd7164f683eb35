//! ASL JSON builder helpers shared across the scenario tests.

#![allow(dead_code)]

use serde_json::{json, Value};

/// A two-state Pass chain: `A` sets `{"step": 1, "greeting": "Hello, <name>!"}`
/// via `Parameters`/`States.Format`, `B` passes the result through unchanged.
pub fn pass_chain_with_format() -> Value {
    json!({
        "StartAt": "Greet",
        "States": {
            "Greet": {
                "Type": "Pass",
                "Parameters": {
                    "step": 1,
                    "greeting.$": "States.Format('Hello, {}!', $.name)"
                },
                "Next": "Done"
            },
            "Done": {
                "Type": "Pass",
                "End": true
            }
        }
    })
}

/// A JSONata Choice: routes to `Big` when `$.amount > 100`, else `Small`.
pub fn jsonata_choice() -> Value {
    json!({
        "QueryLanguage": "JSONata",
        "StartAt": "Route",
        "States": {
            "Route": {
                "Type": "Choice",
                "Choices": [
                    {"Condition": "{% amount > 100 %}", "Next": "Big"}
                ],
                "Default": "Small"
            },
            "Big": {"Type": "Pass", "Output": "{% 'big' %}", "End": true},
            "Small": {"Type": "Pass", "Output": "{% 'small' %}", "End": true}
        }
    })
}

/// An Inline Map doubling each item's `value` field via `ItemSelector`.
pub fn inline_map_doubling() -> Value {
    json!({
        "StartAt": "DoubleEach",
        "States": {
            "DoubleEach": {
                "Type": "Map",
                "ItemsPath": "$.items",
                "ItemSelector": {
                    "value.$": "States.MathAdd($$.Map.Item.Value.value, $$.Map.Item.Value.value)"
                },
                "MaxConcurrency": 2,
                "ItemProcessor": {
                    "StartAt": "Identity",
                    "States": {
                        "Identity": {"Type": "Pass", "End": true}
                    }
                },
                "End": true
            }
        }
    })
}

/// A Parallel state with two branches, each returning a distinct literal.
pub fn parallel_two_branches() -> Value {
    json!({
        "StartAt": "Fanout",
        "States": {
            "Fanout": {
                "Type": "Parallel",
                "Branches": [
                    {
                        "StartAt": "First",
                        "States": {"First": {"Type": "Pass", "Result": "one", "End": true}}
                    },
                    {
                        "StartAt": "Second",
                        "States": {"Second": {"Type": "Pass", "Result": "two", "End": true}}
                    }
                ],
                "End": true
            }
        }
    })
}

/// A Task state with a Retry on `States.ALL` falling through to a Catch that
/// routes to `Handled`.
pub fn task_with_retry_and_catch(resource: &str) -> Value {
    json!({
        "StartAt": "Flaky",
        "States": {
            "Flaky": {
                "Type": "Task",
                "Resource": resource,
                "Retry": [
                    {"ErrorEquals": ["States.ALL"], "MaxAttempts": 1, "IntervalSeconds": 1}
                ],
                "Catch": [
                    {"ErrorEquals": ["States.ALL"], "Next": "Handled", "ResultPath": "$.error"}
                ],
                "End": true
            },
            "Handled": {"Type": "Pass", "End": true}
        }
    })
}

/// A mock configuration with a stateful mock cycling through two responses.
pub fn stateful_mock_config(state_name: &str) -> Value {
    json!({
        state_name: {
            "type": "stateful",
            "responses": [{"attempt": 1}, {"attempt": 2}]
        }
    })
}
