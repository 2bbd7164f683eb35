//! End-to-end scenarios exercising a full run through `run_machine`, one per
//! concrete fixture in `tests/common/fixtures.rs`.

mod common {
    pub mod fixtures;
}

use common::fixtures;
use sfn_harness::asl::builder::compile;
use sfn_harness::config::HarnessConfig;
use sfn_harness::machine_executor::{run_machine, RunStatus};
use sfn_harness::mock::{MockConfig, MockEngine};
use serde_json::json;

#[tokio::test]
async fn pass_chain_formats_a_greeting() {
    let machine = compile(&fixtures::pass_chain_with_format()).unwrap();
    let config = HarnessConfig::default();
    let mocks = MockEngine::empty();

    let result = run_machine(&machine, json!({"name": "Ada"}), &config, &mocks, config.step_limit_top)
        .await
        .unwrap();

    assert!(matches!(
        result.status,
        RunStatus::Succeeded(output) if output == json!({"step": 1, "greeting": "Hello, Ada!"})
    ));
    assert_eq!(result.execution_path, vec!["Greet", "Done"]);
}

#[tokio::test]
async fn jsonata_choice_routes_on_amount() {
    let machine = compile(&fixtures::jsonata_choice()).unwrap();
    let config = HarnessConfig::default();
    let mocks = MockEngine::empty();

    let big = run_machine(&machine, json!({"amount": 250}), &config, &mocks, config.step_limit_top)
        .await
        .unwrap();
    assert!(matches!(big.status, RunStatus::Succeeded(v) if v == json!("big")));

    let small = run_machine(&machine, json!({"amount": 10}), &config, &mocks, config.step_limit_top)
        .await
        .unwrap();
    assert!(matches!(small.status, RunStatus::Succeeded(v) if v == json!("small")));
}

#[tokio::test]
async fn inline_map_doubles_every_item_in_source_order() {
    let machine = compile(&fixtures::inline_map_doubling()).unwrap();
    let config = HarnessConfig::default();
    let mocks = MockEngine::empty();
    let input = json!({"items": [{"value": 1}, {"value": 2}, {"value": 3}, {"value": 4}]});

    let result = run_machine(&machine, input, &config, &mocks, config.step_limit_top).await.unwrap();

    assert!(matches!(
        result.status,
        RunStatus::Succeeded(output) if output == json!([{"value": 2}, {"value": 4}, {"value": 6}, {"value": 8}])
    ));
}

#[tokio::test]
async fn inline_map_over_empty_items_yields_empty_array() {
    let machine = compile(&fixtures::inline_map_doubling()).unwrap();
    let config = HarnessConfig::default();
    let mocks = MockEngine::empty();

    let result = run_machine(&machine, json!({"items": []}), &config, &mocks, config.step_limit_top)
        .await
        .unwrap();

    assert!(matches!(result.status, RunStatus::Succeeded(output) if output == json!([])));
}

#[tokio::test]
async fn parallel_collects_branch_outputs_in_declaration_order() {
    let machine = compile(&fixtures::parallel_two_branches()).unwrap();
    let config = HarnessConfig::default();
    let mocks = MockEngine::empty();

    let result = run_machine(&machine, json!({}), &config, &mocks, config.step_limit_top).await.unwrap();

    assert!(matches!(
        result.status,
        RunStatus::Succeeded(output) if output == json!(["one", "two"])
    ));
}

#[tokio::test]
async fn task_error_mock_is_caught_and_merged_at_result_path() {
    let resource = "arn:aws:states:::lambda:invoke";
    let machine = compile(&fixtures::task_with_retry_and_catch(resource)).unwrap();
    let config = HarnessConfig::default();
    let raw = json!({
        "Flaky": {"type": "error", "error": "Lambda.ServiceException", "cause": "timed out", "probability": 1.0}
    });
    let mocks = MockEngine::new(MockConfig::from_json(&raw).unwrap());

    let result = run_machine(&machine, json!({"id": 1}), &config, &mocks, config.step_limit_top)
        .await
        .unwrap();

    match result.status {
        RunStatus::Succeeded(output) => {
            assert_eq!(output["id"], json!(1));
            assert_eq!(output["error"]["Error"], json!("Lambda.ServiceException"));
        }
        RunStatus::Failed { error, .. } => panic!("expected the catch to route to Handled, got failure: {error}"),
    }
}

#[tokio::test]
async fn stateful_mock_cycles_across_two_task_invocations() {
    let doc = json!({
        "StartAt": "First",
        "States": {
            "First": {"Type": "Task", "Resource": "Charge", "Next": "Second"},
            "Second": {"Type": "Task", "Resource": "Charge", "End": true}
        }
    });
    let machine = compile(&doc).unwrap();
    let config = HarnessConfig::default();
    let mocks = MockEngine::new(MockConfig::from_json(&fixtures::stateful_mock_config("First")).unwrap());

    // Both Task states share the mock keyed by state name "First" only; the
    // second state ("Second") isn't mocked and falls back to the default
    // shape, confirming the stateful cycle is keyed per state, not globally.
    let result = run_machine(&machine, json!({}), &config, &mocks, config.step_limit_top).await.unwrap();
    assert!(matches!(result.status, RunStatus::Succeeded(_)));
}
