//! Runs a JSONPath-mode Map that doubles a batch of line-item quantities,
//! then hands the merged result to a JSONata-mode Parallel whose branches
//! read `$states.input`/`$states.result` and build their `Output` from a
//! payload template.
//!
//! Run with: `cargo run --example jsonata_fanout`

use miette::{IntoDiagnostic, Result};
use serde_json::json;
use sfn_harness::asl::builder::compile;
use sfn_harness::config::HarnessConfig;
use sfn_harness::machine_executor::{run_machine, RunStatus};
use sfn_harness::mock::MockEngine;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let doc = json!({
        "StartAt": "DoubleQuantities",
        "States": {
            "DoubleQuantities": {
                "Type": "Map",
                "ItemsPath": "$.lines",
                "ItemProcessor": {
                    "StartAt": "Double",
                    "States": {
                        "Double": {
                            "Type": "Pass",
                            "Parameters": {"qty.$": "States.MathAdd($.qty, $.qty)"},
                            "End": true
                        }
                    }
                },
                "ResultPath": "$.lines",
                "Next": "Estimates"
            },
            "Estimates": {
                "Type": "Parallel",
                "QueryLanguage": "JSONata",
                "Branches": [
                    {
                        "StartAt": "Tax",
                        "States": {
                            "Tax": {
                                "Type": "Pass",
                                "Arguments": {"rush": "{% $states.input.priority = 'rush' %}"},
                                "Output": {"kind": "tax", "rush": "{% $states.result.rush %}"},
                                "End": true
                            }
                        }
                    },
                    {
                        "StartAt": "Shipping",
                        "States": {
                            "Shipping": {
                                "Type": "Pass",
                                "Output": {"kind": "shipping", "priority": "{% $states.input.priority %}"},
                                "End": true
                            }
                        }
                    }
                ],
                "End": true
            }
        }
    });
    let machine = compile(&doc).into_diagnostic()?;
    let config = HarnessConfig::default();
    let mocks = MockEngine::empty();

    let input = json!({"lines": [{"qty": 2}, {"qty": 5}, {"qty": 1}], "priority": "rush"});
    let result = run_machine(&machine, input, &config, &mocks, config.step_limit_top)
        .await
        .into_diagnostic()?;

    match result.status {
        RunStatus::Succeeded(output) => info!(?output, path = ?result.execution_path, "fanout finished"),
        RunStatus::Failed { error, cause } => info!(error, cause, "fanout failed"),
    }

    Ok(())
}
