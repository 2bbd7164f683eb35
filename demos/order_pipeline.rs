//! Runs a small order-processing state machine against a mocked payment
//! service: a flaky `ChargeCard` task retries once, then falls back to a
//! `Catch` handler when the mock keeps failing.
//!
//! Run with: `cargo run --example order_pipeline`

use miette::{IntoDiagnostic, Result};
use serde_json::json;
use sfn_harness::asl::builder::compile;
use sfn_harness::config::HarnessConfig;
use sfn_harness::machine_executor::{run_machine, RunStatus};
use sfn_harness::mock::{MockConfig, MockEngine};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let doc = json!({
        "StartAt": "ChargeCard",
        "States": {
            "ChargeCard": {
                "Type": "Task",
                "Resource": "arn:aws:states:::lambda:invoke:payments-charge",
                "Parameters": {"orderId.$": "$.orderId", "amount.$": "$.amount"},
                "ResultPath": "$.charge",
                "Retry": [
                    {"ErrorEquals": ["States.ALL"], "MaxAttempts": 2, "IntervalSeconds": 1, "BackoffRate": 2.0}
                ],
                "Catch": [
                    {"ErrorEquals": ["States.ALL"], "Next": "NotifyFailure", "ResultPath": "$.error"}
                ],
                "Next": "Fulfilled"
            },
            "NotifyFailure": {
                "Type": "Pass",
                "Result": "payment-failed-notice-sent",
                "ResultPath": "$.notice",
                "End": true
            },
            "Fulfilled": {"Type": "Succeed"}
        }
    });
    let machine = compile(&doc).into_diagnostic()?;

    let mock_raw = json!({
        "ChargeCard": {
            "type": "error",
            "error": "Payments.CardDeclined",
            "cause": "insufficient funds",
            "probability": 1.0
        }
    });
    let mocks = MockEngine::new(MockConfig::from_json(&mock_raw).into_diagnostic()?);
    let config = HarnessConfig::default().with_wait_cap(std::time::Duration::from_millis(10));

    let input = json!({"orderId": "ord_42", "amount": 91.5});
    let result = run_machine(&machine, input, &config, &mocks, config.step_limit_top)
        .await
        .into_diagnostic()?;

    match result.status {
        RunStatus::Succeeded(output) => info!(?output, path = ?result.execution_path, "order pipeline finished"),
        RunStatus::Failed { error, cause } => info!(error, cause, "order pipeline failed"),
    }

    Ok(())
}
