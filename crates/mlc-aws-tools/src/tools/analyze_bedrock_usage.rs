//! analyze_bedrock_usage — Bedrock invocation and token totals from
//! CloudWatch metrics.

use async_trait::async_trait;
use serde_json::json;

use crate::api::AwsApi;
use crate::error::{AwsResult, AwsToolError};
use crate::retry::{self, RetryPolicy};
use crate::tools::int_arg;
use crate::types::AwsTool;
use mlc_protocol::{TimeWindow, ToolOutcome};

pub struct AnalyzeBedrockUsage;

#[async_trait]
impl AwsTool for AnalyzeBedrockUsage {
    fn name(&self) -> &str {
        "analyze_bedrock_usage"
    }

    fn description(&self) -> &str {
        "Analyze Amazon Bedrock usage: invocations, input/output tokens, and tokens per request"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "days": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Number of days to analyze (default: 7)",
                    "default": 7
                }
            },
            "required": []
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        api: &dyn AwsApi,
        policy: &RetryPolicy,
    ) -> AwsResult<ToolOutcome> {
        let days = int_arg(&args, "days", 7)?;
        let window =
            TimeWindow::last_days(days).map_err(|e| AwsToolError::invalid(e.to_string()))?;

        let invocations =
            retry::call(policy, || api.bedrock_metric_sum("Invocations", window)).await?;
        let input_tokens =
            retry::call(policy, || api.bedrock_metric_sum("InputTokens", window)).await?;
        let output_tokens =
            retry::call(policy, || api.bedrock_metric_sum("OutputTokens", window)).await?;

        let avg_tokens_per_request = if invocations > 0.0 {
            (input_tokens + output_tokens) / invocations
        } else {
            0.0
        };

        let data = json!({
            "window": window.label(),
            "invocations": invocations,
            "input_tokens": input_tokens,
            "output_tokens": output_tokens,
            "avg_tokens_per_request": avg_tokens_per_request,
        });

        Ok(ToolOutcome::success(
            self.name(),
            data,
            format!(
                "Bedrock served {invocations:.0} invocation(s) over the {}",
                window.label()
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockAwsApi;

    #[tokio::test]
    async fn sums_fixture_metrics() {
        let api = MockAwsApi::with_ml_fixture();
        let result = AnalyzeBedrockUsage
            .execute(json!({"days": 7}), &api, &RetryPolicy::default())
            .await
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["invocations"], 4200.0);
        assert_eq!(data["input_tokens"], 9_800_000.0);
        let avg = data["avg_tokens_per_request"].as_f64().unwrap();
        assert!((avg - (9_800_000.0 + 2_100_000.0) / 4_200.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn zero_usage_does_not_divide_by_zero() {
        let api = MockAwsApi::new();
        let result = AnalyzeBedrockUsage
            .execute(json!({}), &api, &RetryPolicy::default())
            .await
            .unwrap();
        assert_eq!(result.data.unwrap()["avg_tokens_per_request"], 0.0);
    }

    #[tokio::test]
    async fn zero_days_rejected_before_backend() {
        let api = MockAwsApi::with_ml_fixture();
        let err = AnalyzeBedrockUsage
            .execute(json!({"days": 0}), &api, &RetryPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AwsToolError::InvalidArgument { .. }));
        assert!(api.calls().is_empty());
    }
}
