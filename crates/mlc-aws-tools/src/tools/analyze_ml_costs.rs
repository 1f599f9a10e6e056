//! analyze_ml_costs — joins Cost Explorer billing with the resource
//! inventory and raises optimization flags.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;

use crate::aggregate::{self, Inventory, Thresholds};
use crate::api::AwsApi;
use crate::error::{AwsResult, AwsToolError};
use crate::retry::{self, RetryPolicy};
use crate::tools::{float_arg, int_arg};
use crate::types::AwsTool;
use mlc_protocol::{TimeWindow, ToolOutcome, round_cents};

/// Cost Explorer service names the analysis covers.
const ML_SERVICES: &[&str] = &["Amazon SageMaker", "Amazon Bedrock", "AWS Deep Learning"];

/// Bucket-name substrings that mark a bucket as ML-related.
const ML_BUCKET_PATTERNS: &[&str] = &["sagemaker", "ml", "model", "training", "dataset"];

/// At most this many buckets are surveyed for lifecycle rules.
const BUCKET_SURVEY_LIMIT: usize = 10;

const RECOMMENDATIONS: &[&str] = &[
    "Review idle SageMaker endpoints and consider auto-scaling",
    "Use Spot instances for non-critical training jobs",
    "Implement prompt caching for Bedrock to reduce token usage",
    "Consider SageMaker Savings Plans for predictable workloads",
    "Clean up unused models and endpoint configurations",
];

pub struct AnalyzeMlCosts;

#[async_trait]
impl AwsTool for AnalyzeMlCosts {
    fn name(&self) -> &str {
        "analyze_ml_costs"
    }

    fn description(&self) -> &str {
        "Aggregate ML service costs over a window and flag idle endpoints, high training failure rates, and unmanaged storage"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "days": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Analysis window in days (default: 30)",
                    "default": 30
                },
                "failure_threshold": {
                    "type": "number",
                    "minimum": 0,
                    "description": "Training failure ratio above which a flag is raised (default: 0.5)",
                    "default": 0.5
                },
                "cost_threshold_usd": {
                    "type": "number",
                    "minimum": 0,
                    "description": "Omit services whose spend is below this amount"
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
        let days = int_arg(&args, "days", 30)?;
        let failure_threshold = float_arg(&args, "failure_threshold", 0.5)?;
        if failure_threshold < 0.0 {
            return Err(AwsToolError::invalid(format!(
                "'failure_threshold' must be >= 0, got {failure_threshold}"
            )));
        }
        let cost_threshold = float_arg(&args, "cost_threshold_usd", 0.0)?;
        if cost_threshold < 0.0 {
            return Err(AwsToolError::invalid(format!(
                "'cost_threshold_usd' must be >= 0, got {cost_threshold}"
            )));
        }
        let window =
            TimeWindow::last_days(days).map_err(|e| AwsToolError::invalid(e.to_string()))?;

        // Billing first, then the inventory it gets joined with.
        let costs = retry::call(policy, || api.cost_by_service(ML_SERVICES, window)).await?;
        let costs: Vec<_> = costs
            .into_iter()
            .filter(|c| c.amount_usd >= cost_threshold)
            .collect();

        let training_jobs = retry::call(policy, || api.list_training_jobs(window, 100)).await?;
        let endpoints = retry::call(policy, || api.list_endpoints(100)).await?;

        let mut endpoint_invocations = HashMap::new();
        for endpoint in endpoints.iter().filter(|e| e.status.is_in_service()) {
            let sum =
                retry::call(policy, || api.endpoint_invocations(&endpoint.name, window)).await?;
            endpoint_invocations.insert(endpoint.name.clone(), sum);
        }

        let all_buckets = retry::call(policy, || api.list_buckets()).await?;
        let ml_buckets: Vec<_> = all_buckets
            .iter()
            .filter(|b| is_ml_bucket(&b.name))
            .collect();
        let surveyed = ml_buckets.len().min(BUCKET_SURVEY_LIMIT);
        let mut buckets = Vec::with_capacity(surveyed);
        for bucket in &ml_buckets[..surveyed] {
            let has_lifecycle =
                retry::call(policy, || api.bucket_has_lifecycle(&bucket.name)).await?;
            buckets.push((bucket.name.clone(), has_lifecycle));
        }

        let inventory = Inventory {
            training_jobs,
            endpoints,
            endpoint_invocations,
            buckets,
        };
        let thresholds = Thresholds {
            failure_ratio: failure_threshold,
        };
        let summary = aggregate::aggregate(window, &inventory, &costs, &thresholds);

        let data = json!({
            "window": window.label(),
            "services": summary.services,
            "total_usd": summary.total_usd,
            "flags": summary.flags,
            "buckets_surveyed": surveyed,
            "buckets_skipped": ml_buckets.len().saturating_sub(surveyed),
            "recommendations": RECOMMENDATIONS,
        });

        let flag_count = summary.flags.len();
        tracing::info!(
            total_usd = summary.total_usd,
            flag_count,
            "aggregated ML costs"
        );
        Ok(ToolOutcome::success(
            self.name(),
            data,
            format!(
                "ML spend ${:.2} over the {}, {flag_count} flag(s) raised",
                round_cents(summary.total_usd),
                window.label()
            ),
        ))
    }
}

fn is_ml_bucket(name: &str) -> bool {
    let lower = name.to_lowercase();
    ML_BUCKET_PATTERNS.iter().any(|p| lower.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockAwsApi;
    use mlc_protocol::CostFlag;

    #[tokio::test]
    async fn fixture_raises_expected_flags() {
        let api = MockAwsApi::with_ml_fixture();
        let result = AnalyzeMlCosts
            .execute(json!({"days": 30}), &api, &RetryPolicy::default())
            .await
            .unwrap();
        assert!(result.success);
        let data = result.data.unwrap();

        let flags: Vec<CostFlag> = serde_json::from_value(data["flags"].clone()).unwrap();
        // 8/9 failed jobs > 0.5.
        assert!(flags.iter().any(|f| matches!(
            f,
            CostFlag::HighFailureRate { failed: 8, total: 9, .. }
        )));
        // 3 idle InService endpoints (serving-prod-01 takes traffic).
        let idle = flags
            .iter()
            .filter(|f| matches!(f, CostFlag::Idle { .. }))
            .count();
        assert_eq!(idle, 3);
        // One ML bucket lacks lifecycle rules.
        assert!(flags.iter().any(|f| matches!(
            f,
            CostFlag::UnmanagedStorage { bucket } if bucket == "acme-sagemaker-training-data"
        )));

        let total = data["total_usd"].as_f64().unwrap();
        assert!((total - (1_843.27 + 412.905)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_account_yields_zero_summary() {
        let api = MockAwsApi::new();
        let result = AnalyzeMlCosts
            .execute(json!({}), &api, &RetryPolicy::default())
            .await
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["total_usd"], 0.0);
        assert_eq!(data["flags"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn cost_threshold_filters_services() {
        let api = MockAwsApi::with_ml_fixture();
        let result = AnalyzeMlCosts
            .execute(
                json!({"cost_threshold_usd": 500.0}),
                &api,
                &RetryPolicy::default(),
            )
            .await
            .unwrap();
        let data = result.data.unwrap();
        let services = data["services"].as_array().unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0]["service"], "Amazon SageMaker");
    }

    #[tokio::test]
    async fn negative_threshold_rejected_before_backend() {
        let api = MockAwsApi::with_ml_fixture();
        let err = AnalyzeMlCosts
            .execute(
                json!({"failure_threshold": -0.1}),
                &api,
                &RetryPolicy::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AwsToolError::InvalidArgument { .. }));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn bucket_pattern_matching() {
        assert!(is_ml_bucket("acme-SageMaker-data"));
        assert!(is_ml_bucket("training-artifacts"));
        assert!(!is_ml_bucket("acme-billing-exports"));
    }
}
