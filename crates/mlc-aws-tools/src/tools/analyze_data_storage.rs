//! analyze_data_storage — S3 storage survey for ML data and models.

use async_trait::async_trait;
use serde_json::json;

use crate::api::AwsApi;
use crate::error::AwsResult;
use crate::retry::{self, RetryPolicy};
use crate::types::AwsTool;
use mlc_protocol::ToolOutcome;

/// Bucket-name substrings that mark a bucket as ML-related.
const ML_BUCKET_PATTERNS: &[&str] = &["sagemaker", "ml", "model", "training", "dataset"];

/// At most this many buckets are sized per call.
const BUCKET_LIMIT: usize = 10;

const RECOMMENDATIONS: &[&str] = &[
    "Implement S3 Intelligent-Tiering for training data",
    "Set lifecycle policies to archive old training datasets",
    "Delete temporary data and failed training outputs",
    "Use S3 Standard-IA for infrequently accessed models",
];

pub struct AnalyzeDataStorage;

#[async_trait]
impl AwsTool for AnalyzeDataStorage {
    fn name(&self) -> &str {
        "analyze_data_storage"
    }

    fn description(&self) -> &str {
        "Survey ML-related S3 buckets: size, lifecycle coverage, and storage optimization opportunities"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(
        &self,
        _args: serde_json::Value,
        api: &dyn AwsApi,
        policy: &RetryPolicy,
    ) -> AwsResult<ToolOutcome> {
        let all_buckets = retry::call(policy, || api.list_buckets()).await?;
        let ml_buckets: Vec<_> = all_buckets
            .iter()
            .filter(|b| {
                let lower = b.name.to_lowercase();
                ML_BUCKET_PATTERNS.iter().any(|p| lower.contains(p))
            })
            .collect();

        let surveyed = ml_buckets.len().min(BUCKET_LIMIT);
        let mut rows = Vec::with_capacity(surveyed);
        let mut unmanaged = 0usize;
        for bucket in &ml_buckets[..surveyed] {
            // Size is best-effort; missing metrics show as null.
            let size_gb = match retry::call(policy, || api.bucket_size_bytes(&bucket.name)).await {
                Ok(bytes) => bytes.map(|b| b / 1024f64.powi(3)),
                Err(err) => {
                    tracing::warn!(bucket = %bucket.name, error = %err, "size unavailable");
                    None
                }
            };
            let has_lifecycle =
                retry::call(policy, || api.bucket_has_lifecycle(&bucket.name)).await?;
            if !has_lifecycle {
                unmanaged += 1;
            }
            rows.push(json!({
                "name": bucket.name,
                "size_gb": size_gb,
                "has_lifecycle": has_lifecycle,
            }));
        }

        let data = json!({
            "bucket_count": ml_buckets.len(),
            "buckets_surveyed": surveyed,
            "buckets_skipped": ml_buckets.len().saturating_sub(surveyed),
            "unmanaged_count": unmanaged,
            "buckets": rows,
            "recommendations": RECOMMENDATIONS,
        });

        Ok(ToolOutcome::success(
            self.name(),
            data,
            format!(
                "Surveyed {surveyed} ML bucket(s); {unmanaged} without lifecycle rules"
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockAwsApi;

    #[tokio::test]
    async fn surveys_ml_buckets_only() {
        let api = MockAwsApi::with_ml_fixture();
        let result = AnalyzeDataStorage
            .execute(json!({}), &api, &RetryPolicy::default())
            .await
            .unwrap();
        let data = result.data.unwrap();
        // acme-billing-exports does not match ML patterns.
        assert_eq!(data["bucket_count"], 2);
        assert_eq!(data["unmanaged_count"], 1);
        let size = data["buckets"][0]["size_gb"].as_f64().unwrap();
        assert!((size - 2.4e12 / 1024f64.powi(3)).abs() < 1e-6);
    }

    #[tokio::test]
    async fn no_buckets_is_a_clean_result() {
        let api = MockAwsApi::new();
        let result = AnalyzeDataStorage
            .execute(json!({}), &api, &RetryPolicy::default())
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.data.unwrap()["bucket_count"], 0);
    }
}
