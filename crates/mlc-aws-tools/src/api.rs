//! AWS backend abstraction — the seam between tools and the SDK.
//!
//! Tools never touch SDK clients directly; they call these typed, narrow
//! methods. `SdkAwsApi` implements them against real AWS; `MockAwsApi`
//! serves scripted fixtures so the whole tool layer tests offline.

use async_trait::async_trait;

use crate::error::AwsResult;
use crate::types::{
    AccountIdentity, AlarmSummary, BucketSummary, DashboardDetail, DashboardSummary,
    EndpointDetail, EndpointSummary, LogEvent, LogGroupSummary, TrainingJobDetail,
    TrainingJobSummary,
};
use mlc_protocol::{ServiceCost, TimeWindow};

/// Read-only access to the AWS services the analysis tools consume.
///
/// Implementations must be `Send + Sync` and safe to call concurrently —
/// the agent framework may issue tool calls in parallel batches.
#[async_trait]
pub trait AwsApi: Send + Sync {
    /// Resolve the configured credentials to an account identity (STS).
    async fn caller_identity(&self) -> AwsResult<AccountIdentity>;

    // ── SageMaker ─────────────────────────────────────────────

    /// Training jobs created inside the window, newest first.
    async fn list_training_jobs(
        &self,
        window: TimeWindow,
        max_results: i32,
    ) -> AwsResult<Vec<TrainingJobSummary>>;

    async fn describe_training_job(&self, name: &str) -> AwsResult<TrainingJobDetail>;

    /// Endpoints, newest first.
    async fn list_endpoints(&self, max_results: i32) -> AwsResult<Vec<EndpointSummary>>;

    async fn describe_endpoint(&self, name: &str) -> AwsResult<EndpointDetail>;

    // ── CloudWatch metrics ────────────────────────────────────

    /// Sum of the `Invocations` metric for an endpoint over the window.
    async fn endpoint_invocations(&self, name: &str, window: TimeWindow) -> AwsResult<f64>;

    /// Sum of an `AWS/Bedrock` metric (`Invocations`, `InputTokens`,
    /// `OutputTokens`) over the window.
    async fn bedrock_metric_sum(&self, metric: &str, window: TimeWindow) -> AwsResult<f64>;

    // ── Cost Explorer ─────────────────────────────────────────

    /// Unblended cost per service over the window. Services with no
    /// recorded spend are omitted.
    async fn cost_by_service(
        &self,
        services: &[&str],
        window: TimeWindow,
    ) -> AwsResult<Vec<ServiceCost>>;

    // ── S3 ────────────────────────────────────────────────────

    async fn list_buckets(&self) -> AwsResult<Vec<BucketSummary>>;

    /// Standard-storage size of a bucket in bytes (CloudWatch
    /// `BucketSizeBytes`); None when the metric has no datapoints.
    async fn bucket_size_bytes(&self, name: &str) -> AwsResult<Option<f64>>;

    /// Whether the bucket has any lifecycle configuration attached.
    async fn bucket_has_lifecycle(&self, name: &str) -> AwsResult<bool>;

    // ── CloudWatch dashboards / logs / alarms ─────────────────

    async fn list_dashboards(&self) -> AwsResult<Vec<DashboardSummary>>;

    async fn get_dashboard(&self, name: &str) -> AwsResult<DashboardDetail>;

    async fn list_log_groups(
        &self,
        prefix: Option<&str>,
        limit: i32,
    ) -> AwsResult<Vec<LogGroupSummary>>;

    async fn filter_log_events(
        &self,
        group: &str,
        pattern: Option<&str>,
        window: TimeWindow,
        limit: i32,
    ) -> AwsResult<Vec<LogEvent>>;

    async fn alarms_for_prefix(&self, prefix: Option<&str>) -> AwsResult<Vec<AlarmSummary>>;
}
