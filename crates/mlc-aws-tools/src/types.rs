//! Normalized AWS resource summaries and the AwsTool trait.
//!
//! Every record here is a fixed-shape value type decoupled from the
//! upstream API response shapes, so tool outputs stay stable even when
//! the SDKs evolve.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::AwsApi;
use crate::error::AwsResult;
use crate::retry::RetryPolicy;
use mlc_protocol::ToolOutcome;

// ── Account identity ──────────────────────────────────────────

/// Who the configured credentials resolve to (STS).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountIdentity {
    pub account_id: String,
    pub arn: String,
}

// ── SageMaker training jobs ───────────────────────────────────

/// Lifecycle status of a training job, as reported by SageMaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingJobStatus {
    InProgress,
    Completed,
    Failed,
    Stopping,
    Stopped,
    Unknown,
}

impl TrainingJobStatus {
    pub fn from_aws(s: &str) -> Self {
        match s {
            "InProgress" => Self::InProgress,
            "Completed" => Self::Completed,
            "Failed" => Self::Failed,
            "Stopping" => Self::Stopping,
            "Stopped" => Self::Stopped,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
            Self::Unknown => "Unknown",
        }
    }
}

/// One training job as returned by a listing call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingJobSummary {
    pub name: String,
    pub status: TrainingJobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Instance type — listing responses may omit resource config.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl TrainingJobSummary {
    /// Run duration in hours, if the job has ended.
    pub fn duration_hours(&self) -> Option<f64> {
        self.ended_at
            .map(|end| (end - self.created_at).num_seconds() as f64 / 3600.0)
    }
}

/// A final metric emitted by a training job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalMetric {
    pub name: String,
    pub value: f64,
}

/// Full detail for one training job (describe call).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingJobDetail {
    pub name: String,
    pub status: TrainingJobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub instance_type: String,
    pub instance_count: i32,
    pub volume_size_gb: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billable_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub final_metrics: Vec<FinalMetric>,
}

// ── SageMaker endpoints ───────────────────────────────────────

/// Lifecycle status of an inference endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointStatus {
    Creating,
    Updating,
    SystemUpdating,
    RollingBack,
    InService,
    OutOfService,
    Deleting,
    Failed,
    Unknown,
}

impl EndpointStatus {
    pub fn from_aws(s: &str) -> Self {
        match s {
            "Creating" => Self::Creating,
            "Updating" => Self::Updating,
            "SystemUpdating" => Self::SystemUpdating,
            "RollingBack" => Self::RollingBack,
            "InService" => Self::InService,
            "OutOfService" => Self::OutOfService,
            "Deleting" => Self::Deleting,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creating => "Creating",
            Self::Updating => "Updating",
            Self::SystemUpdating => "SystemUpdating",
            Self::RollingBack => "RollingBack",
            Self::InService => "InService",
            Self::OutOfService => "OutOfService",
            Self::Deleting => "Deleting",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }

    /// Only in-service endpoints bill for idle instance hours.
    pub fn is_in_service(&self) -> bool {
        matches!(self, Self::InService)
    }
}

/// One endpoint as returned by a listing call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointSummary {
    pub name: String,
    pub status: EndpointStatus,
    pub created_at: DateTime<Utc>,
}

/// One production variant of an endpoint config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantSummary {
    pub name: String,
    pub instance_type: String,
    pub instance_count: i32,
    pub model_name: String,
}

/// Full detail for one endpoint (describe calls on endpoint + config).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointDetail {
    pub name: String,
    pub status: EndpointStatus,
    pub created_at: DateTime<Utc>,
    pub config_name: String,
    pub variants: Vec<VariantSummary>,
}

// ── S3 ────────────────────────────────────────────────────────

/// One bucket as returned by a listing call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

// ── CloudWatch ────────────────────────────────────────────────

/// One dashboard as returned by a listing call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,
}

/// Parsed summary of one dashboard body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardDetail {
    pub name: String,
    pub widget_count: usize,
    /// Distinct widget types present (e.g. "metric", "text").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub widget_types: Vec<String>,
}

/// One log group as returned by a listing call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogGroupSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One filtered log event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_stream: Option<String>,
}

/// One CloudWatch alarm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmSummary {
    pub name: String,
    /// Alarm state: OK, ALARM, or INSUFFICIENT_DATA.
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

// ── AwsTool trait ─────────────────────────────────────────────

/// Trait for AWS analysis tools.
///
/// Mirrors the workspace-file and search tool traits — name, description,
/// and a JSON Schema for arguments, so the registry can hand the full
/// capability set to the model. Argument validation must happen before
/// any `AwsApi` call is issued.
#[async_trait]
pub trait AwsTool: Send + Sync {
    /// Tool name (e.g., "list_training_jobs").
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema describing accepted arguments.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with JSON arguments against an AWS backend.
    async fn execute(
        &self,
        args: serde_json::Value,
        api: &dyn AwsApi,
        policy: &RetryPolicy,
    ) -> AwsResult<ToolOutcome>;
}
