//! AWS analysis tool implementations.

mod analyze_bedrock_usage;
mod analyze_data_storage;
mod analyze_log_group;
mod analyze_ml_costs;
mod fetch_service_logs;
mod get_dashboard_summary;
mod get_endpoint_details;
mod get_service_alarms;
mod get_training_job_details;
mod list_dashboards;
mod list_endpoints;
mod list_log_groups;
mod list_training_jobs;

pub use analyze_bedrock_usage::AnalyzeBedrockUsage;
pub use analyze_data_storage::AnalyzeDataStorage;
pub use analyze_log_group::AnalyzeLogGroup;
pub use analyze_ml_costs::AnalyzeMlCosts;
pub use fetch_service_logs::FetchServiceLogs;
pub use get_dashboard_summary::GetDashboardSummary;
pub use get_endpoint_details::GetEndpointDetails;
pub use get_service_alarms::GetServiceAlarms;
pub use get_training_job_details::GetTrainingJobDetails;
pub use list_dashboards::ListDashboards;
pub use list_endpoints::ListEndpoints;
pub use list_log_groups::ListLogGroups;
pub use list_training_jobs::ListTrainingJobs;

use serde_json::Value;

use crate::error::{AwsResult, AwsToolError};
use crate::types::AwsTool;

/// All 13 AWS analysis tools.
pub fn all_tools() -> Vec<Box<dyn AwsTool>> {
    vec![
        Box::new(ListTrainingJobs),
        Box::new(GetTrainingJobDetails),
        Box::new(ListEndpoints),
        Box::new(GetEndpointDetails),
        Box::new(AnalyzeBedrockUsage),
        Box::new(AnalyzeMlCosts),
        Box::new(AnalyzeDataStorage),
        Box::new(ListDashboards),
        Box::new(GetDashboardSummary),
        Box::new(ListLogGroups),
        Box::new(FetchServiceLogs),
        Box::new(AnalyzeLogGroup),
        Box::new(GetServiceAlarms),
    ]
}

// ── Argument helpers ──────────────────────────────────────────
//
// Validation happens here, before any backend call — malformed
// arguments must never reach the network layer.

pub(crate) fn require_str<'a>(args: &'a Value, key: &str) -> AwsResult<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AwsToolError::invalid(format!("missing '{key}' argument")))
}

pub(crate) fn str_arg<'a>(args: &'a Value, key: &str) -> AwsResult<Option<&'a str>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(Some)
            .ok_or_else(|| AwsToolError::invalid(format!("'{key}' must be a string"))),
    }
}

pub(crate) fn int_arg(args: &Value, key: &str, default: i64) -> AwsResult<i64> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v
            .as_i64()
            .ok_or_else(|| AwsToolError::invalid(format!("'{key}' must be an integer"))),
    }
}

pub(crate) fn float_arg(args: &Value, key: &str, default: f64) -> AwsResult<f64> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v
            .as_f64()
            .ok_or_else(|| AwsToolError::invalid(format!("'{key}' must be a number"))),
    }
}

/// A `max_results`-style bound: must be in 1..=100.
pub(crate) fn bounded_limit(args: &Value, key: &str, default: i64) -> AwsResult<i32> {
    let value = int_arg(args, key, default)?;
    if !(1..=100).contains(&value) {
        return Err(AwsToolError::invalid(format!(
            "'{key}' must be between 1 and 100, got {value}"
        )));
    }
    Ok(value as i32)
}
