//! fetch_service_logs — recent events from one log group.

use async_trait::async_trait;
use serde_json::json;

use crate::api::AwsApi;
use crate::error::{AwsResult, AwsToolError};
use crate::retry::{self, RetryPolicy};
use crate::tools::{bounded_limit, int_arg, require_str, str_arg};
use crate::types::AwsTool;
use mlc_protocol::{TimeWindow, ToolOutcome};

pub struct FetchServiceLogs;

#[async_trait]
impl AwsTool for FetchServiceLogs {
    fn name(&self) -> &str {
        "fetch_service_logs"
    }

    fn description(&self) -> &str {
        "Fetch recent CloudWatch log events from a log group, optionally filtered by pattern"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "log_group": {
                    "type": "string",
                    "description": "Log group name (e.g. /aws/sagemaker/TrainingJobs)"
                },
                "filter_pattern": {
                    "type": "string",
                    "description": "CloudWatch filter pattern (optional)"
                },
                "hours": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Hours to look back (default: 24)",
                    "default": 24
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 100,
                    "description": "Maximum number of events (default: 100)",
                    "default": 100
                }
            },
            "required": ["log_group"]
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        api: &dyn AwsApi,
        policy: &RetryPolicy,
    ) -> AwsResult<ToolOutcome> {
        let group = require_str(&args, "log_group")?;
        let pattern = str_arg(&args, "filter_pattern")?;
        let hours = int_arg(&args, "hours", 24)?;
        let limit = bounded_limit(&args, "limit", 100)?;
        let window =
            TimeWindow::last_hours(hours).map_err(|e| AwsToolError::invalid(e.to_string()))?;

        let events =
            retry::call(policy, || api.filter_log_events(group, pattern, window, limit)).await?;
        let event_count = events.len();

        let data = json!({
            "log_group": group,
            "window": window.label(),
            "event_count": event_count,
            "events": events,
        });

        Ok(ToolOutcome::success(
            self.name(),
            data,
            format!("Fetched {event_count} event(s) from {group}"),
        ))
    }
}
