//! list_training_jobs — recent SageMaker training jobs in a window.

use async_trait::async_trait;
use serde_json::json;

use crate::api::AwsApi;
use crate::error::{AwsResult, AwsToolError};
use crate::retry::{self, RetryPolicy};
use crate::tools::{bounded_limit, int_arg};
use crate::types::AwsTool;
use mlc_protocol::{TimeWindow, ToolOutcome};

pub struct ListTrainingJobs;

#[async_trait]
impl AwsTool for ListTrainingJobs {
    fn name(&self) -> &str {
        "list_training_jobs"
    }

    fn description(&self) -> &str {
        "List recent SageMaker training jobs with status, instance type, and duration"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "days": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Number of days to look back (default: 7)",
                    "default": 7
                },
                "max_results": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 100,
                    "description": "Maximum number of jobs to return (default: 50)",
                    "default": 50
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
        let max_results = bounded_limit(&args, "max_results", 50)?;
        let window =
            TimeWindow::last_days(days).map_err(|e| AwsToolError::invalid(e.to_string()))?;

        let jobs = retry::call(policy, || api.list_training_jobs(window, max_results)).await?;

        // Account context is best-effort; a missing sts:GetCallerIdentity
        // permission should not fail the listing.
        let account = match api.caller_identity().await {
            Ok(identity) => Some(identity.account_id),
            Err(err) => {
                tracing::debug!(error = %err, "caller identity unavailable");
                None
            }
        };

        let job_count = jobs.len();
        let rows: Vec<_> = jobs
            .iter()
            .map(|j| {
                json!({
                    "name": j.name,
                    "status": j.status.as_str(),
                    "created_at": j.created_at,
                    "instance_type": j.instance_type,
                    "instance_count": j.instance_count,
                    "duration_hours": j.duration_hours(),
                    "failure_reason": j.failure_reason,
                })
            })
            .collect();

        let data = json!({
            "account": account,
            "window": window.label(),
            "job_count": job_count,
            "jobs": rows,
        });

        tracing::info!(job_count, days, "listed training jobs");
        Ok(ToolOutcome::success(
            self.name(),
            data,
            format!("Found {job_count} training job(s) in the {}", window.label()),
        ))
    }
}
