//! get_training_job_details — full configuration and cost-relevant
//! timing for one SageMaker training job.

use async_trait::async_trait;
use serde_json::json;

use crate::api::AwsApi;
use crate::error::AwsResult;
use crate::retry::{self, RetryPolicy};
use crate::tools::require_str;
use crate::types::AwsTool;
use mlc_protocol::ToolOutcome;

pub struct GetTrainingJobDetails;

#[async_trait]
impl AwsTool for GetTrainingJobDetails {
    fn name(&self) -> &str {
        "get_training_job_details"
    }

    fn description(&self) -> &str {
        "Get detailed configuration, timing, billable hours, and final metrics for a SageMaker training job"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "training_job_name": {
                    "type": "string",
                    "description": "Name of the SageMaker training job"
                }
            },
            "required": ["training_job_name"]
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        api: &dyn AwsApi,
        policy: &RetryPolicy,
    ) -> AwsResult<ToolOutcome> {
        let name = require_str(&args, "training_job_name")?;

        let job = retry::call(policy, || api.describe_training_job(name)).await?;

        let duration_hours = job
            .ended_at
            .map(|end| (end - job.created_at).num_seconds() as f64 / 3600.0);
        let billable_hours = job.billable_seconds.map(|s| s as f64 / 3600.0);

        let data = json!({
            "name": job.name,
            "status": job.status.as_str(),
            "created_at": job.created_at,
            "ended_at": job.ended_at,
            "instance_type": job.instance_type,
            "instance_count": job.instance_count,
            "volume_size_gb": job.volume_size_gb,
            "duration_hours": duration_hours,
            "billable_hours": billable_hours,
            "failure_reason": job.failure_reason,
            "final_metrics": job.final_metrics,
        });

        Ok(ToolOutcome::success(
            self.name(),
            data,
            format!("Training job '{}' is {}", job.name, job.status.as_str()),
        ))
    }
}
