//! get_endpoint_details — endpoint configuration plus recent traffic.

use async_trait::async_trait;
use serde_json::json;

use crate::api::AwsApi;
use crate::error::{AwsResult, AwsToolError};
use crate::retry::{self, RetryPolicy};
use crate::tools::require_str;
use crate::types::AwsTool;
use mlc_protocol::{TimeWindow, ToolOutcome};

pub struct GetEndpointDetails;

#[async_trait]
impl AwsTool for GetEndpointDetails {
    fn name(&self) -> &str {
        "get_endpoint_details"
    }

    fn description(&self) -> &str {
        "Get variant configuration and 24-hour invocation count for a SageMaker endpoint"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "endpoint_name": {
                    "type": "string",
                    "description": "Name of the SageMaker endpoint"
                }
            },
            "required": ["endpoint_name"]
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        api: &dyn AwsApi,
        policy: &RetryPolicy,
    ) -> AwsResult<ToolOutcome> {
        let name = require_str(&args, "endpoint_name")?;

        let endpoint = retry::call(policy, || api.describe_endpoint(name)).await?;

        // Metrics are best-effort: a metrics failure degrades the answer
        // rather than failing the whole lookup.
        let window =
            TimeWindow::last_hours(24).map_err(|e| AwsToolError::invalid(e.to_string()))?;
        let invocations_24h =
            match retry::call(policy, || api.endpoint_invocations(name, window)).await {
                Ok(sum) => Some(sum),
                Err(err) => {
                    tracing::warn!(endpoint = %name, error = %err, "invocation metrics unavailable");
                    None
                }
            };

        let data = json!({
            "name": endpoint.name,
            "status": endpoint.status.as_str(),
            "created_at": endpoint.created_at,
            "config_name": endpoint.config_name,
            "variants": endpoint.variants,
            "invocations_24h": invocations_24h,
        });

        let traffic = match invocations_24h {
            Some(n) => format!("{n:.0} invocations in the last 24h"),
            None => "traffic metrics unavailable".to_string(),
        };
        Ok(ToolOutcome::success(
            self.name(),
            data,
            format!(
                "Endpoint '{}' is {} with {traffic}",
                endpoint.name,
                endpoint.status.as_str()
            ),
        ))
    }
}
