//! list_endpoints — SageMaker inference endpoints and their status.

use async_trait::async_trait;
use serde_json::json;

use crate::api::AwsApi;
use crate::error::AwsResult;
use crate::retry::{self, RetryPolicy};
use crate::tools::bounded_limit;
use crate::types::AwsTool;
use mlc_protocol::ToolOutcome;

pub struct ListEndpoints;

#[async_trait]
impl AwsTool for ListEndpoints {
    fn name(&self) -> &str {
        "list_endpoints"
    }

    fn description(&self) -> &str {
        "List SageMaker inference endpoints with their status and creation time"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "max_results": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 100,
                    "description": "Maximum number of endpoints to return (default: 50)",
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
        let max_results = bounded_limit(&args, "max_results", 50)?;

        let endpoints = retry::call(policy, || api.list_endpoints(max_results)).await?;

        let in_service = endpoints.iter().filter(|e| e.status.is_in_service()).count();
        let endpoint_count = endpoints.len();
        let rows: Vec<_> = endpoints
            .iter()
            .map(|e| {
                json!({
                    "name": e.name,
                    "status": e.status.as_str(),
                    "created_at": e.created_at,
                })
            })
            .collect();

        let data = json!({
            "endpoint_count": endpoint_count,
            "in_service_count": in_service,
            "endpoints": rows,
        });

        tracing::info!(endpoint_count, in_service, "listed endpoints");
        Ok(ToolOutcome::success(
            self.name(),
            data,
            format!("Found {endpoint_count} endpoint(s), {in_service} in service"),
        ))
    }
}
