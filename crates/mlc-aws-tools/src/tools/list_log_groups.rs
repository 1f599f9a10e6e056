//! list_log_groups — CloudWatch log groups, optionally by prefix.

use async_trait::async_trait;
use serde_json::json;

use crate::api::AwsApi;
use crate::error::AwsResult;
use crate::retry::{self, RetryPolicy};
use crate::tools::{bounded_limit, str_arg};
use crate::types::AwsTool;
use mlc_protocol::ToolOutcome;

pub struct ListLogGroups;

#[async_trait]
impl AwsTool for ListLogGroups {
    fn name(&self) -> &str {
        "list_log_groups"
    }

    fn description(&self) -> &str {
        "List CloudWatch log groups with stored bytes and retention settings"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "prefix": {
                    "type": "string",
                    "description": "Only return groups whose name starts with this prefix (e.g. /aws/sagemaker/)"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 100,
                    "description": "Maximum number of groups to return (default: 50)",
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
        let prefix = str_arg(&args, "prefix")?;
        let limit = bounded_limit(&args, "limit", 50)?;

        let groups = retry::call(policy, || api.list_log_groups(prefix, limit)).await?;
        let group_count = groups.len();

        // Groups without a retention policy store logs forever.
        let unbounded_retention = groups.iter().filter(|g| g.retention_days.is_none()).count();

        let data = json!({
            "group_count": group_count,
            "unbounded_retention_count": unbounded_retention,
            "groups": groups,
        });

        Ok(ToolOutcome::success(
            self.name(),
            data,
            format!(
                "Found {group_count} log group(s), {unbounded_retention} without retention policy"
            ),
        ))
    }
}
