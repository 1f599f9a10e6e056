//! list_dashboards — CloudWatch dashboards in the account.

use async_trait::async_trait;
use serde_json::json;

use crate::api::AwsApi;
use crate::error::AwsResult;
use crate::retry::{self, RetryPolicy};
use crate::types::AwsTool;
use mlc_protocol::ToolOutcome;

pub struct ListDashboards;

#[async_trait]
impl AwsTool for ListDashboards {
    fn name(&self) -> &str {
        "list_dashboards"
    }

    fn description(&self) -> &str {
        "List CloudWatch dashboards with last-modified times"
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
        let dashboards = retry::call(policy, || api.list_dashboards()).await?;
        let dashboard_count = dashboards.len();

        let data = json!({
            "dashboard_count": dashboard_count,
            "dashboards": dashboards,
        });

        Ok(ToolOutcome::success(
            self.name(),
            data,
            format!("Found {dashboard_count} dashboard(s)"),
        ))
    }
}
