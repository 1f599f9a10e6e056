//! get_dashboard_summary — widget breakdown for one dashboard.

use async_trait::async_trait;
use serde_json::json;

use crate::api::AwsApi;
use crate::error::AwsResult;
use crate::retry::{self, RetryPolicy};
use crate::tools::require_str;
use crate::types::AwsTool;
use mlc_protocol::ToolOutcome;

pub struct GetDashboardSummary;

#[async_trait]
impl AwsTool for GetDashboardSummary {
    fn name(&self) -> &str {
        "get_dashboard_summary"
    }

    fn description(&self) -> &str {
        "Summarize a CloudWatch dashboard: widget count and widget types"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "dashboard_name": {
                    "type": "string",
                    "description": "Name of the CloudWatch dashboard"
                }
            },
            "required": ["dashboard_name"]
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        api: &dyn AwsApi,
        policy: &RetryPolicy,
    ) -> AwsResult<ToolOutcome> {
        let name = require_str(&args, "dashboard_name")?;

        let detail = retry::call(policy, || api.get_dashboard(name)).await?;

        let data = json!({
            "name": detail.name,
            "widget_count": detail.widget_count,
            "widget_types": detail.widget_types,
        });

        Ok(ToolOutcome::success(
            self.name(),
            data,
            format!(
                "Dashboard '{}' has {} widget(s)",
                detail.name, detail.widget_count
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AwsToolError;
    use crate::mock::MockAwsApi;

    #[tokio::test]
    async fn summarizes_widgets() {
        let api = MockAwsApi::with_ml_fixture();
        let result = GetDashboardSummary
            .execute(
                json!({"dashboard_name": "ml-serving-overview"}),
                &api,
                &RetryPolicy::default(),
            )
            .await
            .unwrap();
        assert_eq!(result.data.unwrap()["widget_count"], 6);
    }

    #[tokio::test]
    async fn unknown_dashboard_is_not_found() {
        let api = MockAwsApi::with_ml_fixture();
        let err = GetDashboardSummary
            .execute(
                json!({"dashboard_name": "ghost"}),
                &api,
                &RetryPolicy::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AwsToolError::NotFound { .. }));
    }

    #[tokio::test]
    async fn missing_name_never_reaches_backend() {
        let api = MockAwsApi::with_ml_fixture();
        let err = GetDashboardSummary
            .execute(json!({}), &api, &RetryPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AwsToolError::InvalidArgument { .. }));
        assert!(api.calls().is_empty());
    }
}
