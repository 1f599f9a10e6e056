//! get_service_alarms — CloudWatch alarms, optionally by name prefix.

use async_trait::async_trait;
use serde_json::json;

use crate::api::AwsApi;
use crate::error::AwsResult;
use crate::retry::{self, RetryPolicy};
use crate::tools::str_arg;
use crate::types::AwsTool;
use mlc_protocol::ToolOutcome;

pub struct GetServiceAlarms;

#[async_trait]
impl AwsTool for GetServiceAlarms {
    fn name(&self) -> &str {
        "get_service_alarms"
    }

    fn description(&self) -> &str {
        "List CloudWatch alarms with their state, optionally filtered by name prefix"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "prefix": {
                    "type": "string",
                    "description": "Only return alarms whose name starts with this prefix"
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

        let alarms = retry::call(policy, || api.alarms_for_prefix(prefix)).await?;
        let alarm_count = alarms.len();
        let firing = alarms.iter().filter(|a| a.state == "ALARM").count();

        let data = json!({
            "alarm_count": alarm_count,
            "firing_count": firing,
            "alarms": alarms,
        });

        Ok(ToolOutcome::success(
            self.name(),
            data,
            format!("Found {alarm_count} alarm(s), {firing} firing"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AwsToolError;
    use crate::mock::MockAwsApi;

    #[tokio::test]
    async fn lists_alarms() {
        let api = MockAwsApi::with_ml_fixture();
        let result = GetServiceAlarms
            .execute(json!({}), &api, &RetryPolicy::default())
            .await
            .unwrap();
        let data = result.data.unwrap();
        assert_eq!(data["alarm_count"], 1);
        assert_eq!(data["firing_count"], 0);
    }

    #[tokio::test]
    async fn prefix_must_be_a_string() {
        let api = MockAwsApi::with_ml_fixture();
        let err = GetServiceAlarms
            .execute(json!({"prefix": 42}), &api, &RetryPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AwsToolError::InvalidArgument { .. }));
        assert!(api.calls().is_empty());
    }
}
