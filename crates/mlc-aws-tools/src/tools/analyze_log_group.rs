//! analyze_log_group — error/warning breakdown for one log group.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;

use crate::api::AwsApi;
use crate::error::{AwsResult, AwsToolError};
use crate::retry::{self, RetryPolicy};
use crate::tools::{int_arg, require_str};
use crate::types::{AwsTool, LogEvent};
use mlc_protocol::{TimeWindow, ToolOutcome};

/// How many distinct error lines to report.
const TOP_ERRORS: usize = 5;

pub struct AnalyzeLogGroup;

#[async_trait]
impl AwsTool for AnalyzeLogGroup {
    fn name(&self) -> &str {
        "analyze_log_group"
    }

    fn description(&self) -> &str {
        "Analyze a CloudWatch log group: error and warning counts plus the most frequent error lines"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "log_group": {
                    "type": "string",
                    "description": "Log group name to analyze"
                },
                "hours": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Hours to look back (default: 24)",
                    "default": 24
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
        let hours = int_arg(&args, "hours", 24)?;
        let window =
            TimeWindow::last_hours(hours).map_err(|e| AwsToolError::invalid(e.to_string()))?;

        let events =
            retry::call(policy, || api.filter_log_events(group, None, window, 100)).await?;

        let stats = summarize(&events);

        let data = json!({
            "log_group": group,
            "window": window.label(),
            "event_count": events.len(),
            "error_count": stats.errors,
            "warning_count": stats.warnings,
            "top_errors": stats.top_errors,
        });

        Ok(ToolOutcome::success(
            self.name(),
            data,
            format!(
                "{group}: {} error(s), {} warning(s) in {} event(s)",
                stats.errors,
                stats.warnings,
                events.len()
            ),
        ))
    }
}

struct LogStats {
    errors: usize,
    warnings: usize,
    top_errors: Vec<serde_json::Value>,
}

fn summarize(events: &[LogEvent]) -> LogStats {
    let mut errors = 0usize;
    let mut warnings = 0usize;
    let mut error_lines: HashMap<&str, usize> = HashMap::new();

    for event in events {
        let lower = event.message.to_lowercase();
        if lower.contains("error") || lower.contains("exception") || lower.contains("fail") {
            errors += 1;
            *error_lines.entry(event.message.as_str()).or_insert(0) += 1;
        } else if lower.contains("warn") {
            warnings += 1;
        }
    }

    let mut ranked: Vec<_> = error_lines.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let top_errors = ranked
        .into_iter()
        .take(TOP_ERRORS)
        .map(|(line, count)| json!({"message": line, "count": count}))
        .collect();

    LogStats {
        errors,
        warnings,
        top_errors,
    }
}
