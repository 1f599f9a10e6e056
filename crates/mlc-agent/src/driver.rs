//! Agent driver — the tool-invocation loop around the model endpoint.
//!
//! The model is an opaque external scheduler: it decides which tools to
//! call and in what order; this loop only guarantees that every exposed
//! operation is safe to call in any order, that tool failures come back
//! as structured outcomes instead of crashes, and that the whole run
//! stays inside one wall-clock bound.

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::time::timeout;
use uuid::Uuid;

use mlc_protocol::{ErrorKind, RunOutcome};

use crate::config::Limits;
use crate::providers::{AgentMessage, ModelClient, ModelError, ToolResultMessage, ToolSpec};
use crate::registry::{Backends, ToolRegistry};

/// Hard cap on model turns so a looping model cannot run unbounded.
const MAX_TURNS: u32 = 64;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The run exceeded its wall-clock bound. Partial workspace files
    /// are preserved, not rolled back.
    #[error("run exceeded the {secs}s wall-clock bound")]
    Timeout { secs: u64 },

    #[error("run exceeded {turns} model turns without a final report")]
    TurnLimit { turns: u32 },
}

/// Drives one deep-analysis run: model turns, tool dispatch, retry and
/// timeout bounds, and the final `RunOutcome`.
pub struct AgentDriver {
    model: std::sync::Arc<dyn ModelClient>,
    registry: ToolRegistry,
    backends: Backends,
    system_prompt: String,
    provider: String,
    limits: Limits,
}

struct LoopResult {
    report: String,
    degraded_notes: Vec<String>,
    turns: u32,
    tool_calls: u32,
}

impl AgentDriver {
    pub fn new(
        model: std::sync::Arc<dyn ModelClient>,
        registry: ToolRegistry,
        backends: Backends,
        system_prompt: String,
        provider: impl Into<String>,
        limits: Limits,
    ) -> Self {
        Self {
            model,
            registry,
            backends,
            system_prompt,
            provider: provider.into(),
            limits,
        }
    }

    /// Run a query to completion under the configured wall-clock bound.
    ///
    /// The timeout always wins: expiry cancels any in-flight model call,
    /// tool call, or retry backoff.
    pub async fn run(&self, query: &str) -> Result<RunOutcome, DriverError> {
        let started_at = Utc::now();
        let start = tokio::time::Instant::now();
        let bound = Duration::from_secs(self.limits.run_timeout_secs);

        tracing::info!(
            provider = %self.provider,
            model_id = %self.model.model_id(),
            tool_count = self.registry.len(),
            "starting deep analysis run"
        );

        let result = match timeout(bound, self.run_loop(query)).await {
            Ok(inner) => inner?,
            Err(_) => {
                tracing::error!(
                    timeout_secs = self.limits.run_timeout_secs,
                    "run timed out; workspace state preserved"
                );
                return Err(DriverError::Timeout {
                    secs: self.limits.run_timeout_secs,
                });
            }
        };

        tracing::info!(
            turns = result.turns,
            tool_calls = result.tool_calls,
            "run completed"
        );
        Ok(RunOutcome {
            run_id: Uuid::now_v7(),
            query: query.to_string(),
            provider: self.provider.clone(),
            model_id: self.model.model_id().to_string(),
            report: result.report,
            degraded_notes: result.degraded_notes,
            turns: result.turns,
            tool_calls: result.tool_calls,
            started_at,
            duration_secs: start.elapsed().as_secs_f64(),
        })
    }

    async fn run_loop(&self, query: &str) -> Result<LoopResult, DriverError> {
        let specs = self.registry.specs();
        let mut messages = vec![AgentMessage::User(query.to_string())];
        let mut degraded_notes = Vec::new();
        let mut turns = 0u32;
        let mut tool_calls = 0u32;

        loop {
            if turns >= MAX_TURNS {
                return Err(DriverError::TurnLimit { turns });
            }
            let reply = self.converse_with_retry(&messages, &specs).await?;
            turns += 1;

            if reply.tool_calls.is_empty() {
                // Final answer.
                return Ok(LoopResult {
                    report: reply.text.unwrap_or_default(),
                    degraded_notes,
                    turns,
                    tool_calls,
                });
            }

            messages.push(AgentMessage::Assistant {
                text: reply.text.clone(),
                tool_calls: reply.tool_calls.clone(),
            });

            let mut results = Vec::with_capacity(reply.tool_calls.len());
            for call in &reply.tool_calls {
                tracing::debug!(tool = %call.name, "dispatching tool call");
                let outcome = self
                    .registry
                    .execute(&call.name, call.arguments.clone(), &self.backends)
                    .await;
                tool_calls += 1;
                if outcome.error_kind == Some(ErrorKind::Throttled) {
                    let note = format!(
                        "{}: degraded result after exhausting retries ({})",
                        call.name,
                        outcome.error.as_deref().unwrap_or("throttled")
                    );
                    tracing::warn!(tool = %call.name, "tool degraded by throttling");
                    degraded_notes.push(note);
                }
                results.push(ToolResultMessage {
                    call_id: call.id.clone(),
                    outcome,
                });
            }
            messages.push(AgentMessage::ToolResults(results));
        }
    }

    /// One model turn, retrying transient endpoint failures up to the
    /// driver-level bound with exponential backoff.
    async fn converse_with_retry(
        &self,
        messages: &[AgentMessage],
        specs: &[ToolSpec],
    ) -> Result<crate::providers::ModelReply, ModelError> {
        let max = self.limits.tool_error_retries.max(1);
        let mut attempt = 0u32;
        loop {
            match self
                .model
                .converse(&self.system_prompt, messages, specs)
                .await
            {
                Ok(reply) => return Ok(reply),
                Err(err) if err.is_retryable() && attempt + 1 < max => {
                    let delay = Duration::from_millis(500) * 2u32.saturating_pow(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts = max,
                        error = %err,
                        "transient model error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use mlc_aws_tools::{MockAwsApi, RetryPolicy};
    use mlc_search_tools::MockSearchApi;
    use mlc_workspace_tools::Sandbox;
    use serde_json::json;
    use tempfile::TempDir;

    use crate::providers::{ScriptedModel, ToolCall};

    fn driver_with(model: Arc<ScriptedModel>, dir: &TempDir, limits: Limits) -> AgentDriver {
        let backends = Backends {
            aws: Arc::new(MockAwsApi::with_ml_fixture()),
            search: Arc::new(MockSearchApi::with_pricing_hits()),
            sandbox: Sandbox::new(dir.path()).unwrap(),
            retry: RetryPolicy::default(),
        };
        AgentDriver::new(
            model,
            ToolRegistry::with_defaults(),
            backends,
            "You are an AWS ML cost analyst.".into(),
            "bedrock",
            limits,
        )
    }

    fn call(id: &str, name: &str, args: serde_json::Value) -> ToolCall {
        ToolCall {
            id: id.into(),
            name: name.into(),
            arguments: args,
        }
    }

    #[tokio::test]
    async fn immediate_report_completes_in_one_turn() {
        let model = Arc::new(ScriptedModel::new());
        model.push_text("# Executive Summary\nNothing to optimize.");
        let dir = TempDir::new().unwrap();
        let driver = driver_with(model.clone(), &dir, Limits::default());

        let outcome = driver.run("analyze my ML costs").await.unwrap();
        assert_eq!(outcome.turns, 1);
        assert_eq!(outcome.tool_calls, 0);
        assert!(outcome.report.contains("Executive Summary"));
        assert!(outcome.degraded_notes.is_empty());
    }

    #[tokio::test]
    async fn tool_calls_execute_and_feed_back() {
        let model = Arc::new(ScriptedModel::new());
        model.push_tool_calls(vec![
            call("c1", "list_endpoints", json!({})),
            call("c2", "write_file", json!({"path": "notes.md", "content": "21 endpoints"})),
        ]);
        model.push_text("# Report\n21 endpoints found.");
        let dir = TempDir::new().unwrap();
        let driver = driver_with(model.clone(), &dir, Limits::default());

        let outcome = driver.run("count endpoints").await.unwrap();
        assert_eq!(outcome.turns, 2);
        assert_eq!(outcome.tool_calls, 2);
        assert!(dir.path().join("notes.md").exists());
    }

    #[tokio::test]
    async fn tool_failures_do_not_crash_the_run() {
        let model = Arc::new(ScriptedModel::new());
        model.push_tool_calls(vec![call("c1", "no_such_tool", json!({}))]);
        model.push_text("# Report\nProceeded without that tool.");
        let dir = TempDir::new().unwrap();
        let driver = driver_with(model.clone(), &dir, Limits::default());

        let outcome = driver.run("q").await.unwrap();
        assert_eq!(outcome.tool_calls, 1);
        assert!(outcome.report.contains("Proceeded"));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_tool_throttling_becomes_a_degraded_note() {
        let model = Arc::new(ScriptedModel::new());
        model.push_tool_calls(vec![call("c1", "list_dashboards", json!({}))]);
        model.push_text("# Report\nDashboards unavailable.");
        let dir = TempDir::new().unwrap();

        let aws = Arc::new(MockAwsApi::with_ml_fixture());
        aws.throttle_next(10); // outlasts the 3-attempt retry policy
        let backends = Backends {
            aws: aws.clone(),
            search: Arc::new(MockSearchApi::new()),
            sandbox: Sandbox::new(dir.path()).unwrap(),
            retry: RetryPolicy::default(),
        };
        let driver = AgentDriver::new(
            model,
            ToolRegistry::with_defaults(),
            backends,
            "prompt".into(),
            "bedrock",
            Limits::default(),
        );

        let outcome = driver.run("q").await.unwrap();
        assert_eq!(outcome.degraded_notes.len(), 1);
        assert!(outcome.degraded_notes[0].starts_with("list_dashboards:"));
        assert_eq!(aws.call_count("list_dashboards"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_model_errors_are_retried() {
        let model = Arc::new(ScriptedModel::new());
        model.push_error(ModelError::Throttled {
            message: "busy".into(),
        });
        model.push_text("# Report\nDone.");
        let dir = TempDir::new().unwrap();
        let driver = driver_with(model.clone(), &dir, Limits::default());

        let outcome = driver.run("q").await.unwrap();
        assert_eq!(model.turn_count(), 2);
        assert_eq!(outcome.turns, 1);
    }

    #[tokio::test]
    async fn auth_failure_is_fatal_immediately() {
        let model = Arc::new(ScriptedModel::new());
        model.push_error(ModelError::Auth {
            message: "invalid credentials".into(),
        });
        let dir = TempDir::new().unwrap();
        let driver = driver_with(model.clone(), &dir, Limits::default());

        let err = driver.run("q").await.unwrap_err();
        assert!(matches!(err, DriverError::Model(ModelError::Auth { .. })));
        assert_eq!(model.turn_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_wins_over_in_flight_retries() {
        let model = Arc::new(ScriptedModel::new());
        // Endless retryable errors would keep the retry loop sleeping;
        // the zero-second run bound must cancel it.
        for _ in 0..10 {
            model.push_error(ModelError::Throttled {
                message: "busy".into(),
            });
        }
        let dir = TempDir::new().unwrap();
        let limits = Limits {
            run_timeout_secs: 0,
            ..Limits::default()
        };
        let driver = driver_with(model.clone(), &dir, limits);

        let err = driver.run("q").await.unwrap_err();
        assert!(matches!(err, DriverError::Timeout { secs: 0 }));
    }

    #[tokio::test]
    async fn empty_script_surfaces_model_error() {
        let model = Arc::new(ScriptedModel::new());
        let dir = TempDir::new().unwrap();
        let driver = driver_with(model.clone(), &dir, Limits::default());
        let err = driver.run("q").await.unwrap_err();
        assert!(matches!(err, DriverError::Model(ModelError::Api { .. })));
    }
}
