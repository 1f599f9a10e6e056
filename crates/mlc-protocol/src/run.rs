//! Final result of one CLI invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the report is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

/// Everything the CLI knows about a completed run.
///
/// `--format markdown` prints `report` as-is; `--format json` serializes
/// this whole record so scripted callers get run status alongside the
/// report body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Unique run ID (UUIDv7 for time-sortability).
    pub run_id: Uuid,
    /// The user query that drove the run.
    pub query: String,
    /// Provider that served the model ("bedrock" or "openai").
    pub provider: String,
    /// Model identifier used.
    pub model_id: String,
    /// The final Markdown report produced by the agent.
    pub report: String,
    /// Notes about degraded results (e.g. a tool that exhausted its
    /// throttling retries). Empty on a clean run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded_notes: Vec<String>,
    /// Model turns taken.
    pub turns: u32,
    /// Total tool invocations across the run.
    pub tool_calls: u32,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in seconds.
    pub duration_secs: f64,
}
