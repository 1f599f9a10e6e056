//! The WorkspaceTool trait.

use async_trait::async_trait;

use crate::error::WorkspaceResult;
use crate::sandbox::Sandbox;
use mlc_protocol::ToolOutcome;

/// Trait for workspace file tools.
///
/// Same shape as the AWS and search tool traits so the agent registry
/// can treat all capability kinds uniformly. Every path argument is
/// resolved through the sandbox before any filesystem access.
#[async_trait]
pub trait WorkspaceTool: Send + Sync {
    /// Tool name (e.g., "write_file").
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema describing accepted arguments.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with JSON arguments against a sandbox.
    async fn execute(
        &self,
        args: serde_json::Value,
        sandbox: &Sandbox,
    ) -> WorkspaceResult<ToolOutcome>;
}
