//! write_file — create or overwrite a file inside the sandbox.

use async_trait::async_trait;
use serde_json::json;

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::sandbox::Sandbox;
use crate::tools::require_str;
use crate::types::WorkspaceTool;
use mlc_protocol::ToolOutcome;

pub struct WriteFile;

#[async_trait]
impl WorkspaceTool for WriteFile {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write a file in the workspace, creating parent directories as needed. Overwrites existing content."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Workspace-relative path (e.g. analysis/jobs.json)"
                },
                "content": {
                    "type": "string",
                    "description": "Full file content"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        sandbox: &Sandbox,
    ) -> WorkspaceResult<ToolOutcome> {
        let rel = require_str(&args, "path")?;
        let content = require_str(&args, "content")?;

        let path = sandbox.resolve(rel)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| WorkspaceError::Io {
                    message: format!("{}: {e}", parent.display()),
                })?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| WorkspaceError::Io {
                message: format!("{}: {e}", path.display()),
            })?;

        let display = sandbox.relative_display(&path);
        let bytes = content.len();
        tracing::debug!(path = %display, bytes, "wrote workspace file");
        Ok(ToolOutcome::success(
            self.name(),
            json!({"path": display, "bytes_written": bytes}),
            format!("Wrote {bytes} byte(s) to {display}"),
        ))
    }
}
