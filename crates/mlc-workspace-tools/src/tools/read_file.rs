//! read_file — read a workspace file back.

use async_trait::async_trait;
use serde_json::json;

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::sandbox::Sandbox;
use crate::tools::require_str;
use crate::types::WorkspaceTool;
use mlc_protocol::ToolOutcome;

pub struct ReadFile;

#[async_trait]
impl WorkspaceTool for ReadFile {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the full content of a workspace file"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Workspace-relative path to read"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        sandbox: &Sandbox,
    ) -> WorkspaceResult<ToolOutcome> {
        let rel = require_str(&args, "path")?;
        let path = sandbox.resolve(rel)?;

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WorkspaceError::NotFound {
                    path: rel.to_string(),
                }
            } else {
                WorkspaceError::Io {
                    message: format!("{}: {e}", path.display()),
                }
            }
        })?;

        let display = sandbox.relative_display(&path);
        let bytes = content.len();
        Ok(ToolOutcome::success(
            self.name(),
            json!({"path": display, "content": content}),
            format!("Read {bytes} byte(s) from {display}"),
        ))
    }
}
