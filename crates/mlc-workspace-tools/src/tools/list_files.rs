//! list_files — recursive listing in lexicographic path order.

use async_trait::async_trait;
use serde_json::json;

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::sandbox::Sandbox;
use crate::tools::{require_str, walk_files};
use crate::types::WorkspaceTool;
use mlc_protocol::ToolOutcome;

pub struct ListFiles;

#[async_trait]
impl WorkspaceTool for ListFiles {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "Recursively list workspace files in lexicographic order, optionally under a subdirectory"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Subdirectory to list (default: the workspace root)"
                }
            },
            "required": []
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        sandbox: &Sandbox,
    ) -> WorkspaceResult<ToolOutcome> {
        let dir = match args.get("path") {
            None | Some(serde_json::Value::Null) => sandbox.root().to_path_buf(),
            Some(_) => {
                let rel = require_str(&args, "path")?;
                let resolved = sandbox.resolve(rel)?;
                if !resolved.is_dir() {
                    return Err(WorkspaceError::NotFound {
                        path: rel.to_string(),
                    });
                }
                resolved
            }
        };

        let files = walk_files(sandbox, &dir).await?;
        let file_count = files.len();

        Ok(ToolOutcome::success(
            self.name(),
            json!({"file_count": file_count, "files": files}),
            format!("Workspace holds {file_count} file(s)"),
        ))
    }
}
