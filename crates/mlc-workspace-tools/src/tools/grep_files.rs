//! grep_files — regex search across workspace files.

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;

use crate::error::{WorkspaceError, WorkspaceResult};
use crate::sandbox::Sandbox;
use crate::tools::{require_str, walk_files};
use crate::types::WorkspaceTool;
use mlc_protocol::ToolOutcome;

/// Default cap on returned matches.
const DEFAULT_LIMIT: u64 = 100;

pub struct GrepFiles;

#[async_trait]
impl WorkspaceTool for GrepFiles {
    fn name(&self) -> &str {
        "grep_files"
    }

    fn description(&self) -> &str {
        "Search workspace files with a regex; matches are ordered by path then line number"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Regex pattern to search for"
                },
                "path": {
                    "type": "string",
                    "description": "Subdirectory to search (default: the workspace root)"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of matches (default: 100)",
                    "default": 100
                }
            },
            "required": ["pattern"]
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        sandbox: &Sandbox,
    ) -> WorkspaceResult<ToolOutcome> {
        let pattern = require_str(&args, "pattern")?;
        let limit = args["limit"].as_u64().unwrap_or(DEFAULT_LIMIT) as usize;
        let re = Regex::new(pattern).map_err(|e| WorkspaceError::Pattern {
            message: e.to_string(),
        })?;

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

        // walk_files is already lexicographically sorted, so matches come
        // out ordered by (path, line) without a second sort.
        let files = walk_files(sandbox, &dir).await?;
        let mut matches = Vec::new();
        'outer: for rel in &files {
            let path = sandbox.resolve(rel)?;
            let Ok(content) = tokio::fs::read_to_string(&path).await else {
                continue; // skip non-UTF-8 scratch data
            };
            for (idx, line) in content.lines().enumerate() {
                if re.is_match(line) {
                    matches.push(json!({
                        "path": rel,
                        "line": idx + 1,
                        "text": line,
                    }));
                    if matches.len() >= limit {
                        break 'outer;
                    }
                }
            }
        }

        let match_count = matches.len();
        Ok(ToolOutcome::success(
            self.name(),
            json!({
                "pattern": pattern,
                "match_count": match_count,
                "matches": matches,
            }),
            format!("Found {match_count} match(es) for '{pattern}'"),
        ))
    }
}
