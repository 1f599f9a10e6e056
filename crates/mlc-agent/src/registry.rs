//! Unified tool registry spanning AWS, workspace, and search tools.
//!
//! A closed tagged registry: the capability set handed to the model is
//! exactly what is registered here, and unknown tool names are rejected
//! at this boundary with a structured outcome.

use std::collections::HashMap;
use std::sync::Arc;

use mlc_aws_tools::{AwsApi, AwsTool, RetryPolicy};
use mlc_protocol::{ErrorKind, ToolOutcome};
use mlc_search_tools::{SearchApi, SearchTool};
use mlc_workspace_tools::{Sandbox, WorkspaceTool};

use crate::providers::ToolSpec;

/// Which subsystem a tool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Aws,
    Workspace,
    Search,
}

/// The backends tools execute against — read-only after construction
/// and safe to share across concurrent tool calls.
pub struct Backends {
    pub aws: Arc<dyn AwsApi>,
    pub search: Arc<dyn SearchApi>,
    pub sandbox: Sandbox,
    pub retry: RetryPolicy,
}

/// Unified tool registry for the agent driver.
pub struct ToolRegistry {
    aws_tools: Vec<Box<dyn AwsTool>>,
    workspace_tools: Vec<Box<dyn WorkspaceTool>>,
    search_tools: Vec<Box<dyn SearchTool>>,
    /// Map from tool name → (kind, index into the appropriate Vec).
    index: HashMap<String, (ToolKind, usize)>,
}

impl ToolRegistry {
    /// Build a registry from tool collections.
    pub fn new(
        aws_tools: Vec<Box<dyn AwsTool>>,
        workspace_tools: Vec<Box<dyn WorkspaceTool>>,
        search_tools: Vec<Box<dyn SearchTool>>,
    ) -> Self {
        let mut index = HashMap::new();
        for (i, tool) in aws_tools.iter().enumerate() {
            index.insert(tool.name().to_string(), (ToolKind::Aws, i));
        }
        for (i, tool) in workspace_tools.iter().enumerate() {
            index.insert(tool.name().to_string(), (ToolKind::Workspace, i));
        }
        for (i, tool) in search_tools.iter().enumerate() {
            index.insert(tool.name().to_string(), (ToolKind::Search, i));
        }
        Self {
            aws_tools,
            workspace_tools,
            search_tools,
            index,
        }
    }

    /// Build with the default set of all tools from the three crates.
    pub fn with_defaults() -> Self {
        Self::new(
            mlc_aws_tools::tools::all_tools(),
            mlc_workspace_tools::tools::all_tools(),
            mlc_search_tools::tools::all_tools(),
        )
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Option<(ToolKind, usize)> {
        self.index.get(name).copied()
    }

    /// Declared specs for the whole capability set, in registration order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs = Vec::with_capacity(self.len());
        for tool in &self.aws_tools {
            specs.push(ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                schema: tool.parameters_schema(),
            });
        }
        for tool in &self.workspace_tools {
            specs.push(ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                schema: tool.parameters_schema(),
            });
        }
        for tool in &self.search_tools {
            specs.push(ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                schema: tool.parameters_schema(),
            });
        }
        specs
    }

    /// Execute a tool by name.
    ///
    /// Never returns an error: failures become structured outcomes the
    /// calling agent can reason about and route around.
    pub async fn execute(
        &self,
        name: &str,
        args: serde_json::Value,
        backends: &Backends,
    ) -> ToolOutcome {
        let Some((kind, idx)) = self.lookup(name) else {
            return ToolOutcome::failure(
                name,
                ErrorKind::InvalidArgument,
                format!("unknown tool: {name}"),
            );
        };

        match kind {
            ToolKind::Aws => {
                let tool = &self.aws_tools[idx];
                match tool
                    .execute(args, backends.aws.as_ref(), &backends.retry)
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(err) => ToolOutcome::failure(name, err.kind(), err.to_string()),
                }
            }
            ToolKind::Workspace => {
                let tool = &self.workspace_tools[idx];
                match tool.execute(args, &backends.sandbox).await {
                    Ok(outcome) => outcome,
                    Err(err) => ToolOutcome::failure(name, err.kind(), err.to_string()),
                }
            }
            ToolKind::Search => {
                let tool = &self.search_tools[idx];
                match tool.execute(args, backends.search.as_ref()).await {
                    Ok(outcome) => outcome,
                    Err(err) => ToolOutcome::failure(name, err.kind(), err.to_string()),
                }
            }
        }
    }

    /// Total number of registered tools.
    pub fn len(&self) -> usize {
        self.aws_tools.len() + self.workspace_tools.len() + self.search_tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlc_aws_tools::MockAwsApi;
    use mlc_search_tools::MockSearchApi;
    use serde_json::json;
    use tempfile::TempDir;

    fn backends(dir: &TempDir) -> Backends {
        Backends {
            aws: Arc::new(MockAwsApi::with_ml_fixture()),
            search: Arc::new(MockSearchApi::with_pricing_hits()),
            sandbox: Sandbox::new(dir.path()).unwrap(),
            retry: RetryPolicy::default(),
        }
    }

    #[test]
    fn registry_with_defaults() {
        let reg = ToolRegistry::with_defaults();
        assert_eq!(reg.len(), 18); // 13 AWS + 4 workspace + 1 search
        assert_eq!(reg.specs().len(), 18);
    }

    #[test]
    fn lookup_spans_all_kinds() {
        let reg = ToolRegistry::with_defaults();
        assert_eq!(reg.lookup("analyze_ml_costs").unwrap().0, ToolKind::Aws);
        assert_eq!(reg.lookup("write_file").unwrap().0, ToolKind::Workspace);
        assert_eq!(reg.lookup("internet_search").unwrap().0, ToolKind::Search);
        assert!(reg.lookup("nonexistent_tool").is_none());
    }

    #[tokio::test]
    async fn unknown_tool_is_a_structured_outcome() {
        let dir = TempDir::new().unwrap();
        let reg = ToolRegistry::with_defaults();
        let outcome = reg
            .execute("mutate_endpoint", json!({}), &backends(&dir))
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.error_kind, Some(ErrorKind::InvalidArgument));
    }

    #[tokio::test]
    async fn aws_tool_dispatch() {
        let dir = TempDir::new().unwrap();
        let reg = ToolRegistry::with_defaults();
        let outcome = reg
            .execute("list_endpoints", json!({}), &backends(&dir))
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.data.unwrap()["endpoint_count"], 21);
    }

    #[tokio::test]
    async fn workspace_violation_becomes_failure_outcome() {
        let dir = TempDir::new().unwrap();
        let reg = ToolRegistry::with_defaults();
        let outcome = reg
            .execute(
                "write_file",
                json!({"path": "../escape.txt", "content": "x"}),
                &backends(&dir),
            )
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.error_kind, Some(ErrorKind::SandboxViolation));
    }

    #[tokio::test]
    async fn search_tool_dispatch() {
        let dir = TempDir::new().unwrap();
        let reg = ToolRegistry::with_defaults();
        let outcome = reg
            .execute(
                "internet_search",
                json!({"query": "sagemaker pricing"}),
                &backends(&dir),
            )
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.data.unwrap()["hit_count"], 2);
    }
}
