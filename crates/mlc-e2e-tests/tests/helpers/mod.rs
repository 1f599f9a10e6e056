//! Shared harness for e2e tests: scripted model + mock backends +
//! tempdir sandbox wired into a real driver and registry.

use std::sync::Arc;

use tempfile::TempDir;

use mlc_agent::config::Limits;
use mlc_agent::driver::AgentDriver;
use mlc_agent::providers::{ScriptedModel, ToolCall};
use mlc_agent::registry::{Backends, ToolRegistry};
use mlc_aws_tools::{MockAwsApi, RetryPolicy};
use mlc_search_tools::MockSearchApi;
use mlc_workspace_tools::Sandbox;

pub struct TestHarness {
    pub model: Arc<ScriptedModel>,
    pub aws: Arc<MockAwsApi>,
    pub search: Arc<MockSearchApi>,
    /// Kept alive so the sandbox directory survives the test.
    pub workspace: TempDir,
}

impl TestHarness {
    /// Harness over the standard ML fixture (9 training jobs, 21
    /// endpoints) and pricing search hits.
    pub fn with_ml_fixture() -> Self {
        Self {
            model: Arc::new(ScriptedModel::new()),
            aws: Arc::new(MockAwsApi::with_ml_fixture()),
            search: Arc::new(MockSearchApi::with_pricing_hits()),
            workspace: TempDir::new().expect("tempdir"),
        }
    }

    pub fn sandbox(&self) -> Sandbox {
        Sandbox::new(self.workspace.path()).expect("sandbox")
    }

    pub fn backends(&self) -> Backends {
        Backends {
            aws: self.aws.clone(),
            search: self.search.clone(),
            sandbox: self.sandbox(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn registry(&self) -> ToolRegistry {
        ToolRegistry::with_defaults()
    }

    pub fn driver(&self, limits: Limits) -> AgentDriver {
        AgentDriver::new(
            self.model.clone(),
            self.registry(),
            self.backends(),
            "You are an AWS ML cost analyst.".into(),
            "bedrock",
            limits,
        )
    }
}

/// Shorthand for a scripted tool call.
pub fn call(id: &str, name: &str, args: serde_json::Value) -> ToolCall {
    ToolCall {
        id: id.into(),
        name: name.into(),
        arguments: args,
    }
}
