//! Search tool implementations.

mod internet_search;

pub use internet_search::InternetSearch;

use async_trait::async_trait;

use crate::client::SearchApi;
use crate::error::SearchResult;
use mlc_protocol::ToolOutcome;

/// Trait for search tools — same shape as the AWS and workspace tool
/// traits, executing against a `SearchApi` backend.
#[async_trait]
pub trait SearchTool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters_schema(&self) -> serde_json::Value;

    async fn execute(
        &self,
        args: serde_json::Value,
        api: &dyn SearchApi,
    ) -> SearchResult<ToolOutcome>;
}

/// All search tools (currently just internet_search).
pub fn all_tools() -> Vec<Box<dyn SearchTool>> {
    vec![Box::new(InternetSearch)]
}
