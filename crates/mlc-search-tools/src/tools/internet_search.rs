//! internet_search — ranked web snippets for pricing and best-practice
//! research.

use async_trait::async_trait;
use serde_json::json;

use crate::client::{SearchApi, SearchTopic};
use crate::error::{SearchError, SearchResult};
use crate::tools::SearchTool;
use mlc_protocol::ToolOutcome;

pub struct InternetSearch;

#[async_trait]
impl SearchTool for InternetSearch {
    fn name(&self) -> &str {
        "internet_search"
    }

    fn description(&self) -> &str {
        "Run a web search for current pricing, service limits, and cost optimization guidance"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "max_results": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 20,
                    "description": "Maximum number of results (default: 5)",
                    "default": 5
                },
                "topic": {
                    "type": "string",
                    "enum": ["general", "news", "finance"],
                    "description": "Topic hint for the search backend (default: general)",
                    "default": "general"
                },
                "include_raw_content": {
                    "type": "boolean",
                    "description": "Include full page content in results (default: false)",
                    "default": false
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        api: &dyn SearchApi,
    ) -> SearchResult<ToolOutcome> {
        let query = args["query"]
            .as_str()
            .ok_or_else(|| SearchError::invalid("missing 'query' argument"))?;
        let max_results = match args.get("max_results") {
            None | Some(serde_json::Value::Null) => 5,
            Some(v) => {
                let n = v
                    .as_u64()
                    .ok_or_else(|| SearchError::invalid("'max_results' must be an integer"))?;
                if !(1..=20).contains(&n) {
                    return Err(SearchError::invalid(format!(
                        "'max_results' must be between 1 and 20, got {n}"
                    )));
                }
                n as usize
            }
        };
        let topic = match args["topic"].as_str() {
            Some(s) => SearchTopic::parse(s)?,
            None => SearchTopic::General,
        };
        let include_raw_content = args["include_raw_content"].as_bool().unwrap_or(false);

        let hits = api
            .search(query, max_results, topic, include_raw_content)
            .await?;

        let hit_count = hits.len();
        Ok(ToolOutcome::success(
            self.name(),
            json!({
                "query": query,
                "hit_count": hit_count,
                "hits": hits,
            }),
            format!("Found {hit_count} result(s) for '{query}'"),
        ))
    }
}
