//! Internet search for the ML cost analysis agent.
//!
//! Wraps the Tavily search API behind a `SearchApi` trait (with a mock
//! for tests) and exposes a single `internet_search` tool that returns
//! ranked snippets.

pub mod client;
pub mod error;
pub mod mock;
pub mod tools;

// Re-export key types for convenience
pub use client::{SearchApi, SearchHit, SearchTopic, TavilyClient};
pub use error::{SearchError, SearchResult};
pub use mock::MockSearchApi;
pub use tools::{InternetSearch, SearchTool};
