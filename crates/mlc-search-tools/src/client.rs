//! Tavily HTTP client and the SearchApi abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{SearchError, SearchResult};

/// Search topic hint accepted by the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTopic {
    #[default]
    General,
    News,
    Finance,
}

impl SearchTopic {
    pub fn parse(s: &str) -> SearchResult<Self> {
        match s {
            "general" => Ok(Self::General),
            "news" => Ok(Self::News),
            "finance" => Ok(Self::Finance),
            other => Err(SearchError::invalid(format!(
                "unknown topic '{other}' (expected general, news, or finance)"
            ))),
        }
    }
}

/// One ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// Snippet of the page content.
    pub snippet: String,
    /// Relevance score from the search API (higher is better).
    pub score: f64,
    /// Full page content, present only when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

/// Abstraction over the internet search backend.
#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        topic: SearchTopic,
        include_raw_content: bool,
    ) -> SearchResult<Vec<SearchHit>>;
}

// ── Tavily wire types ─────────────────────────────────────────

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    topic: SearchTopic,
    include_raw_content: bool,
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: f64,
    raw_content: Option<String>,
}

/// Client for the Tavily search API.
pub struct TavilyClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>) -> SearchResult<Self> {
        Self::with_base_url(api_key, "https://api.tavily.com")
    }

    /// Point the client at a different endpoint (tests use a mock server).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> SearchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SearchError::Api {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl SearchApi for TavilyClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        topic: SearchTopic,
        include_raw_content: bool,
    ) -> SearchResult<Vec<SearchHit>> {
        let url = format!("{}/search", self.base_url);
        let body = TavilyRequest {
            api_key: &self.api_key,
            query,
            max_results,
            topic,
            include_raw_content,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else {
                    SearchError::Api {
                        message: format!("search request failed: {e}"),
                    }
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SearchError::Auth {
                message: format!("search API returned {status}"),
            });
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::Throttled {
                message: "search API rate limit exceeded".into(),
            });
        }
        if !status.is_success() {
            return Err(SearchError::Api {
                message: format!("search API returned {status}"),
            });
        }

        let parsed: TavilyResponse = response.json().await.map_err(|e| SearchError::Api {
            message: format!("failed to parse search response: {e}"),
        })?;

        let hit_count = parsed.results.len();
        tracing::debug!(hit_count, query, "search completed");
        Ok(parsed
            .results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                snippet: r.content,
                score: r.score,
                raw_content: r.raw_content,
            })
            .collect())
    }
}
