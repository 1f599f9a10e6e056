//! Mock search backend for testing — serves canned ranked hits.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::client::{SearchApi, SearchHit, SearchTopic};
use crate::error::{SearchError, SearchResult};

/// A mock search backend with pre-loaded hits and query recording.
pub struct MockSearchApi {
    hits: Vec<SearchHit>,
    queries: Mutex<Vec<String>>,
    /// Fail the next N searches with a throttling error.
    throttle_remaining: Mutex<u32>,
}

impl MockSearchApi {
    pub fn new() -> Self {
        Self {
            hits: Vec::new(),
            queries: Mutex::new(Vec::new()),
            throttle_remaining: Mutex::new(0),
        }
    }

    /// Canned pricing-research hits.
    pub fn with_pricing_hits() -> Self {
        let mut m = Self::new();
        m.hits = vec![
            SearchHit {
                title: "SageMaker Savings Plans".into(),
                url: "https://aws.amazon.com/savingsplans/ml-pricing/".into(),
                snippet: "Savings Plans for Amazon SageMaker offer up to 64% off on-demand."
                    .into(),
                score: 0.97,
                raw_content: None,
            },
            SearchHit {
                title: "S3 Intelligent-Tiering".into(),
                url: "https://aws.amazon.com/s3/storage-classes/intelligent-tiering/".into(),
                snippet: "Automatic cost savings for data with unknown access patterns.".into(),
                score: 0.88,
                raw_content: None,
            },
        ];
        m
    }

    pub fn throttle_next(&self, n: u32) {
        *self.throttle_remaining.lock().unwrap() = n;
    }

    /// Queries issued so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for MockSearchApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchApi for MockSearchApi {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        _topic: SearchTopic,
        _include_raw_content: bool,
    ) -> SearchResult<Vec<SearchHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        let mut remaining = self.throttle_remaining.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(SearchError::Throttled {
                message: "simulated rate limit".into(),
            });
        }
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_queries_and_caps_results() {
        let api = MockSearchApi::with_pricing_hits();
        let hits = api
            .search("sagemaker pricing", 1, SearchTopic::General, false)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(api.queries(), ["sagemaker pricing"]);
    }
}
