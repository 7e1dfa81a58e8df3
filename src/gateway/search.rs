//! Search gateway implementation using daedra
//!
//! daedra uses DuckDuckGo as the search backend.

use crate::types::{AppError, Result, SearchHit};
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// A remote search service.
///
/// Any fault (timeout, rate limit, malformed payload) surfaces as an `Err`;
/// callers at non-fatal stages treat it as zero results.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Run `query` and return at most `max_results` hits.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// Web search powered by daedra
#[derive(Debug, Clone, Copy, Default)]
pub struct DaedraSearch;

impl DaedraSearch {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SearchGateway for DaedraSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput("Search query is empty".to_string()));
        }

        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: max_results,
                ..Default::default()
            }),
        };

        match daedra::tools::search::perform_search(&search_args).await {
            Ok(response) => Ok(response
                .data
                .iter()
                .take(max_results)
                .map(|r| SearchHit::new(r.title.clone(), r.url.clone(), r.description.clone()))
                .collect()),
            Err(e) => Err(AppError::Search(format!("Search failed for '{}': {}", query, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_query_is_rejected_before_network() {
        let gateway = DaedraSearch::new();
        let result = gateway.search("   ", 5).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_mock_gateway_reports_faults() {
        let mut gateway = MockSearchGateway::new();
        gateway
            .expect_search()
            .returning(|q, _| Err(AppError::Search(format!("rate limited: {}", q))));

        let err = gateway.search("lithium", 3).await.unwrap_err();
        assert!(err.to_string().contains("rate limited: lithium"));
    }
}
