//! Query Planner
//!
//! Turns a topic (plus feedback) into a short list of search queries, then
//! optionally refines them against preliminary search results. Neither step
//! can fail the pipeline: the worst case is `[topic]`.

use crate::gateway::SearchGateway;
use crate::llm::LLMClient;
use crate::research::decode::{Decode, decode_array_or};
use crate::research::prompts;
use crate::types::SearchHit;
use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;

/// Upper bound on queries taken from the first generation request.
pub const MAX_INITIAL_QUERIES: usize = 3;

/// Hits per query shown to the model during refinement.
const REFINE_HITS_PER_QUERY: usize = 2;

pub struct QueryPlanner {
    llm: Arc<dyn LLMClient>,
    search: Arc<dyn SearchGateway>,
    refine: bool,
}

impl QueryPlanner {
    pub fn new(llm: Arc<dyn LLMClient>, search: Arc<dyn SearchGateway>) -> Self {
        Self {
            llm,
            search,
            refine: true,
        }
    }

    /// Skip the search-backed refinement pass.
    pub fn without_refinement(mut self) -> Self {
        self.refine = false;
        self
    }

    /// Plan the queries for one round. Never empty.
    pub async fn plan(
        &self,
        topic: &str,
        feedback: &str,
        decomposition_nums: usize,
        context: &[String],
    ) -> Vec<String> {
        let initial = self.initial_queries(topic, feedback, context).await.into_inner();
        if !self.refine {
            return truncate(initial, decomposition_nums);
        }
        self.refine_queries(initial, decomposition_nums, context)
            .await
            .into_inner()
    }

    /// First pass: ask the model for 2-3 queries, falling back to `[topic]`.
    pub async fn initial_queries(&self, topic: &str, feedback: &str, context: &[String]) -> Decode<Vec<String>> {
        let fallback = || vec![topic.trim().to_string()];
        let prompt = prompts::search_topic_prompt(topic, feedback);

        let response = match self.llm.generate_with_context(&prompt, context).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(topic, "Query generation failed: {}", e);
                return Decode::FallbackUsed(fallback());
            }
        };

        match decode_array_or::<String, _>(&response, Vec::new) {
            Decode::Decoded(queries) => {
                let queries = truncate(clean_queries(queries), MAX_INITIAL_QUERIES);
                if queries.is_empty() {
                    tracing::warn!(topic, "Query generation returned no usable queries");
                    Decode::FallbackUsed(fallback())
                } else {
                    Decode::Decoded(queries)
                }
            }
            Decode::FallbackUsed(_) => {
                tracing::warn!(topic, "Query generation response was not a JSON array");
                Decode::FallbackUsed(fallback())
            }
        }
    }

    /// Second pass: show the model a few hits per query and let it
    /// re-prioritize. Any failure keeps `initial` (capped) verbatim.
    pub async fn refine_queries(
        &self,
        initial: Vec<String>,
        decomposition_nums: usize,
        context: &[String],
    ) -> Decode<Vec<String>> {
        let searches = initial
            .iter()
            .map(|q| self.search.search(q, REFINE_HITS_PER_QUERY));
        let searched = try_join_all(searches).await;
        let results: Vec<(String, Vec<SearchHit>)> = match searched {
            Ok(hits) => initial
                .iter()
                .cloned()
                .zip(hits.into_iter().map(|h| h.into_iter().take(REFINE_HITS_PER_QUERY).collect()))
                .collect(),
            Err(e) => {
                tracing::warn!("Query refinement skipped, preliminary search failed: {}", e);
                return Decode::FallbackUsed(truncate(initial, decomposition_nums));
            }
        };

        let prompt = prompts::summarize_search_prompt(decomposition_nums, &results);
        let response = match self.llm.generate_with_context(&prompt, context).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Query refinement failed: {}", e);
                return Decode::FallbackUsed(truncate(initial, decomposition_nums));
            }
        };

        match decode_array_or::<String, _>(&response, Vec::new) {
            Decode::Decoded(refined) => {
                let refined = truncate(clean_queries(refined), decomposition_nums);
                if refined.is_empty() {
                    tracing::warn!("Query refinement returned no usable queries");
                    Decode::FallbackUsed(truncate(initial, decomposition_nums))
                } else {
                    tracing::debug!(count = refined.len(), "Queries refined");
                    Decode::Decoded(refined)
                }
            }
            Decode::FallbackUsed(_) => {
                tracing::warn!("Query refinement response was not a JSON array");
                Decode::FallbackUsed(truncate(initial, decomposition_nums))
            }
        }
    }
}

/// Trim, drop blanks and duplicates; first occurrence wins.
fn clean_queries(queries: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    queries
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty() && seen.insert(q.to_lowercase()))
        .collect()
}

fn truncate(mut queries: Vec<String>, max: usize) -> Vec<String> {
    queries.truncate(max.max(1));
    queries
}
