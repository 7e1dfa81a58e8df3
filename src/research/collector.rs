//! Link Collector
//!
//! For every planned query: over-fetch search hits, let the model rank them,
//! keep authoritative domains, truncate. Queries are processed concurrently
//! and independently; one query's failure only empties that query's list.

use crate::gateway::SearchGateway;
use crate::llm::LLMClient;
use crate::research::decode::{Decode, decode_array_or};
use crate::research::prompts;
use crate::research::report::LinkMap;
use crate::types::SearchHit;
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;

/// Raw hits requested per kept URL, leaving room for ranking and filtering.
pub const OVERFETCH_FACTOR: usize = 3;

/// Domain suffixes treated as authoritative when none are configured.
pub const DEFAULT_AUTHORITATIVE_DOMAINS: &[&str] = &[".gov", ".edu", ".org"];

pub struct LinkCollector {
    llm: Arc<dyn LLMClient>,
    search: Arc<dyn SearchGateway>,
    authoritative_domains: Vec<String>,
}

impl LinkCollector {
    pub fn new(llm: Arc<dyn LLMClient>, search: Arc<dyn SearchGateway>) -> Self {
        Self {
            llm,
            search,
            authoritative_domains: DEFAULT_AUTHORITATIVE_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }

    /// Replace the authoritative-domain allow-list.
    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authoritative_domains = domains.into_iter().map(|d| d.into().to_lowercase()).collect();
        self
    }

    /// Collect ranked, filtered URLs for every query.
    ///
    /// The mapping is assembled only after every query has finished, and
    /// queries that end up with no URLs have no entry. `context` is the
    /// system text sent with every ranking request.
    pub async fn collect(
        &self,
        topic: &str,
        queries: &[String],
        url_per_query: usize,
        context: &[String],
    ) -> LinkMap {
        let per_query = join_all(
            queries
                .iter()
                .map(|query| self.collect_for_query(topic, query, url_per_query, context)),
        )
        .await;

        let mut links = LinkMap::new();
        for (query, urls) in queries.iter().zip(per_query) {
            if urls.is_empty() {
                tracing::info!(query = %query, "No usable links for query");
                continue;
            }
            links.entry(query.clone()).or_insert(urls);
        }
        links
    }

    /// Search, rank, filter and truncate for a single query. Never fails.
    pub async fn collect_for_query(
        &self,
        topic: &str,
        query: &str,
        url_per_query: usize,
        context: &[String],
    ) -> Vec<String> {
        let hits = match self.search.search(query, url_per_query * OVERFETCH_FACTOR).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::error!(query, "URL collection failed: {}", e);
                return Vec::new();
            }
        };
        if hits.is_empty() {
            return Vec::new();
        }

        let order = self.rank(topic, query, &hits, context).await;
        if order.is_fallback() {
            tracing::warn!(query, "Ranking unavailable, keeping search order");
        }
        let ranked = apply_ranking(&hits, order.value());

        self.filter_by_domain(ranked)
            .into_iter()
            .take(url_per_query)
            .map(|hit| hit.link)
            .collect()
    }

    /// Ask the model for a total order over `hits`. Falls back to the
    /// identity order on any failure.
    pub async fn rank(
        &self,
        topic: &str,
        query: &str,
        hits: &[SearchHit],
        context: &[String],
    ) -> Decode<Vec<usize>> {
        let time_stamp = Utc::now().format("%Y-%m-%d").to_string();
        let prompt = prompts::rank_urls_prompt(topic, query, hits, &time_stamp);

        match self.llm.generate_with_context(&prompt, context).await {
            Ok(response) => decode_array_or(&response, || identity_order(hits.len())),
            Err(e) => {
                tracing::warn!(query, "Ranking request failed: {}", e);
                Decode::FallbackUsed(identity_order(hits.len()))
            }
        }
    }

    /// Keep hits whose link mentions an authoritative domain. Order is preserved.
    pub fn filter_by_domain(&self, hits: Vec<SearchHit>) -> Vec<SearchHit> {
        hits.into_iter()
            .filter(|hit| {
                let link = hit.link.to_lowercase();
                self.authoritative_domains.iter().any(|d| link.contains(d.as_str()))
            })
            .collect()
    }
}

/// `0..len`, the order used whenever ranking is unavailable.
pub fn identity_order(len: usize) -> Vec<usize> {
    (0..len).collect()
}

/// Reorder `hits` by `order`, skipping out-of-range and repeated indices.
pub fn apply_ranking(hits: &[SearchHit], order: &[usize]) -> Vec<SearchHit> {
    let mut seen = HashSet::new();
    order
        .iter()
        .filter(|&&i| i < hits.len() && seen.insert(i))
        .map(|&i| hits[i].clone())
        .collect()
}
