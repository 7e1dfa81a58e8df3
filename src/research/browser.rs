//! Fetch-Summarize Engine
//!
//! Fans out one [`FetchTask`] per (query, URL) pair, fetches each page with
//! retry and a per-attempt timeout, discards blocked or empty pages, and asks
//! the model for a topic-relevant summary.
//!
//! # Concurrency
//!
//! Every task is spawned immediately, but must hold a permit from a shared
//! counting [`Semaphore`] while it fetches and summarizes. The permit is
//! released when the task resolves, whatever the outcome. Results are
//! recorded in completion order, not submission order.

use crate::gateway::FetchGateway;
use crate::llm::LLMClient;
use crate::research::prompts;
use crate::research::report::{FetchTask, LinkMap};
use crate::types::{AppError, WebPage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Pages whose text starts with one of these (case-insensitive) are discarded.
pub const BLOCKING_PHRASES: &[&str] = &[
    "access denied",
    "404 not found",
    "403 forbidden",
    "page not found",
    "this page cannot be displayed",
];

/// Configuration for the fetch-summarize engine
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Size of the admission gate (default: 5)
    pub max_concurrent_browsers: usize,

    /// Retries after the first failed fetch attempt (default: 2, so 3 attempts)
    pub max_retries: u32,

    /// Per-attempt fetch timeout (default: 15 seconds)
    pub fetch_timeout: Duration,

    /// Backoff unit; attempt `n` waits `n × unit` before retrying (default: 1 second)
    pub retry_backoff: Duration,

    /// URLs taken from each query's list (default: 4)
    pub max_urls_per_query: usize,

    /// Characters of page text sent for summarization (default: 20 000)
    pub content_char_budget: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            max_concurrent_browsers: 5,
            max_retries: 2,
            fetch_timeout: Duration::from_secs(15),
            retry_backoff: Duration::from_secs(1),
            max_urls_per_query: 4,
            content_char_budget: 20_000,
        }
    }
}

impl BrowserConfig {
    /// Set the admission gate size
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent_browsers = max;
        self
    }

    /// Set the retry count
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the per-attempt timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the linear backoff unit
    pub fn with_retry_backoff(mut self, unit: Duration) -> Self {
        self.retry_backoff = unit;
        self
    }
}

pub struct FetchSummarizeEngine {
    llm: Arc<dyn LLMClient>,
    fetcher: Arc<dyn FetchGateway>,
    config: BrowserConfig,
    gate: Arc<Semaphore>,
}

impl FetchSummarizeEngine {
    pub fn new(llm: Arc<dyn LLMClient>, fetcher: Arc<dyn FetchGateway>, config: BrowserConfig) -> Self {
        let gate = Arc::new(Semaphore::new(config.max_concurrent_browsers.max(1)));
        Self {
            llm,
            fetcher,
            config,
            gate,
        }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// One task per (query, URL), capped per query.
    pub fn build_tasks(&self, links: &LinkMap) -> Vec<FetchTask> {
        links
            .iter()
            .flat_map(|(query, urls)| {
                urls.iter()
                    .take(self.config.max_urls_per_query)
                    .map(move |url| FetchTask::new(query.clone(), url.clone()))
            })
            .collect()
    }

    /// Fetch and summarize every linked page.
    ///
    /// Waits for all tasks. Permanent failures and irrelevant pages simply
    /// contribute nothing; a short result only logs a warning.
    pub async fn summarize_all(
        &self,
        links: &LinkMap,
        context: &[String],
        min_sources: usize,
    ) -> Vec<(String, String)> {
        let tasks = self.build_tasks(links);
        let total = tasks.len();
        let context: Arc<[String]> = context.into();

        let mut set = JoinSet::new();
        for task in tasks {
            let worker = Worker {
                llm: Arc::clone(&self.llm),
                fetcher: Arc::clone(&self.fetcher),
                gate: Arc::clone(&self.gate),
                config: self.config.clone(),
                context: Arc::clone(&context),
            };
            set.spawn(async move { worker.run(task).await });
        }

        let mut summaries = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Some(summary)) => summaries.push(summary),
                Ok(None) => {}
                Err(e) => tracing::error!("Browsing task failed: {}", e),
            }
        }

        tracing::info!(tasks = total, summaries = summaries.len(), "Browse and summarize finished");
        if summaries.len() < min_sources {
            tracing::warn!(
                "Only {} valid sources found (minimum {})",
                summaries.len(),
                min_sources
            );
        }
        summaries
    }
}

/// Everything a spawned task needs, owned.
struct Worker {
    llm: Arc<dyn LLMClient>,
    fetcher: Arc<dyn FetchGateway>,
    gate: Arc<Semaphore>,
    config: BrowserConfig,
    context: Arc<[String]>,
}

impl Worker {
    async fn run(self, mut task: FetchTask) -> Option<(String, String)> {
        let _permit = match Arc::clone(&self.gate).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                tracing::error!(url = %task.url, "Browser admission gate closed");
                return None;
            }
        };

        let page = self.fetch_with_retry(&mut task).await?;
        if is_invalid_content(&page.inner_text) {
            tracing::debug!(url = %task.url, "Discarding blocked or empty page");
            return None;
        }

        let content = truncate_chars(&page.inner_text, self.config.content_char_budget);
        let prompt = prompts::browse_and_summarize_prompt(&task.query, &task.url, content);
        match self.llm.generate_with_context(&prompt, &self.context).await {
            Ok(summary) if is_null_summary(&summary) => {
                tracing::debug!(url = %task.url, "Page judged irrelevant");
                None
            }
            Ok(summary) => Some((task.url, summary.trim().to_string())),
            Err(e) => {
                tracing::error!(url = %task.url, "Content analysis failed: {}", e);
                None
            }
        }
    }

    async fn fetch_with_retry(&self, task: &mut FetchTask) -> Option<WebPage> {
        for attempt in 0..=self.config.max_retries {
            task.attempt_count += 1;
            let error = match tokio::time::timeout(self.config.fetch_timeout, self.fetcher.fetch(&task.url)).await {
                Ok(Ok(page)) => return Some(page),
                Ok(Err(e)) => e,
                Err(_) => AppError::Timeout(format!(
                    "{} after {:?}",
                    task.url, self.config.fetch_timeout
                )),
            };

            if attempt == self.config.max_retries {
                tracing::error!(
                    url = %task.url,
                    attempts = task.attempt_count,
                    "Failed to fetch: {}",
                    error
                );
                return None;
            }
            tracing::debug!(url = %task.url, attempt = task.attempt_count, "Fetch failed, retrying: {}", error);
            tokio::time::sleep(backoff_delay(self.config.retry_backoff, attempt)).await;
        }
        None
    }
}

/// Delay after the zero-based failed `attempt`: `unit × (attempt + 1)`,
/// saturating at `Duration::MAX`.
pub fn backoff_delay(unit: Duration, attempt: u32) -> Duration {
    attempt
        .checked_add(1)
        .and_then(|n| unit.checked_mul(n))
        .unwrap_or(Duration::MAX)
}

/// Empty text, or text opening with a blocking phrase.
pub fn is_invalid_content(text: &str) -> bool {
    let head = text.trim_start().to_lowercase();
    head.is_empty() || BLOCKING_PHRASES.iter().any(|p| head.starts_with(p))
}

/// The model's "not relevant" answer.
pub fn is_null_summary(summary: &str) -> bool {
    let s = summary.trim().trim_matches(|c| c == '"' || c == '\'' || c == '.');
    s.is_empty() || s.eq_ignore_ascii_case("null")
}

/// At most `budget` characters, cut on a char boundary.
pub fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
