//! Scripted gateway doubles.
//!
//! Each double answers through a closure and records what it was asked, so
//! tests can script multi-stage behavior and then assert on call counts.

use ares_research::gateway::{FetchGateway, SearchGateway};
use ares_research::llm::LLMClient;
use ares_research::types::{AppError, Result, SearchHit, WebPage};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

type LlmScript = dyn Fn(&str) -> Result<String> + Send + Sync;
type SearchScript = dyn Fn(&str, usize) -> Result<Vec<SearchHit>> + Send + Sync;
type FetchScript = dyn Fn(&str, usize) -> Result<WebPage> + Send + Sync;

/// Prompt families the pipeline sends, recognized by their opening words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    PlanQueries,
    RefineQueries,
    RankResults,
    Summarize,
    WriteReport,
    ContinueReport,
    Review,
    Other,
}

impl PromptKind {
    pub fn of(prompt: &str) -> Self {
        if prompt.starts_with("Generate 2-3 optimal search queries") {
            PromptKind::PlanQueries
        } else if prompt.starts_with("Analyze these search results") {
            PromptKind::RefineQueries
        } else if prompt.starts_with("You are evaluating") {
            PromptKind::RankResults
        } else if prompt.starts_with("Analyze this content regarding") {
            PromptKind::Summarize
        } else if prompt.starts_with("Based on the provided web search results") {
            PromptKind::WriteReport
        } else if prompt.starts_with("Continue to expand") {
            PromptKind::ContinueReport
        } else if prompt.starts_with("You are a strict research auditor") {
            PromptKind::Review
        } else {
            PromptKind::Other
        }
    }
}

/// The `Source: <url>` line of a summarize prompt.
pub fn source_url(prompt: &str) -> Option<&str> {
    prompt
        .lines()
        .find_map(|line| line.strip_prefix("Source: "))
        .map(str::trim)
}

/// LLM double answering through a closure.
pub struct ScriptedLLM {
    script: Box<LlmScript>,
    calls: Mutex<Vec<PromptKind>>,
}

impl ScriptedLLM {
    pub fn new<F>(script: F) -> Arc<Self>
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        Arc::new(Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Number of prompts of `kind` received so far.
    pub fn count(&self, kind: PromptKind) -> usize {
        self.calls.lock().iter().filter(|k| **k == kind).count()
    }
}

#[async_trait]
impl LLMClient for ScriptedLLM {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_context(prompt, &[]).await
    }

    async fn generate_with_context(&self, prompt: &str, _context: &[String]) -> Result<String> {
        self.calls.lock().push(PromptKind::of(prompt));
        (self.script)(prompt)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Search double answering through a closure.
pub struct ScriptedSearch {
    script: Box<SearchScript>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl ScriptedSearch {
    pub fn new<F>(script: F) -> Arc<Self>
    where
        F: Fn(&str, usize) -> Result<Vec<SearchHit>> + Send + Sync + 'static,
    {
        Arc::new(Self {
            script: Box::new(script),
            queries: Mutex::new(Vec::new()),
        })
    }

    /// A search that never finds anything.
    pub fn empty() -> Arc<Self> {
        Self::new(|_, _| Ok(Vec::new()))
    }

    /// Every `(query, max_results)` pair received, in call order.
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl SearchGateway for ScriptedSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        self.queries.lock().push((query.to_string(), max_results));
        (self.script)(query, max_results)
    }
}

/// Fetch double with per-URL attempt counting, an optional per-call delay,
/// and in-flight tracking.
pub struct ScriptedFetch {
    script: Box<FetchScript>,
    delay: Duration,
    url_delays: HashMap<String, Duration>,
    attempts: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedFetch {
    /// The closure receives the URL and its 1-based attempt number.
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&str, usize) -> Result<WebPage> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            delay: Duration::ZERO,
            url_delays: HashMap::new(),
            attempts: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Every URL returns `text`.
    pub fn serving(text: &'static str) -> Self {
        Self::new(move |url, _| Ok(WebPage::new(url, text)))
    }

    /// Sleep this long inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sleep `delay` in calls for `url` instead of the common delay.
    pub fn with_delay_for(mut self, url: &str, delay: Duration) -> Self {
        self.url_delays.insert(url.to_string(), delay);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn attempts(&self, url: &str) -> usize {
        self.attempts.lock().get(url).copied().unwrap_or(0)
    }

    pub fn total_attempts(&self) -> usize {
        self.attempts.lock().values().sum()
    }

    /// Highest number of calls observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FetchGateway for ScriptedFetch {
    async fn fetch(&self, url: &str) -> Result<WebPage> {
        let attempt = {
            let mut attempts = self.attempts.lock();
            let n = attempts.entry(url.to_string()).or_insert(0);
            *n += 1;
            *n
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = self.url_delays.get(url).copied().unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        (self.script)(url, attempt)
    }
}

/// `count` hits on authoritative domains, unique per query.
pub fn authoritative_hits(query: &str, count: usize) -> Vec<SearchHit> {
    let slug: String = query
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let suffixes = [".gov", ".edu", ".org"];
    (0..count)
        .map(|i| {
            SearchHit::new(
                format!("{} source {}", query, i),
                format!("https://site{}{}/{}", i, suffixes[i % suffixes.len()], slug),
                format!("About {}", query),
            )
        })
        .collect()
}

pub fn fetch_error(url: &str) -> AppError {
    AppError::Fetch(format!("connection reset: {}", url))
}
