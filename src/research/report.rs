//! The research aggregate and the small value types that travel with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

/// Query text mapped to the ordered URLs kept for it.
pub type LinkMap = BTreeMap<String, Vec<String>>;

/// Tunable knobs carried by every aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchParameters {
    /// Target number of refined search queries
    #[serde(default = "default_decomposition_nums")]
    pub decomposition_nums: usize,

    /// URLs kept per query after ranking and filtering
    #[serde(default = "default_url_per_query")]
    pub url_per_query: usize,

    /// Summaries below this count log a warning
    #[serde(default = "default_min_sources")]
    pub min_sources: usize,

    /// Word-count floor for the synthesized report
    #[serde(default = "default_min_report_length")]
    pub min_report_length: usize,
}

fn default_decomposition_nums() -> usize {
    3
}

fn default_url_per_query() -> usize {
    3
}

fn default_min_sources() -> usize {
    3
}

fn default_min_report_length() -> usize {
    5000
}

impl Default for ResearchParameters {
    fn default() -> Self {
        Self {
            decomposition_nums: default_decomposition_nums(),
            url_per_query: default_url_per_query(),
            min_sources: default_min_sources(),
            min_report_length: default_min_report_length(),
        }
    }
}

/// The single mutable record threaded through one research round.
///
/// Owned by the orchestrator. Stages return their results and the
/// orchestrator writes them into the designated field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchAggregate {
    pub id: Uuid,
    pub topic: String,
    pub feedback: Option<String>,
    pub links: LinkMap,
    pub summaries: Vec<(String, String)>,
    pub sources: BTreeSet<String>,
    pub content: String,
    pub parameters: ResearchParameters,
    pub generated_at: Option<DateTime<Utc>>,
    pub stage_error: Option<String>,
}

impl ResearchAggregate {
    pub fn new(topic: impl Into<String>, feedback: Option<String>, parameters: ResearchParameters) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            feedback: feedback.filter(|f| !f.trim().is_empty()),
            links: LinkMap::new(),
            summaries: Vec::new(),
            sources: BTreeSet::new(),
            content: String::new(),
            parameters,
            generated_at: None,
            stage_error: None,
        }
    }

    /// Feedback text, empty when none was given.
    pub fn feedback_text(&self) -> &str {
        self.feedback.as_deref().unwrap_or("")
    }

    /// Replace summaries and re-derive `sources` from them.
    pub fn set_summaries(&mut self, summaries: Vec<(String, String)>) {
        self.sources = summaries.iter().map(|(url, _)| url.clone()).collect();
        self.summaries = summaries;
    }

    /// Record a fatal stage failure; `content` carries the readable message.
    pub fn fail(&mut self, stage: Stage, reason: impl fmt::Display) {
        let message = format!("Research failed at {} stage: {}", stage, reason);
        self.stage_error = Some(message.clone());
        self.content = message;
    }

    pub fn is_failed(&self) -> bool {
        self.stage_error.is_some()
    }

    pub fn link_count(&self) -> usize {
        self.links.values().map(Vec::len).sum()
    }
}

/// One pipeline stage. Rounds always start at [`Stage::CollectLinks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CollectLinks,
    BrowseAndSummarize,
    ConductResearch,
    Review,
}

impl Stage {
    pub const INITIAL: Stage = Stage::CollectLinks;

    /// Stage that follows `self`, or `None` when `self` is terminal.
    pub fn next(self, iterative: bool) -> Option<Stage> {
        match self {
            Stage::CollectLinks => Some(Stage::BrowseAndSummarize),
            Stage::BrowseAndSummarize => Some(Stage::ConductResearch),
            Stage::ConductResearch if iterative => Some(Stage::Review),
            Stage::ConductResearch | Stage::Review => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::CollectLinks => "CollectLinks",
            Stage::BrowseAndSummarize => "WebBrowseAndSummarize",
            Stage::ConductResearch => "ConductResearch",
            Stage::Review => "ReviewResearchReport",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ephemeral unit of work for the fetch-summarize engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTask {
    pub query: String,
    pub url: String,
    pub attempt_count: u32,
}

impl FetchTask {
    pub fn new(query: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            url: url.into(),
            attempt_count: 0,
        }
    }
}

/// Reviewer decision on a finished round. Never stored in the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewVerdict {
    pub approved: bool,
    pub feedback: String,
}

impl ReviewVerdict {
    pub fn approved() -> Self {
        Self {
            approved: true,
            feedback: String::new(),
        }
    }

    pub fn rejected(feedback: impl Into<String>) -> Self {
        Self {
            approved: false,
            feedback: feedback.into(),
        }
    }
}
