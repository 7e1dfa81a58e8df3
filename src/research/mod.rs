//! Topic Research Pipeline
//!
//! Turns a topic into a cited Markdown report by driving a fixed sequence of
//! stages over a single [`ResearchAggregate`]:
//!
//! 1. **Collect links** - [`planner::QueryPlanner`] plans search queries and
//!    [`collector::LinkCollector`] ranks and filters the hits per query
//! 2. **Browse and summarize** - [`browser::FetchSummarizeEngine`] fetches
//!    every page behind a bounded admission gate and summarizes it
//! 3. **Conduct research** - [`synthesizer::ReportSynthesizer`] writes the
//!    report and appends the references
//! 4. **Review** (optional) - [`reviewer::ReportReviewer`] approves or rejects;
//!    rejection starts another round with the feedback folded in
//!
//! # Usage
//!
//! ```ignore
//! use ares_research::research::{OrchestratorSettings, ResearchOrchestrator};
//!
//! let orchestrator = ResearchOrchestrator::new(llm, search, fetcher, OrchestratorSettings::default());
//! let outcome = orchestrator.run("Battery recycling", None).await;
//!
//! println!("{}", outcome.report.content);
//! ```
//!
//! Failures never escape [`ResearchOrchestrator::run`]; a failed round comes
//! back as an aggregate whose `content` holds the failure message.

pub mod browser;
pub mod collector;
pub mod decode;
pub mod orchestrator;
pub mod planner;
pub mod prompts;
pub mod report;
pub mod reviewer;
pub mod synthesizer;
pub mod writer;

pub use browser::{BrowserConfig, FetchSummarizeEngine};
pub use collector::LinkCollector;
pub use decode::Decode;
pub use orchestrator::{OrchestratorSettings, ResearchOrchestrator, ResearchOutcome};
pub use planner::QueryPlanner;
pub use report::{FetchTask, LinkMap, ResearchAggregate, ResearchParameters, ReviewVerdict, Stage};
pub use reviewer::{ConsoleInput, HumanInput, ReportReviewer};
pub use synthesizer::{CitationStyle, ReportSynthesizer};
pub use writer::ReportWriter;
