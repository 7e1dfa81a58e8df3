//! Pipeline Orchestrator
//!
//! Owns the [`ResearchAggregate`] for each round and drives it through the
//! [`Stage`] sequence. Stages hand their results back; only the orchestrator
//! writes them into the aggregate. A run never returns an error: failures
//! surface as a completed aggregate whose `content` carries the message.

use crate::gateway::{FetchGateway, SearchGateway};
use crate::llm::LLMClient;
use crate::research::browser::{BrowserConfig, FetchSummarizeEngine};
use crate::research::collector::{LinkCollector, DEFAULT_AUTHORITATIVE_DOMAINS};
use crate::research::planner::QueryPlanner;
use crate::research::prompts::{self, SUPPORTED_LANGUAGES};
use crate::research::report::{ResearchAggregate, ResearchParameters, ReviewVerdict, Stage};
use crate::research::reviewer::{HumanInput, ReportReviewer};
use crate::research::synthesizer::{failure_reason, word_count, CitationStyle, ReportSynthesizer};
use chrono::Utc;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Everything that shapes a run apart from the gateways.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub parameters: ResearchParameters,
    /// Language directive appended to every system text
    pub language: String,
    /// Upper bound on rounds in review mode
    pub max_rounds: usize,
    /// Run the review stage and iterate on rejection
    pub review: bool,
    pub citation_style: CitationStyle,
    pub authoritative_domains: Vec<String>,
    pub browser: BrowserConfig,
    /// Refine planned queries against preliminary search results
    pub refine_queries: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            parameters: ResearchParameters::default(),
            language: "en-us".to_string(),
            max_rounds: 2,
            review: false,
            citation_style: CitationStyle::default(),
            authoritative_domains: DEFAULT_AUTHORITATIVE_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            browser: BrowserConfig::default(),
            refine_queries: true,
        }
    }
}

/// What a run hands back to its caller.
#[derive(Debug, Clone)]
pub struct ResearchOutcome {
    /// Aggregate of the last round that ran
    pub report: ResearchAggregate,
    /// `None` when review was disabled
    pub approved: Option<bool>,
    pub rounds: usize,
}

impl ResearchOutcome {
    pub fn is_failed(&self) -> bool {
        self.report.is_failed()
    }
}

/// Result of running one stage handler.
#[derive(Debug)]
enum Transition {
    Next(Stage),
    Finished,
    Halted,
    Reviewed(ReviewVerdict),
}

pub struct ResearchOrchestrator {
    planner: QueryPlanner,
    collector: LinkCollector,
    engine: FetchSummarizeEngine,
    synthesizer: ReportSynthesizer,
    reviewer: ReportReviewer,
    settings: OrchestratorSettings,
}

impl ResearchOrchestrator {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        search: Arc<dyn SearchGateway>,
        fetcher: Arc<dyn FetchGateway>,
        settings: OrchestratorSettings,
    ) -> Self {
        let language = settings.language.to_lowercase();
        if !SUPPORTED_LANGUAGES.contains(&language.as_str()) {
            tracing::warn!(
                language = %settings.language,
                "Language is not one of {:?}; prompts will still request it",
                SUPPORTED_LANGUAGES
            );
        }

        let planner = QueryPlanner::new(Arc::clone(&llm), Arc::clone(&search));
        let planner = if settings.refine_queries {
            planner
        } else {
            planner.without_refinement()
        };

        Self {
            planner,
            collector: LinkCollector::new(Arc::clone(&llm), search)
                .with_domains(settings.authoritative_domains.iter().cloned()),
            engine: FetchSummarizeEngine::new(Arc::clone(&llm), fetcher, settings.browser.clone()),
            synthesizer: ReportSynthesizer::new(Arc::clone(&llm))
                .with_citation_style(settings.citation_style),
            reviewer: ReportReviewer::new(llm),
            settings,
        }
    }

    /// Send review prompts to a person instead of the model. Turns review on.
    pub fn with_human_reviewer(mut self, human: Arc<dyn HumanInput>) -> Self {
        self.reviewer = self.reviewer.with_human(human);
        self.settings.review = true;
        self
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Run rounds until the report is approved, the round bound is reached,
    /// or a round halts on a stage error. Single-pass mode runs one round.
    pub async fn run(&self, topic: &str, feedback: Option<String>) -> ResearchOutcome {
        let span = tracing::info_span!("research_run", run_id = %Uuid::new_v4(), topic);
        self.run_rounds(topic, feedback).instrument(span).await
    }

    async fn run_rounds(&self, topic: &str, feedback: Option<String>) -> ResearchOutcome {
        let review = self.settings.review;
        let max_rounds = if review { self.settings.max_rounds.max(1) } else { 1 };
        let mut feedback = feedback.filter(|f| !f.trim().is_empty());
        let mut round = 0;

        loop {
            round += 1;
            tracing::info!(round, max_rounds, "Starting research round");
            let (report, verdict) = self.run_round(topic, feedback.clone()).await;

            if report.is_failed() {
                tracing::error!(round, "Round halted: {}", report.content);
                return ResearchOutcome {
                    report,
                    approved: review.then_some(false),
                    rounds: round,
                };
            }

            let verdict = match verdict {
                None => {
                    return ResearchOutcome {
                        report,
                        approved: None,
                        rounds: round,
                    }
                }
                Some(verdict) => verdict,
            };

            if verdict.approved {
                tracing::info!(round, "Report approved");
                return ResearchOutcome {
                    report,
                    approved: Some(true),
                    rounds: round,
                };
            }

            if round >= max_rounds {
                tracing::warn!(round, "Round limit reached without approval");
                return ResearchOutcome {
                    report,
                    approved: Some(false),
                    rounds: round,
                };
            }

            tracing::info!(round, feedback = %verdict.feedback, "Report rejected, iterating");
            feedback = accumulate_feedback(feedback, &verdict.feedback);
        }
    }

    /// One pass through the stage sequence on a fresh aggregate.
    pub async fn run_round(
        &self,
        topic: &str,
        feedback: Option<String>,
    ) -> (ResearchAggregate, Option<ReviewVerdict>) {
        let mut aggregate = ResearchAggregate::new(topic.trim(), feedback, self.settings.parameters);
        if aggregate.topic.is_empty() {
            aggregate.fail(Stage::INITIAL, "topic must not be empty");
            return (aggregate, None);
        }

        let system = prompts::research_system_text(
            &aggregate.topic,
            aggregate.feedback_text(),
            &self.settings.language,
        );

        let mut stage = Stage::INITIAL;
        loop {
            tracing::info!(stage = %stage, report_id = %aggregate.id, "Entering stage");
            match self.run_stage(stage, &mut aggregate, &system).await {
                Transition::Next(next) => stage = next,
                Transition::Finished | Transition::Halted => return (aggregate, None),
                Transition::Reviewed(verdict) => return (aggregate, Some(verdict)),
            }
        }
    }

    /// Stage dispatch table.
    async fn run_stage(&self, stage: Stage, aggregate: &mut ResearchAggregate, system: &str) -> Transition {
        match stage {
            Stage::CollectLinks => self.collect_links(aggregate, system).await,
            Stage::BrowseAndSummarize => self.browse_and_summarize(aggregate, system).await,
            Stage::ConductResearch => self.conduct_research(aggregate, system).await,
            Stage::Review => self.review(aggregate, system).await,
        }
    }

    fn advance(&self, stage: Stage) -> Transition {
        match stage.next(self.settings.review) {
            Some(next) => Transition::Next(next),
            None => Transition::Finished,
        }
    }

    async fn collect_links(&self, aggregate: &mut ResearchAggregate, system: &str) -> Transition {
        let context = [prompts::collect_links_system_text(system)];
        let params = aggregate.parameters;

        let queries = self
            .planner
            .plan(&aggregate.topic, aggregate.feedback_text(), params.decomposition_nums, &context)
            .await;
        tracing::info!(queries = ?queries, "Queries planned");

        let links = self
            .collector
            .collect(&aggregate.topic, &queries, params.url_per_query, &context)
            .await;
        aggregate.links = links;
        tracing::info!(
            queries = aggregate.links.len(),
            urls = aggregate.link_count(),
            "Links collected"
        );

        self.advance(Stage::CollectLinks)
    }

    async fn browse_and_summarize(&self, aggregate: &mut ResearchAggregate, system: &str) -> Transition {
        let context = [prompts::browse_system_text(system)];
        let summaries = self
            .engine
            .summarize_all(&aggregate.links, &context, aggregate.parameters.min_sources)
            .await;

        if summaries.is_empty() {
            let reason = if aggregate.links.is_empty() {
                "no links were collected"
            } else {
                "no page produced a relevant summary"
            };
            aggregate.fail(Stage::BrowseAndSummarize, reason);
            return Transition::Halted;
        }

        aggregate.set_summaries(summaries);
        self.advance(Stage::BrowseAndSummarize)
    }

    async fn conduct_research(&self, aggregate: &mut ResearchAggregate, system: &str) -> Transition {
        if aggregate.summaries.is_empty() {
            aggregate.fail(Stage::ConductResearch, "no content available for research");
            return Transition::Halted;
        }

        let context = [system.to_string()];
        let body = self
            .synthesizer
            .synthesize(
                &aggregate.topic,
                aggregate.feedback_text(),
                &aggregate.summaries,
                aggregate.parameters.min_report_length,
                &context,
            )
            .await;

        if let Some(reason) = failure_reason(&body) {
            aggregate.stage_error = Some(reason.to_string());
            aggregate.content = body;
            return Transition::Halted;
        }

        aggregate.content = body;
        aggregate.generated_at = Some(Utc::now());
        tracing::info!(
            sources = aggregate.sources.len(),
            words = word_count(&aggregate.content),
            "Report synthesized"
        );
        self.advance(Stage::ConductResearch)
    }

    async fn review(&self, aggregate: &mut ResearchAggregate, system: &str) -> Transition {
        let context = [system.to_string()];
        Transition::Reviewed(self.reviewer.review(aggregate, &context).await)
    }
}

/// Append `new` to the running feedback, one item per line.
pub fn accumulate_feedback(previous: Option<String>, new: &str) -> Option<String> {
    let new = new.trim();
    if new.is_empty() {
        return previous;
    }
    match previous {
        Some(prev) => Some(format!("{}\n{}", prev, new)),
        None => Some(new.to_string()),
    }
}
