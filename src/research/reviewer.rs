//! Review Loop verdicts.
//!
//! The reviewer never fails: an unreachable model or a round that already
//! ended in a stage error produces a rejection carrying the reason.
//!
//! A [`HumanInput`] can stand in for the model, in which case the same
//! audit prompt is shown to a person and their reply is parsed the same way.

use crate::llm::LLMClient;
use crate::research::prompts;
use crate::research::report::{ResearchAggregate, ReviewVerdict};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[cfg(test)]
use mockall::automock;

const NO_CITATIONS: &str = "No citations provided";

/// A person answering review prompts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HumanInput: Send + Sync {
    /// Show `prompt` and wait for a one-line reply.
    async fn ask(&self, prompt: &str) -> Result<String>;
}

/// Asks on stdout and reads the reply from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleInput;

#[async_trait]
impl HumanInput for ConsoleInput {
    async fn ask(&self, prompt: &str) -> Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout
            .write_all(b"\nReply APPROVED or REJECTED: <feedback>\n> ")
            .await?;
        stdout.flush().await?;

        let mut line = String::new();
        let read = BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        if read == 0 {
            return Err(AppError::InvalidInput("no reply on standard input".to_string()));
        }
        Ok(line)
    }
}

pub struct ReportReviewer {
    llm: Arc<dyn LLMClient>,
    human: Option<Arc<dyn HumanInput>>,
}

impl ReportReviewer {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm, human: None }
    }

    /// Route verdicts to a person instead of the model.
    pub fn with_human(mut self, human: Arc<dyn HumanInput>) -> Self {
        self.human = Some(human);
        self
    }

    pub fn is_human(&self) -> bool {
        self.human.is_some()
    }

    /// Audit a finished round.
    pub async fn review(&self, aggregate: &ResearchAggregate, context: &[String]) -> ReviewVerdict {
        if let Some(error) = &aggregate.stage_error {
            return ReviewVerdict::rejected(format!("The previous round did not complete: {}", error));
        }

        let citations = render_citations(aggregate);
        let prompt = prompts::review_report_prompt(
            &aggregate.topic,
            &citations,
            &aggregate.content,
            aggregate.parameters.min_sources,
        );

        let reply = match &self.human {
            Some(human) => human.ask(&prompt).await,
            None => self.llm.generate_with_context(&prompt, context).await,
        };
        match reply {
            Ok(reply) => parse_verdict(&reply),
            Err(e) => {
                tracing::error!(human = self.is_human(), "Review request failed: {}", e);
                ReviewVerdict::rejected(format!("Review could not be completed: {}", e))
            }
        }
    }
}

fn render_citations(aggregate: &ResearchAggregate) -> String {
    if aggregate.sources.is_empty() {
        return NO_CITATIONS.to_string();
    }
    aggregate
        .sources
        .iter()
        .map(|url| format!("- {}", url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read `APPROVED` / `REJECTED: <feedback>`. Anything else is a rejection
/// whose feedback is the whole reply.
pub fn parse_verdict(reply: &str) -> ReviewVerdict {
    let text = reply.trim().trim_start_matches(['"', '*', '`']).trim_start();
    let upper = text.to_uppercase();

    if upper.starts_with("APPROVED") {
        return ReviewVerdict::approved();
    }
    if upper.starts_with("REJECTED") {
        let rest = text
            .get("REJECTED".len()..)
            .unwrap_or("")
            .trim_start_matches(|c: char| c == ':' || c == '*' || c.is_whitespace())
            .trim_end_matches(['"', '*', '`'])
            .trim();
        if !rest.is_empty() {
            return ReviewVerdict::rejected(rest);
        }
    }
    ReviewVerdict::rejected(reply.trim())
}
