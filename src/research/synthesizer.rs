//! Report Synthesizer
//!
//! Assembles summaries into labeled source blocks, requests the report,
//! requests at most one continuation when the draft is short, then
//! normalizes the heading and appends a deduplicated References section.

use crate::llm::LLMClient;
use crate::research::prompts::{self, CONTINUE_REPORT_PROMPT, RESEARCH_BASE_SYSTEM};
use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Fraction of `min_report_length` below which a continuation is requested.
pub const LENGTH_THRESHOLD: f64 = 0.8;

/// Prefix of the report body returned when synthesis fails.
pub const FAILURE_PREFIX: &str = "Research failed: ";

const REFERENCES_HEADING: &str = "## References";

/// How each reference line renders its URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationStyle {
    /// `Retrieved from <url>`
    #[default]
    Apa,
    /// The bare URL
    Plain,
}

impl CitationStyle {
    pub fn format(self, url: &str) -> String {
        match self {
            CitationStyle::Apa => format!("Retrieved from {}", url),
            CitationStyle::Plain => url.to_string(),
        }
    }
}

pub struct ReportSynthesizer {
    llm: Arc<dyn LLMClient>,
    citation_style: CitationStyle,
}

impl ReportSynthesizer {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self {
            llm,
            citation_style: CitationStyle::default(),
        }
    }

    pub fn with_citation_style(mut self, style: CitationStyle) -> Self {
        self.citation_style = style;
        self
    }

    /// Synthesize a report, degrading any failure to a `Research failed: …` body.
    pub async fn synthesize(
        &self,
        topic: &str,
        feedback: &str,
        summaries: &[(String, String)],
        min_report_length: usize,
        context: &[String],
    ) -> String {
        match self
            .try_synthesize(topic, feedback, summaries, min_report_length, context)
            .await
        {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Research synthesis failed: {}", e);
                format!("{}{}", FAILURE_PREFIX, e)
            }
        }
    }

    /// Synthesize a report, surfacing failures to the caller.
    pub async fn try_synthesize(
        &self,
        topic: &str,
        feedback: &str,
        summaries: &[(String, String)],
        min_report_length: usize,
        context: &[String],
    ) -> Result<String> {
        if summaries.is_empty() {
            return Err(AppError::InvalidInput(
                "No content available for research".to_string(),
            ));
        }

        let mut system = Vec::with_capacity(context.len() + 1);
        system.push(RESEARCH_BASE_SYSTEM.to_string());
        system.extend_from_slice(context);

        let sources = structure_sources(summaries);
        let prompt = prompts::conduct_research_prompt(topic, feedback, &sources);
        let draft = self.llm.generate_with_context(&prompt, &system).await?;
        let mut report = strip_references(&draft).to_string();
        if report.trim().is_empty() {
            return Err(AppError::LLM("Model returned an empty report".to_string()));
        }

        if needs_continuation(&report, min_report_length) {
            tracing::warn!(
                words = word_count(&report),
                min_report_length,
                "Report too short, requesting continuation"
            );
            let prompt = format!("{}\n\n--- Current Report ---\n{}", CONTINUE_REPORT_PROMPT, report);
            match self.llm.generate_with_context(&prompt, &system).await {
                Ok(more) => {
                    let more = strip_references(&more).trim();
                    if !more.is_empty() {
                        report.push_str("\n\n");
                        report.push_str(more);
                    }
                }
                Err(e) => tracing::warn!("Continuation request failed, keeping draft: {}", e),
            }
        }

        let body = normalize_heading(topic, &report);
        Ok(self.append_references(body, summaries))
    }

    fn append_references(&self, mut report: String, summaries: &[(String, String)]) -> String {
        let urls = distinct_urls(summaries);
        if urls.is_empty() {
            return report;
        }

        report.push_str("\n\n");
        report.push_str(REFERENCES_HEADING);
        for url in urls {
            report.push_str("\n- ");
            report.push_str(&self.citation_style.format(url));
        }
        report
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn needs_continuation(report: &str, min_report_length: usize) -> bool {
    (word_count(report) as f64) < min_report_length as f64 * LENGTH_THRESHOLD
}

/// `## Source: <url>` blocks in summary order.
pub fn structure_sources(summaries: &[(String, String)]) -> String {
    summaries
        .iter()
        .map(|(url, summary)| format!("## Source: {}\n{}", url, summary.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Summary URLs, deduplicated in order of first appearance.
pub fn distinct_urls(summaries: &[(String, String)]) -> Vec<&str> {
    let mut seen = HashSet::new();
    summaries
        .iter()
        .map(|(url, _)| url.as_str())
        .filter(|url| seen.insert(*url))
        .collect()
}

/// The failure reason carried by a body [`ReportSynthesizer::synthesize`]
/// degraded to. Successful bodies always open with an H1, so they never match.
pub fn failure_reason(body: &str) -> Option<&str> {
    body.strip_prefix(FAILURE_PREFIX)
}

/// Drop any references section the model wrote itself.
fn strip_references(report: &str) -> &str {
    let cut = report
        .match_indices(REFERENCES_HEADING)
        .find(|(idx, _)| *idx == 0 || report[..*idx].ends_with('\n'))
        .map(|(idx, _)| idx);
    match cut {
        Some(idx) => report[..idx].trim_end(),
        None => report.trim_end(),
    }
}

/// Exactly one leading H1: prepend `# topic` if missing, demote later H1s.
fn normalize_heading(topic: &str, report: &str) -> String {
    let report = report.trim_start();
    let mut lines = Vec::new();
    if !report.starts_with("# ") {
        lines.push(format!("# {}", topic.trim()));
        lines.push(String::new());
    }

    let mut seen_h1 = false;
    for line in report.lines() {
        if line.starts_with("# ") {
            if seen_h1 || !lines.is_empty() {
                lines.push(format!("#{}", line));
                continue;
            }
            seen_h1 = true;
        }
        lines.push(line.to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Replies with `draft` to the report prompt and `continuation` to the
    /// continuation prompt, recording every prompt it sees.
    struct DraftLLM {
        draft: Result<String>,
        continuation: &'static str,
        prompts: Mutex<Vec<String>>,
    }

    impl DraftLLM {
        fn new(draft: Result<String>, continuation: &'static str) -> Arc<Self> {
            Arc::new(Self {
                draft,
                continuation,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn continuations(&self) -> usize {
            self.prompts
                .lock()
                .iter()
                .filter(|p| p.starts_with(CONTINUE_REPORT_PROMPT))
                .count()
        }
    }

    #[async_trait]
    impl LLMClient for DraftLLM {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.generate_with_context(prompt, &[]).await
        }

        async fn generate_with_context(&self, prompt: &str, _context: &[String]) -> Result<String> {
            self.prompts.lock().push(prompt.to_string());
            if prompt.starts_with(CONTINUE_REPORT_PROMPT) {
                return Ok(self.continuation.to_string());
            }
            match &self.draft {
                Ok(draft) => Ok(draft.clone()),
                Err(e) => Err(AppError::LLM(e.to_string())),
            }
        }

        fn model_name(&self) -> &str {
            "draft"
        }
    }

    fn one_source() -> Vec<(String, String)> {
        vec![("https://epa.gov/batteries".to_string(), "EPA guidance".to_string())]
    }

    #[tokio::test]
    async fn test_continuation_survives_model_written_references() {
        let llm = DraftLLM::new(
            Ok("# Battery recycling\n\nShort body.\n\n## References\n- model ref".to_string()),
            "Expanded discussion of hydrometallurgical recovery.",
        );
        let synthesizer = ReportSynthesizer::new(llm.clone());

        let report = synthesizer
            .try_synthesize("Battery recycling", "", &one_source(), 100, &[])
            .await
            .unwrap();

        assert_eq!(llm.continuations(), 1);
        assert_eq!(
            report,
            "# Battery recycling\n\nShort body.\n\nExpanded discussion of hydrometallurgical recovery.\n\n\
             ## References\n- Retrieved from https://epa.gov/batteries"
        );
        assert!(!report.contains("model ref"));
        assert_eq!(report.matches(REFERENCES_HEADING).count(), 1);
    }

    #[tokio::test]
    async fn test_continuation_references_are_stripped_too() {
        let llm = DraftLLM::new(
            Ok("# Battery recycling\n\nShort body.".to_string()),
            "More detail.\n\n## References\n- another model ref",
        );
        let synthesizer = ReportSynthesizer::new(llm.clone()).with_citation_style(CitationStyle::Plain);

        let report = synthesizer
            .try_synthesize("Battery recycling", "", &one_source(), 100, &[])
            .await
            .unwrap();

        assert!(report.contains("Short body.\n\nMore detail.\n\n## References\n- https://epa.gov/batteries"));
        assert!(!report.contains("another model ref"));
    }

    #[tokio::test]
    async fn test_long_draft_gets_no_continuation() {
        let draft = format!("# Battery recycling\n\n{}", "cobalt ".repeat(90));
        let llm = DraftLLM::new(Ok(draft), "unused");
        let synthesizer = ReportSynthesizer::new(llm.clone());

        synthesizer
            .try_synthesize("Battery recycling", "", &one_source(), 100, &[])
            .await
            .unwrap();

        assert_eq!(llm.continuations(), 0);
    }

    #[tokio::test]
    async fn test_synthesize_degrades_failures_to_report_body() {
        let llm = DraftLLM::new(Err(AppError::LLM("context length exceeded".to_string())), "unused");
        let synthesizer = ReportSynthesizer::new(llm);

        let body = synthesizer
            .synthesize("Battery recycling", "", &one_source(), 100, &[])
            .await;

        assert!(body.starts_with(FAILURE_PREFIX));
        assert!(failure_reason(&body).is_some_and(|reason| reason.contains("context length exceeded")));
    }

    #[tokio::test]
    async fn test_synthesize_without_summaries_fails_without_calling_the_model() {
        let llm = DraftLLM::new(Ok("# Unused".to_string()), "unused");
        let synthesizer = ReportSynthesizer::new(llm.clone());

        let body = synthesizer.synthesize("Battery recycling", "", &[], 100, &[]).await;

        assert!(failure_reason(&body).is_some());
        assert!(llm.prompts.lock().is_empty());
    }

    #[test]
    fn test_successful_body_has_no_failure_reason() {
        assert_eq!(failure_reason("# Research failed: a history"), None);
    }

    #[test]
    fn test_citation_styles() {
        assert_eq!(CitationStyle::Apa.format("https://epa.gov"), "Retrieved from https://epa.gov");
        assert_eq!(CitationStyle::Plain.format("https://epa.gov"), "https://epa.gov");
    }

    #[test]
    fn test_needs_continuation_threshold() {
        let words = vec!["word"; 79].join(" ");
        assert!(needs_continuation(&words, 100));

        let words = vec!["word"; 80].join(" ");
        assert!(!needs_continuation(&words, 100));
    }

    #[test]
    fn test_structure_sources_labels_each_block() {
        let summaries = vec![
            ("https://a.gov".to_string(), "Alpha ".to_string()),
            ("https://b.edu".to_string(), "Beta".to_string()),
        ];
        assert_eq!(
            structure_sources(&summaries),
            "## Source: https://a.gov\nAlpha\n\n## Source: https://b.edu\nBeta"
        );
    }

    #[test]
    fn test_distinct_urls_preserves_first_appearance() {
        let summaries = vec![
            ("https://b.edu".to_string(), "1".to_string()),
            ("https://a.gov".to_string(), "2".to_string()),
            ("https://b.edu".to_string(), "3".to_string()),
        ];
        assert_eq!(distinct_urls(&summaries), vec!["https://b.edu", "https://a.gov"]);
    }

    #[test]
    fn test_normalize_heading_prepends_topic() {
        let out = normalize_heading("Battery recycling", "## Intro\nText");
        assert_eq!(out, "# Battery recycling\n\n## Intro\nText");
    }

    #[test]
    fn test_normalize_heading_keeps_first_h1_and_demotes_others() {
        let out = normalize_heading("t", "# Report\nBody\n# Appendix");
        assert_eq!(out, "# Report\nBody\n## Appendix");
    }

    #[test]
    fn test_strip_references_removes_model_written_section() {
        let report = "# R\nBody\n\n## References\n- a\n- b";
        assert_eq!(strip_references(report), "# R\nBody");
        assert_eq!(strip_references("# R\nSee ## References inline"), "# R\nSee ## References inline");
    }
}
