//! Software requirements specification writer.
//!
//! Generates the chapters of an SRS one request at a time from a project
//! outline and stitches them together in chapter order.

use crate::documents::{document_context, prompts, require_text, strip_code_fence};
use crate::llm::LLMClient;
use crate::types::{AppError, Result};
use std::sync::Arc;

/// SRS chapters, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrsSection {
    Introduction,
    OverallDescription,
    FunctionalRequirements,
    NonFunctionalRequirements,
    ExternalInterfaces,
}

impl SrsSection {
    pub const ALL: [SrsSection; 5] = [
        SrsSection::Introduction,
        SrsSection::OverallDescription,
        SrsSection::FunctionalRequirements,
        SrsSection::NonFunctionalRequirements,
        SrsSection::ExternalInterfaces,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SrsSection::Introduction => "Introduction",
            SrsSection::OverallDescription => "Overall Description",
            SrsSection::FunctionalRequirements => "Functional Requirements",
            SrsSection::NonFunctionalRequirements => "Non-functional Requirements",
            SrsSection::ExternalInterfaces => "External Interface Requirements",
        }
    }

    pub fn prompt(self, outline: &str) -> String {
        match self {
            SrsSection::Introduction => prompts::srs_introduction_prompt(outline),
            SrsSection::OverallDescription => prompts::srs_overall_description_prompt(outline),
            SrsSection::FunctionalRequirements => prompts::srs_functional_requirements_prompt(outline),
            SrsSection::NonFunctionalRequirements => prompts::srs_non_functional_requirements_prompt(outline),
            SrsSection::ExternalInterfaces => prompts::srs_interfaces_prompt(outline),
        }
    }
}

pub struct SrsWriter {
    llm: Arc<dyn LLMClient>,
    language: String,
}

impl SrsWriter {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self {
            llm,
            language: "en-us".to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Write every chapter for `outline`. Fails on the first chapter the
    /// model cannot produce.
    pub async fn write(&self, outline: &str) -> Result<String> {
        require_text(outline, "Project outline")?;
        let context = document_context(&self.language);

        let mut chapters = Vec::with_capacity(SrsSection::ALL.len());
        for section in SrsSection::ALL {
            tracing::info!(section = section.title(), "Writing SRS chapter");
            let reply = self
                .llm
                .generate_with_context(&section.prompt(outline), &context)
                .await
                .map_err(|e| AppError::LLM(format!("{} chapter failed: {}", section.title(), e)))?;

            let chapter = strip_code_fence(&reply);
            if chapter.is_empty() {
                return Err(AppError::LLM(format!(
                    "Model returned an empty {} chapter",
                    section.title()
                )));
            }
            chapters.push(chapter.to_string());
        }
        Ok(chapters.join("\n\n"))
    }
}
