//! Use-case diagram generator.
//!
//! Turns a requirements specification into a PlantUML use-case script.

use crate::documents::{document_context, prompts, require_text, strip_code_fence};
use crate::llm::LLMClient;
use crate::types::{AppError, Result};
use std::sync::Arc;

const START: &str = "@startuml";
const END: &str = "@enduml";

pub struct UseCaseDiagrammer {
    llm: Arc<dyn LLMClient>,
    language: String,
}

impl UseCaseDiagrammer {
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

    /// Generate a PlantUML script for `document`, always delimited by
    /// `@startuml` / `@enduml`.
    pub async fn generate(&self, document: &str) -> Result<String> {
        require_text(document, "Requirements document")?;

        let reply = self
            .llm
            .generate_with_context(
                &prompts::use_case_diagram_prompt(document),
                &document_context(&self.language),
            )
            .await?;

        let script = normalize_plantuml(&reply)
            .ok_or_else(|| AppError::LLM("Model returned no use-case diagram".to_string()))?;
        tracing::info!(lines = script.lines().count(), "Use-case diagram generated");
        Ok(script)
    }
}

/// Strip fences and prose around the diagram and make sure it is delimited.
/// `None` when nothing is left.
pub fn normalize_plantuml(reply: &str) -> Option<String> {
    let body = strip_code_fence(reply);
    let body = match body.find(START) {
        Some(start) => &body[start + START.len()..],
        None => body,
    };
    let body = match body.rfind(END) {
        Some(end) => &body[..end],
        None => body,
    };

    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    Some(format!("{}\n{}\n{}", START, body, END))
}
