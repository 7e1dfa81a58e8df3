//! Document standardizer.
//!
//! Rewrites a document in the structure and conventions of a standard
//! document while keeping all of its content.

use crate::documents::{document_context, prompts, require_text, strip_code_fence};
use crate::llm::LLMClient;
use crate::types::{AppError, Result};
use std::sync::Arc;

pub struct DocumentStandardizer {
    llm: Arc<dyn LLMClient>,
    language: String,
}

impl DocumentStandardizer {
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

    /// Reformat `original` to follow `standard`.
    pub async fn standardize(&self, original: &str, standard: &str) -> Result<String> {
        require_text(original, "Document to standardize")?;
        require_text(standard, "Standard document")?;

        let prompt = prompts::standardize_document_prompt(original, standard);
        let reply = self
            .llm
            .generate_with_context(&prompt, &document_context(&self.language))
            .await?;

        let document = strip_code_fence(&reply);
        if document.is_empty() {
            return Err(AppError::LLM("Model returned an empty document".to_string()));
        }
        tracing::info!(
            original_chars = original.chars().count(),
            standardized_chars = document.chars().count(),
            "Document standardized"
        );
        Ok(document.to_string())
    }
}
