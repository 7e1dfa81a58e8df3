//! Document Actions
//!
//! Single-shot writers that sit next to the research pipeline and share its
//! [`LLMClient`](crate::llm::LLMClient) gateway:
//!
//! - [`srs`](crate::documents::srs) - software requirements specification from a project outline
//! - [`usecase`](crate::documents::usecase) - PlantUML use-case diagram from a specification
//! - [`standardizer`](crate::documents::standardizer) - rewrite a document in the format of a standard one
//!
//! Unlike the research pipeline these actions surface failures as `Err`;
//! there is no partial result worth keeping.

pub mod prompts;
pub mod srs;
pub mod standardizer;
pub mod usecase;

pub use srs::{SrsSection, SrsWriter};
pub use standardizer::DocumentStandardizer;
pub use usecase::UseCaseDiagrammer;

use crate::types::{AppError, Result};

/// Context lines for a document request: persona plus language directive.
pub(crate) fn document_context(language: &str) -> Vec<String> {
    vec![
        prompts::DOCUMENT_SYSTEM.to_string(),
        format!("Please respond in {}.", language),
    ]
}

/// Reject blank input before any model call.
pub(crate) fn require_text(text: &str, what: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{} is empty", what)));
    }
    Ok(())
}

/// Remove one surrounding ``` fence (with or without a language tag).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}
