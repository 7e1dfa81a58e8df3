//! # ares-research - Automated Topic Research
//!
//! A multi-stage research pipeline built in Rust: it plans search queries for
//! a topic, ranks and filters authoritative sources, fetches and summarizes
//! pages under a bounded concurrency gate, and synthesizes a cited Markdown
//! report, optionally reviewed and iterated.
//!
//! ## Overview
//!
//! ares-research can be used in two ways:
//!
//! 1. **As a command-line tool** - Run the `ares-research` binary
//! 2. **As a library** - Embed the pipeline into your own Rust project
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use ares_research::gateway::{DaedraFetch, DaedraSearch};
//! use ares_research::research::{OrchestratorSettings, ResearchOrchestrator};
//! use ares_research::Provider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = Provider::Ollama {
//!         base_url: "http://localhost:11434".to_string(),
//!         model: "qwen3:8b".to_string(),
//!     };
//!     let llm = Arc::from(provider.create_client().await?);
//!
//!     let orchestrator = ResearchOrchestrator::new(
//!         llm,
//!         Arc::new(DaedraSearch::new()),
//!         Arc::new(DaedraFetch::new()),
//!         OrchestratorSettings::default(),
//!     );
//!
//!     let outcome = orchestrator.run("Battery recycling", None).await;
//!     println!("{}", outcome.report.content);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI API and compatible endpoints |
//! | `all-llm` | Both providers |
//!
//! ## Modules
//!
//! - [`research`] - Pipeline stages, aggregate and orchestrator
//! - [`documents`] - SRS writer, use-case diagrams and document standardization
//! - [`llm`] - LLM client implementations
//! - [`gateway`] - Search and page-fetch gateways
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration
//! - [`cli`] - Command-line parsing and output

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Command-line parsing, output helpers and `init` scaffolding.
pub mod cli;
/// Requirements, use-case and standardization writers.
pub mod documents;
/// Search and page-fetch gateways.
pub mod gateway;
/// LLM provider clients and abstractions.
pub mod llm;
/// The topic research pipeline.
pub mod research;
/// Core types and errors.
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use documents::{DocumentStandardizer, SrsWriter, UseCaseDiagrammer};
pub use gateway::{FetchGateway, SearchGateway};
pub use llm::{LLMClient, Provider};
pub use research::{
    OrchestratorSettings, ReportWriter, ResearchAggregate, ResearchOrchestrator, ResearchOutcome,
};
pub use types::{AppError, Result};
pub use utils::toml_config::{ConfigError, ResearchConfig};
