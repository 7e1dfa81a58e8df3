//! LLM Provider Clients and Abstractions
//!
//! This module provides the text-generation gateway used by every research
//! stage. Provider-specific implementations sit behind the [`LLMClient`]
//! trait, so the pipeline works with any supported LLM.
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `ollama` - Local Ollama server (default)
//! - `openai` - OpenAI API (GPT-4o, etc.) and compatible endpoints
//!
//! # Example
//!
//! ```ignore
//! use ares_research::llm::Provider;
//!
//! let client = Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "llama3.2".to_string(),
//! }
//! .create_client()
//! .await?;
//!
//! let text = client
//!     .generate_with_context("What is 2+2?", &["Answer tersely.".to_string()])
//!     .await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{LLMClient, Provider};
