//! Configuration utilities.

/// TOML configuration (`research.toml`).
pub mod toml_config;
