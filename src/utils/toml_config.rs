//! TOML-based configuration for ares-research
//!
//! Every section of `research.toml` is optional and falls back to defaults,
//! so an empty file is a valid configuration. Secrets are never stored in
//! the file; the OpenAI provider names the environment variable that holds
//! its API key.

use crate::llm::Provider;
use crate::research::browser::BrowserConfig;
use crate::research::collector::DEFAULT_AUTHORITATIVE_DOMAINS;
use crate::research::orchestrator::OrchestratorSettings;
use crate::research::report::ResearchParameters;
use crate::research::synthesizer::CitationStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure loaded from research.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub research: ResearchSettings,

    #[serde(default)]
    pub browser: BrowserSettings,

    #[serde(default)]
    pub output: OutputSettings,
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LlmConfig {
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        #[serde(default = "default_ollama_model")]
        model: String,
    },
    OpenAI {
        /// Environment variable containing API key
        #[serde(default = "default_openai_key_env")]
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        #[serde(default = "default_openai_model")]
        model: String,
    },
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "qwen3:8b".to_string()
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig::Ollama {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
        }
    }
}

impl LlmConfig {
    /// Resolve into a runtime [`Provider`], reading any API key from the environment.
    pub fn provider(&self) -> Result<Provider, ConfigError> {
        match self {
            LlmConfig::Ollama { base_url, model } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
            }),
            LlmConfig::OpenAI {
                api_key_env,
                api_base,
                model,
            } => Ok(Provider::OpenAI {
                api_key: resolve_env(api_key_env)?,
                api_base: api_base.clone(),
                model: model.clone(),
            }),
        }
    }

    pub fn model(&self) -> &str {
        match self {
            LlmConfig::Ollama { model, .. } | LlmConfig::OpenAI { model, .. } => model,
        }
    }
}

// ============= Research Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchSettings {
    #[serde(flatten)]
    pub parameters: ResearchParameters,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    /// Run the review stage and iterate on rejection
    #[serde(default)]
    pub review: bool,

    /// Ask a person on the terminal for review verdicts (implies review)
    #[serde(default)]
    pub human_review: bool,

    #[serde(default)]
    pub citation_style: CitationStyle,

    #[serde(default = "default_authoritative_domains")]
    pub authoritative_domains: Vec<String>,

    /// Refine planned queries against preliminary search results
    #[serde(default = "default_true")]
    pub refine_queries: bool,
}

fn default_language() -> String {
    "en-us".to_string()
}

fn default_max_rounds() -> usize {
    2
}

fn default_authoritative_domains() -> Vec<String> {
    DEFAULT_AUTHORITATIVE_DOMAINS.iter().map(|d| d.to_string()).collect()
}

fn default_true() -> bool {
    true
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            parameters: ResearchParameters::default(),
            language: default_language(),
            max_rounds: default_max_rounds(),
            review: false,
            human_review: false,
            citation_style: CitationStyle::default(),
            authoritative_domains: default_authoritative_domains(),
            refine_queries: true,
        }
    }
}

// ============= Browser Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    #[serde(default = "default_max_concurrent_browsers")]
    pub max_concurrent_browsers: usize,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_max_urls_per_query")]
    pub max_urls_per_query: usize,

    #[serde(default = "default_content_char_budget")]
    pub content_char_budget: usize,
}

fn default_max_concurrent_browsers() -> usize {
    5
}

/// Upper bound accepted for `browser.max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Upper bound accepted for `browser.retry_backoff_ms` (one minute).
pub const MAX_RETRY_BACKOFF_MS: u64 = 60_000;

fn default_max_retries() -> u32 {
    2
}

fn default_fetch_timeout_secs() -> u64 {
    15
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_max_urls_per_query() -> usize {
    4
}

fn default_content_char_budget() -> usize {
    20_000
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            max_concurrent_browsers: default_max_concurrent_browsers(),
            max_retries: default_max_retries(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_urls_per_query: default_max_urls_per_query(),
            content_char_budget: default_content_char_budget(),
        }
    }
}

impl From<&BrowserSettings> for BrowserConfig {
    fn from(settings: &BrowserSettings) -> Self {
        BrowserConfig {
            max_concurrent_browsers: settings.max_concurrent_browsers,
            max_retries: settings.max_retries,
            fetch_timeout: Duration::from_secs(settings.fetch_timeout_secs),
            retry_backoff: Duration::from_millis(settings.retry_backoff_ms),
            max_urls_per_query: settings.max_urls_per_query,
            content_char_budget: settings.content_char_budget,
        }
    }
}

// ============= Output Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./data/research")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl ResearchConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without validating it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// [`from_file`](Self::from_file), falling back to defaults when `path`
    /// does not exist. Like `from_file`, this does not validate.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::from_file(path.as_ref()) {
            Err(ConfigError::FileNotFound(_)) => {
                tracing::info!(path = %path.as_ref().display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Check value ranges and that referenced environment variables are set
    pub fn validate(&self) -> Result<(), ConfigError> {
        let params = &self.research.parameters;
        if params.decomposition_nums == 0 {
            return Err(ConfigError::ValidationError(
                "research.decomposition_nums must be at least 1".to_string(),
            ));
        }
        if params.url_per_query == 0 {
            return Err(ConfigError::ValidationError(
                "research.url_per_query must be at least 1".to_string(),
            ));
        }
        if self.research.max_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "research.max_rounds must be at least 1".to_string(),
            ));
        }
        if self
            .research
            .authoritative_domains
            .iter()
            .all(|d| d.trim().is_empty())
        {
            return Err(ConfigError::ValidationError(
                "research.authoritative_domains must list at least one domain".to_string(),
            ));
        }
        if self.browser.max_concurrent_browsers == 0 {
            return Err(ConfigError::ValidationError(
                "browser.max_concurrent_browsers must be at least 1".to_string(),
            ));
        }
        if self.browser.max_urls_per_query == 0 {
            return Err(ConfigError::ValidationError(
                "browser.max_urls_per_query must be at least 1".to_string(),
            ));
        }
        if self.browser.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "browser.max_retries must be at most {}",
                MAX_RETRIES_LIMIT
            )));
        }
        if self.browser.retry_backoff_ms > MAX_RETRY_BACKOFF_MS {
            return Err(ConfigError::ValidationError(format!(
                "browser.retry_backoff_ms must be at most {}",
                MAX_RETRY_BACKOFF_MS
            )));
        }

        if let LlmConfig::OpenAI { api_key_env, .. } = &self.llm {
            resolve_env(api_key_env)?;
        }
        Ok(())
    }

    /// Settings for the orchestrator, with this file's values applied
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            parameters: self.research.parameters,
            language: self.research.language.clone(),
            max_rounds: self.research.max_rounds,
            review: self.research.review || self.research.human_review,
            citation_style: self.research.citation_style,
            authoritative_domains: self
                .research
                .authoritative_domains
                .iter()
                .filter(|d| !d.trim().is_empty())
                .cloned()
                .collect(),
            browser: BrowserConfig::from(&self.browser),
            refine_queries: self.research.refine_queries,
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn resolve_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}
