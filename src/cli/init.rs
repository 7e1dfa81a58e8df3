//! Init command implementation
//!
//! Writes a starter `research.toml`, an `.env.example` and the report
//! output directory.

use super::output::Output;
use super::ProviderKind;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// research.toml already exists
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// LLM provider to configure
    pub provider: ProviderKind,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing research workspace");

    let base_path = &config.path;
    let config_path = base_path.join("research.toml");
    if config_path.exists() && !config.force {
        output.warning("research.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    let reports_dir = base_path.join("data/research");
    if !reports_dir.exists() {
        if let Err(e) = fs::create_dir_all(&reports_dir) {
            output.error(&format!("Failed to create data/research: {}", e));
            return InitResult::Error(e.to_string());
        }
        output.created("directory", "data/research");
    } else {
        output.skipped("data/research", "already exists");
    }

    if let Err(e) = write_file(&config_path, &generate_research_toml(&config), config.force) {
        output.error(&format!("Failed to create research.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "research.toml");

    let env_example_path = base_path.join(".env.example");
    if let Err(e) = write_file(&env_example_path, generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("env", ".env.example");

    output.complete("Research workspace initialized!");
    output.header("Next Steps");
    match config.provider {
        ProviderKind::Openai => {
            output.info("Set OPENAI_API_KEY in .env:");
            output.command("cp .env.example .env");
        }
        ProviderKind::Ollama => {
            output.info("Start Ollama and pull the model:");
            output.command("ollama serve");
            output.command("ollama pull qwen3:8b");
        }
    }
    output.info("Run your first research:");
    output.command("ares-research run \"Battery recycling\"");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_research_toml(config: &InitConfig) -> String {
    let llm_section = match config.provider {
        ProviderKind::Openai => {
            r#"[llm]
type = "openai"
api_key_env = "OPENAI_API_KEY"
api_base = "https://api.openai.com/v1"
model = "gpt-4o-mini"
"#
        }
        ProviderKind::Ollama => {
            r#"[llm]
type = "ollama"
base_url = "http://localhost:11434"
model = "qwen3:8b"
"#
        }
    };

    format!(
        r#"# ares-research configuration
# Generated by: ares-research init
#
# Every value below is optional; omitted keys use the defaults shown.

{llm_section}
[research]
decomposition_nums = 3
url_per_query = 3
min_sources = 3
min_report_length = 5000
language = "en-us"
review = false
human_review = false
max_rounds = 2
citation_style = "apa"
authoritative_domains = [".gov", ".edu", ".org"]
refine_queries = true

[browser]
max_concurrent_browsers = 5
max_retries = 2
fetch_timeout_secs = 15
retry_backoff_ms = 1000
max_urls_per_query = 4
content_char_budget = 20000

[output]
dir = "./data/research"
log_level = "info"
"#
    )
}

fn generate_env_example() -> &'static str {
    r#"# ares-research environment
# Copy to .env and fill in the values you need.

# Required only when [llm] type = "openai"
OPENAI_API_KEY=

# Overrides [output] log_level, e.g. ares_research=debug
RUST_LOG=info
"#
}
