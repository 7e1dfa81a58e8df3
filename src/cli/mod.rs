//! CLI module for ares-research
//!
//! Provides command-line interface parsing for the ares-research binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "research.toml";

/// ares-research - automated topic research
///
/// Plans search queries, collects authoritative sources, summarizes them
/// concurrently and writes a cited Markdown report.
#[derive(Parser, Debug)]
#[command(
    name = "ares-research",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "Automated topic research with cited Markdown reports",
    long_about = "Plans search queries for a topic, ranks and filters authoritative sources,\n\
                  fetches and summarizes them concurrently, and synthesizes a cited report.\n\n\
                  Use 'init' to write a starter research.toml.",
    after_help = "EXAMPLES:\n    \
                  ares-research init                                # Write research.toml\n    \
                  ares-research run \"Battery recycling\"             # Single-pass research\n    \
                  ares-research run \"Battery recycling\" --review    # Review and iterate\n    \
                  ares-research srs outline.md                      # Requirements specification\n    \
                  ares-research usecase requirements_specification.md  # PlantUML use cases\n    \
                  ares-research config --validate                   # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file [default: research.toml]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a topic and write the report
    Run {
        /// Topic to research
        topic: String,

        /// Additional instructions folded into every stage
        #[arg(short, long)]
        feedback: Option<String>,

        /// Review the report and iterate on rejection
        #[arg(short, long)]
        review: bool,

        /// Maximum review rounds (implies --review)
        #[arg(long)]
        max_rounds: Option<usize>,

        /// Answer review prompts yourself on the terminal (implies --review)
        #[arg(long)]
        human_review: bool,

        /// Directory the report is written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Write a software requirements specification from a project outline
    Srs {
        /// Markdown or text file describing the project
        outline: PathBuf,

        /// Directory the specification is written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Generate a PlantUML use-case diagram from a requirements specification
    Usecase {
        /// Requirements specification to diagram
        srs: PathBuf,

        /// Directory the diagram is written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Rewrite a document in the format of a standard document
    Standardize {
        /// Document to reformat
        original: PathBuf,

        /// Document whose structure and conventions to follow
        standard: PathBuf,

        /// Directory the standardized document is written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Write a starter research.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// LLM provider to configure
        #[arg(long, value_enum, default_value_t = ProviderKind::Ollama)]
        provider: ProviderKind,
    },
}

/// LLM provider written into a generated research.toml
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// Local Ollama server
    Ollama,
    /// OpenAI or a compatible API
    Openai,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Configuration path, explicit or the default.
    pub fn config_path(&self) -> &Path {
        self.config
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Whether the user named a configuration file.
    pub fn config_is_explicit(&self) -> bool {
        self.config.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_options() {
        let cli = Cli::try_parse_from([
            "ares-research",
            "run",
            "Battery recycling",
            "--feedback",
            "focus on the EU",
            "--max-rounds",
            "3",
            "-o",
            "/tmp/out",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                topic,
                feedback,
                review,
                max_rounds,
                human_review,
                output_dir,
            } => {
                assert_eq!(topic, "Battery recycling");
                assert_eq!(feedback.as_deref(), Some("focus on the EU"));
                assert!(!review);
                assert!(!human_review);
                assert_eq!(max_rounds, Some(3));
                assert_eq!(output_dir, Some(PathBuf::from("/tmp/out")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_config_path_defaults() {
        let cli = Cli::try_parse_from(["ares-research", "config"]).unwrap();
        assert_eq!(cli.config_path(), Path::new(DEFAULT_CONFIG_FILE));
        assert!(!cli.config_is_explicit());

        let cli = Cli::try_parse_from(["ares-research", "config", "--config", "alt.toml"]).unwrap();
        assert_eq!(cli.config_path(), Path::new("alt.toml"));
        assert!(cli.config_is_explicit());
    }

    #[test]
    fn test_init_provider_is_validated() {
        let cli = Cli::try_parse_from(["ares-research", "init", "--provider", "openai"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Init {
                provider: ProviderKind::Openai,
                ..
            }
        ));

        let cli = Cli::try_parse_from(["ares-research", "init"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Init {
                provider: ProviderKind::Ollama,
                ..
            }
        ));

        assert!(Cli::try_parse_from(["ares-research", "init", "--provider", "anthropic"]).is_err());
    }

    #[test]
    fn test_parse_document_commands() {
        let cli = Cli::try_parse_from(["ares-research", "srs", "outline.md", "-o", "docs"]).unwrap();
        match cli.command {
            Commands::Srs { outline, output_dir } => {
                assert_eq!(outline, PathBuf::from("outline.md"));
                assert_eq!(output_dir, Some(PathBuf::from("docs")));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from(["ares-research", "standardize", "draft.md", "template.md"]).unwrap();
        match cli.command {
            Commands::Standardize {
                original,
                standard,
                output_dir,
            } => {
                assert_eq!(original, PathBuf::from("draft.md"));
                assert_eq!(standard, PathBuf::from("template.md"));
                assert_eq!(output_dir, None);
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["ares-research", "usecase"]).is_err());
        assert!(Cli::try_parse_from(["ares-research", "standardize", "draft.md"]).is_err());
    }

    #[test]
    fn test_parse_human_review() {
        let cli = Cli::try_parse_from(["ares-research", "run", "Battery recycling", "--human-review"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { human_review: true, .. }));
    }

    #[test]
    fn test_run_requires_topic() {
        assert!(Cli::try_parse_from(["ares-research", "run"]).is_err());
    }
}
