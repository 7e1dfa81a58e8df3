use anyhow::{bail, Context, Result};
use ares_research::cli::init::{self, InitConfig, InitResult};
use ares_research::cli::output::Output;
use ares_research::cli::{Cli, Commands};
use ares_research::gateway::{DaedraFetch, DaedraSearch};
use ares_research::utils::toml_config::{ConfigError, ResearchConfig};
use ares_research::research::ConsoleInput;
use ares_research::{
    DocumentStandardizer, LLMClient, ReportWriter, ResearchOrchestrator, SrsWriter, UseCaseDiagrammer,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SRS_FILE: &str = "requirements_specification.md";
const USE_CASE_FILE: &str = "use_case_diagram.puml";
const STANDARDIZED_FILE: &str = "standardized_document.md";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match &cli.command {
        Commands::Init {
            path,
            force,
            provider,
        } => {
            let config = InitConfig {
                path: path.clone(),
                force: *force,
                provider: *provider,
            };
            match init::run(config, &output) {
                InitResult::Success | InitResult::AlreadyExists => Ok(()),
                InitResult::Error(e) => bail!("init failed: {}", e),
            }
        }
        Commands::Config { validate } => show_config(&cli, *validate, &output),
        Commands::Run {
            topic,
            feedback,
            review,
            max_rounds,
            human_review,
            output_dir,
        } => {
            let mut config = load_config(&cli)?;
            if *review || max_rounds.is_some() {
                config.research.review = true;
            }
            if *human_review {
                config.research.human_review = true;
            }
            if let Some(rounds) = max_rounds {
                config.research.max_rounds = *rounds;
            }
            if let Some(dir) = output_dir {
                config.output.dir = dir.clone();
            }
            config.validate()?;

            init_tracing(&config.output.log_level, cli.verbose);
            run_research(config, topic, feedback.clone(), &output).await
        }
        Commands::Srs { outline, output_dir } => {
            let config = document_config(&cli, output_dir.as_deref())?;
            let outline = read_input(outline)?;
            let llm = create_llm(&config).await?;

            output.info(&format!("Writing requirements specification with {}", llm.model_name()));
            let srs = SrsWriter::new(llm)
                .with_language(&config.research.language)
                .write(&outline)
                .await?;
            write_document(&config, SRS_FILE, &srs, &output)
        }
        Commands::Usecase { srs, output_dir } => {
            let config = document_config(&cli, output_dir.as_deref())?;
            let document = read_input(srs)?;
            let llm = create_llm(&config).await?;

            output.info(&format!("Generating use-case diagram with {}", llm.model_name()));
            let script = UseCaseDiagrammer::new(llm)
                .with_language(&config.research.language)
                .generate(&document)
                .await?;
            write_document(&config, USE_CASE_FILE, &script, &output)
        }
        Commands::Standardize {
            original,
            standard,
            output_dir,
        } => {
            let config = document_config(&cli, output_dir.as_deref())?;
            let original = read_input(original)?;
            let standard = read_input(standard)?;
            let llm = create_llm(&config).await?;

            output.info(&format!("Standardizing document with {}", llm.model_name()));
            let document = DocumentStandardizer::new(llm)
                .with_language(&config.research.language)
                .standardize(&original, &standard)
                .await?;
            write_document(&config, STANDARDIZED_FILE, &document, &output)
        }
    }
}

/// Load, override and validate the configuration for a document command.
fn document_config(cli: &Cli, output_dir: Option<&Path>) -> Result<ResearchConfig> {
    let mut config = load_config(cli)?;
    if let Some(dir) = output_dir {
        config.output.dir = dir.to_path_buf();
    }
    config.validate()?;
    init_tracing(&config.output.log_level, cli.verbose);
    Ok(config)
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

async fn create_llm(config: &ResearchConfig) -> Result<Arc<dyn LLMClient>> {
    let provider = config.llm.provider()?;
    let client = provider
        .create_client()
        .await
        .with_context(|| format!("failed to create {} client", provider.name()))?;
    Ok(Arc::from(client))
}

fn write_document(config: &ResearchConfig, file_name: &str, content: &str, output: &Output) -> Result<()> {
    let path = ReportWriter::new(PathBuf::from(&config.output.dir))
        .write_file(file_name, content)
        .with_context(|| format!("failed to write {}", file_name))?;
    output.created("document", &path.display().to_string());
    output.complete("Done!");
    Ok(())
}

/// An explicit `--config` must exist; the default path may be absent.
fn load_config(cli: &Cli) -> Result<ResearchConfig, ConfigError> {
    if cli.config_is_explicit() {
        ResearchConfig::from_file(cli.config_path())
    } else {
        ResearchConfig::from_file_or_default(cli.config_path())
    }
}

fn init_tracing(log_level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info,ares_research=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn show_config(cli: &Cli, validate: bool, output: &Output) -> Result<()> {
    let config = load_config(cli)?;

    output.header("Configuration");
    output.kv("file", &cli.config_path().display().to_string());
    output.kv("model", config.llm.model());
    output.newline();
    println!("{}", config.to_toml()?);

    if validate {
        match config.validate() {
            Ok(()) => output.success("Configuration is valid"),
            Err(e) => {
                output.error(&e.to_string());
                bail!("invalid configuration");
            }
        }
    }
    Ok(())
}

async fn run_research(
    config: ResearchConfig,
    topic: &str,
    feedback: Option<String>,
    output: &Output,
) -> Result<()> {
    let llm = create_llm(&config).await?;

    output.banner();
    output.info(&format!("Researching \"{}\" with {}", topic, llm.model_name()));

    let orchestrator = ResearchOrchestrator::new(
        llm,
        Arc::new(DaedraSearch::new()),
        Arc::new(DaedraFetch::new()),
        config.orchestrator_settings(),
    );
    let orchestrator = if config.research.human_review {
        output.hint("You will be asked to approve or reject each round");
        orchestrator.with_human_reviewer(Arc::new(ConsoleInput))
    } else {
        orchestrator
    };
    let outcome = orchestrator.run(topic, feedback).await;
    output.outcome(&outcome);

    let writer = ReportWriter::new(PathBuf::from(&config.output.dir));
    let path = writer
        .write(&outcome.report.topic, &outcome.report.content)
        .context("failed to write report")?;
    output.created("report", &path.display().to_string());

    if outcome.is_failed() {
        bail!("research did not complete");
    }
    match outcome.approved {
        Some(false) => output.warning("Report was not approved within the round limit"),
        _ => output.complete("Research complete!"),
    }
    Ok(())
}
