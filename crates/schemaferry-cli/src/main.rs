use clap::{Parser, Subcommand};
use colored::Colorize;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schemaferry_core::{Config, ErrorPolicy, Schema};
use schemaferry_ddl::DdlSynthesizer;
use schemaferry_executor::{DryRunExecutor, StatementExecutor};
use schemaferry_ingest::{FileSource, Ingestor, JsonlDeadLetterSink, KafkaSource, MessageSource, RunSummary};

/// SchemaFerry - replicate schema messages from Kafka into Hive
#[derive(Parser)]
#[command(name = "schemaferry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schemaferry.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log statements instead of running them
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Consume schema messages from Kafka and apply them until stopped
    Run,

    /// Apply schema messages stored as JSON files
    Apply {
        /// Schema message files, applied in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the DDL for a schema message without running it
    Render {
        /// Schema message file
        file: PathBuf,
    },

    /// Check that the execution engine is reachable
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    // Load config if specified
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("schemaferry.toml").exists() {
        Config::from_file(Path::new("schemaferry.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };
    config.apply_env_overrides();
    config.validate()?;

    if cli.verbose {
        eprintln!(
            "{} {:?} engine, {:?} on error",
            "Using".cyan(),
            config.engine.kind,
            config.pipeline.on_error
        );
    }

    match cli.command {
        Commands::Run => run_command(&config, cli.dry_run).await,
        Commands::Apply { files } => apply_command(&config, files, cli.dry_run).await,
        Commands::Render { file } => render_command(&config, &file),
        Commands::Check => check_command(&config).await,
    }
}

/// Log to stderr; RUST_LOG wins over the verbosity flag
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn build_executor(config: &Config, dry_run: bool) -> Box<dyn StatementExecutor> {
    if dry_run {
        Box::new(DryRunExecutor::new())
    } else {
        schemaferry_executor::from_config(&config.engine)
    }
}

fn build_ingestor<S: MessageSource>(
    config: &Config,
    source: S,
    executor: Box<dyn StatementExecutor>,
) -> Ingestor<S, Box<dyn StatementExecutor>> {
    let mut ingestor = Ingestor::new(source, executor)
        .with_synthesizer(DdlSynthesizer::new(config.pipeline.identifiers))
        .with_policy(config.pipeline.on_error);

    if config.pipeline.on_error == ErrorPolicy::DeadLetter {
        if let Some(path) = config.dead_letter_path() {
            ingestor = ingestor.with_dead_letter_sink(JsonlDeadLetterSink::new(path));
        }
    }

    ingestor
}

/// Run command - consume Kafka until Ctrl-C or a fatal error
async fn run_command(config: &Config, dry_run: bool) -> Result<()> {
    let executor = build_executor(config, dry_run);

    // Test connection before subscribing
    executor
        .test_connection()
        .await
        .context("Failed to connect to execution engine")?;

    let source = KafkaSource::connect(&config.kafka)?;
    eprintln!(
        "{} {} (group {})",
        "Consuming".cyan(),
        source.topic(),
        source.group_id()
    );

    let mut ingestor = build_ingestor(config, source, executor);

    tokio::select! {
        result = ingestor.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted, in-flight message left uncommitted");
        }
    }

    print_summary(&ingestor.summary());
    Ok(())
}

/// Apply command - push files through the same loop as Kafka messages
async fn apply_command(config: &Config, files: Vec<PathBuf>, dry_run: bool) -> Result<()> {
    let executor = build_executor(config, dry_run);
    executor
        .test_connection()
        .await
        .context("Failed to connect to execution engine")?;

    let mut ingestor = build_ingestor(config, FileSource::new(files), executor);
    let summary = ingestor.run().await?;

    print_summary(&summary);
    Ok(())
}

/// Render command - print planned DDL
fn render_command(config: &Config, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let schema = Schema::from_json(&json)?;

    let plan = DdlSynthesizer::new(config.pipeline.identifiers).plan(&schema)?;
    for statement in plan {
        println!("-- {}", statement.target);
        println!("{}", statement.sql);
    }

    Ok(())
}

/// Check command - verify the engine client is usable
async fn check_command(config: &Config) -> Result<()> {
    let executor = schemaferry_executor::from_config(&config.engine);

    eprintln!(
        "{} {} ({})",
        "Checking".cyan(),
        executor.name(),
        config.engine.binary_path().display()
    );
    executor
        .test_connection()
        .await
        .context("Failed to connect to execution engine")?;

    eprintln!("{}", "✓ Engine reachable".green());
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    eprintln!(
        "{} {} applied ({} statements), {} skipped, {} dead-lettered",
        "Done:".green(),
        summary.applied,
        summary.statements,
        summary.skipped,
        summary.dead_lettered
    );
}
