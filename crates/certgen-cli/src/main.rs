//! Interactive CLI for filling the certificate template.

mod commands;

use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use certgen_core::CertgenConfig;
use certgen_core::models::config::LoggingConfig;
use commands::{config, generate, history, inspect};

/// Certificate generator - fill the template and record the protocol number
#[derive(Parser)]
#[command(name = "certgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Raise log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Prompt for certificate data and generate a document (default)
    Generate(generate::GenerateArgs),

    /// Show which markers the template contains
    Inspect(inspect::InspectArgs),

    /// List recently generated certificates
    History(history::HistoryArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    let command = cli
        .command
        .unwrap_or_else(|| Commands::Generate(generate::GenerateArgs::default()));

    match command {
        // Config management must work even when the current file is broken.
        Commands::Config(args) => config::run(args, config_path).map(|()| ExitCode::SUCCESS),
        Commands::Generate(args) => match setup(config_path, cli.verbose) {
            Ok(config) => generate::run(args, config),
            Err(e) => generate::run_unconfigured(args, &e),
        },
        Commands::Inspect(args) => {
            let config = setup(config_path, cli.verbose)?;
            inspect::run(args, config).map(|()| ExitCode::SUCCESS)
        }
        Commands::History(args) => {
            let config = setup(config_path, cli.verbose)?;
            history::run(args, config).map(|()| ExitCode::SUCCESS)
        }
    }
}

fn setup(config_path: Option<&str>, verbose: u8) -> anyhow::Result<CertgenConfig> {
    let config = commands::load_config(config_path)?;
    init_logging(&config.logging, verbose)?;
    tracing::debug!("Configuration loaded");
    Ok(config)
}

/// Send logs to the configured file; the terminal is reserved for prompts.
fn init_logging(config: &LoggingConfig, verbose: u8) -> anyhow::Result<()> {
    let base: Level = config
        .level
        .parse()
        .with_context(|| format!("invalid log level {:?}", config.level))?;
    let level = raise_level(base, verbose);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)
        .with_context(|| format!("failed to open log file {}", config.file.display()))?;

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    Ok(())
}

fn raise_level(base: Level, verbose: u8) -> Level {
    const ORDER: [Level; 5] = [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE];
    let index = ORDER.iter().position(|l| *l == base).unwrap_or(2);
    ORDER[(index + usize::from(verbose)).min(ORDER.len() - 1)]
}
