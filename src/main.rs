use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;

mod agent;
mod arena;
mod cli;
mod commands;
mod config;
mod console;
mod narrative;
mod realm;
mod session;

use cli::{Cli, Commands};
use config::{Config, LogLevel};

fn setup_logging(config: &Config) -> Result<()> {
    let log_dir = Config::expand_path(&config.paths.logs);

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("jingjie.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(match config.log_level {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        });
    }

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    info!(
        "Log level: {} (from {})",
        config.log_level.as_filter(),
        if std::env::var("RUST_LOG").is_ok() { "RUST_LOG env" } else { "config" }
    );
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<()> {
    // One logical thread: every store mutation happens here
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    match cli.command {
        Commands::Realms { format } => commands::realms::run(cli::OutputFormat::resolve(format), &config),
        Commands::Agents { format } => commands::agents::list(cli::OutputFormat::resolve(format), &config),
        Commands::Agent { id, format } => commands::agents::show(&id, cli::OutputFormat::resolve(format), &config),
        Commands::Experiment {
            agent,
            preset,
            scenario,
            format,
        } => rt.block_on(commands::experiment::run(
            &agent,
            preset,
            scenario,
            cli::OutputFormat::resolve(format),
            &config,
        )),
        Commands::Traverse { agent, realm, format } => rt.block_on(commands::traverse::run(
            &agent,
            realm,
            cli::OutputFormat::resolve(format),
            &config,
        )),
        Commands::Console => rt.block_on(commands::console::run(&config)),
        Commands::Config { action } => commands::config::run(action, &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&config).context("Failed to setup logging")?;

    info!("Starting jingjie with config from: {:?}", cli.config);

    run(cli, config).context("Command failed")?;

    Ok(())
}
