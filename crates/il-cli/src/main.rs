use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use il_cli::commands::{eligibility, import, list, log, review, score, stats, sync};
use il_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(il_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = il_db::Database::open(&config.database_path).with_context(|| {
        format!("failed to open {}", config.database_path.display())
    })?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so JSON output on stdout stays parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();

    match &cli.command {
        Some(Commands::Log(args)) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            log::run(&mut stdout, &mut db, args, &config)?;
        }
        Some(Commands::List(args)) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            list::run(&mut stdout, &db, args)?;
        }
        Some(Commands::Stats(args)) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            stats::run(&mut stdout, &db, args)?;
        }
        Some(Commands::Eligibility(args)) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            eligibility::run(&mut stdout, &db, args, &config)?;
        }
        Some(Commands::Review(args)) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            review::run(&mut stdout, &db, args, &config)?;
        }
        Some(Commands::Import) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            let stats = import::run(io::stdin().lock(), &mut db)?;
            eprintln!(
                "Imported {} new, {} updated record(s)",
                stats.inserted, stats.updated
            );
        }
        Some(Commands::Sync(args)) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            sync::run(&mut stdout, &mut db, args, &config)?;
        }
        Some(Commands::Score(args)) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            score::run(&mut stdout, &mut db, args, &config)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
