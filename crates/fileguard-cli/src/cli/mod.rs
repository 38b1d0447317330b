//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::output::OutputFormat;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)?;

    // Determine output format
    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or(OutputFormat::Pretty);

    // Create context for commands
    let ctx = commands::Context {
        config,
        config_path,
        output_format,
        verbose: cli.verbose,
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Check(args) => commands::check::execute(ctx, args).await,
        Commands::Unknown(args) => commands::unknown::execute(ctx, args).await,
        Commands::Delete(args) => commands::delete::execute(ctx, args).await,
        Commands::Report(args) => commands::report::execute(ctx, args).await,
        Commands::Config(args) => commands::config::execute(ctx, args).await,
    }
}

/// Log to stderr; `RUST_LOG` overrides the default filter.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "fileguard_audit=debug,fileguard_client=debug,fileguard_cli=debug,info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
