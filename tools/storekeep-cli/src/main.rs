//! Storekeep CLI - run order scenarios against the storekeep domain model.
//!
//! Commands:
//! - `storekeep simulate` - Run an order scenario end to end
//! - `storekeep password` - Hash, verify and inspect passwords
//! - `storekeep config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;
mod scenario;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConfigArgs, PasswordArgs, SimulateArgs};

/// Storekeep CLI - Run and inspect order scenarios
#[derive(Parser)]
#[command(name = "storekeep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an order scenario end to end
    Simulate(SimulateArgs),

    /// Hash, verify and inspect passwords
    Password(PasswordArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    setup_tracing(&ctx.config.logging.filter, cli.verbose);

    // Execute command
    let result = match cli.command {
        Commands::Simulate(args) => commands::simulate::run(args, &ctx),
        Commands::Password(args) => commands::password::run(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

/// Install the log subscriber. `RUST_LOG` wins over the configured filter.
fn setup_tracing(configured: &str, verbose: bool) {
    let fallback = if verbose { "debug" } else { configured };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
