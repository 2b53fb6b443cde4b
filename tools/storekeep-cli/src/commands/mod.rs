//! CLI command implementations.

pub mod config;
pub mod password;
pub mod simulate;

use clap::{Args, Subcommand};

use crate::scenario::Step;

/// Arguments for the simulate command.
#[derive(Args)]
pub struct SimulateArgs {
    /// Scenario file (TOML, or JSON with a .json extension).
    pub scenario: String,

    /// Override the scenario's order steps (comma-separated).
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub steps: Option<Vec<Step>>,
}

/// Arguments for the password command.
#[derive(Args)]
pub struct PasswordArgs {
    #[command(subcommand)]
    pub command: PasswordCommand,
}

#[derive(Subcommand)]
pub enum PasswordCommand {
    /// Hash a password with the configured policy.
    Hash {
        /// Plain-text password.
        password: String,

        /// Skip the strength check.
        #[arg(long)]
        allow_weak: bool,
    },
    /// Check a password against a hash.
    Verify {
        /// Plain-text password.
        password: String,
        /// Stored hash (PHC string).
        hash: String,
    },
    /// Show the algorithm and cost parameters of a hash.
    Inspect {
        /// Stored hash (PHC string).
        hash: String,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Get a config value.
    Get {
        /// Config key (dot-separated).
        key: String,
    },
    /// Set a config value.
    Set {
        /// Config key (dot-separated).
        key: String,
        /// Value to set.
        value: String,
    },
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
