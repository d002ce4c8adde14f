//! Command-line interface for mastermind.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Mastermind - number guessing game server
#[derive(Parser, Debug)]
#[command(name = "mastermind")]
#[command(about = "Mastermind game server with expiring sessions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Path to the TOML settings file
        #[arg(short, long, default_value = "mastermind.toml")]
        config: PathBuf,

        /// Host to bind to (overrides the settings file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the settings file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Load and validate settings, then print the effective values
    CheckConfig {
        /// Path to the TOML settings file
        #[arg(short, long, default_value = "mastermind.toml")]
        config: PathBuf,
    },
}
