//! Command-Line Interface

use clap::{Parser, Subcommand};

/// scrolltap - system-wide scroll and click filter for macOS
#[derive(Parser, Debug)]
#[command(name = "scrolltap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run; defaults to `run`
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Intercept and filter input events until stopped
    Run,

    /// Probe the accessibility permission and exit (0 granted, 1 not)
    Check {
        /// Show the system consent prompt if not yet trusted
        #[arg(long)]
        prompt: bool,
    },

    /// Print the effective configuration constants as TOML
    Config,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
