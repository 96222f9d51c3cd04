//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Timed writing sessions that wipe the page when you stop typing
#[derive(Parser, Debug)]
#[command(name = "wipeout")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, env = "WIPEOUT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a session on a file saved by an external editor
    Watch {
        /// Document to write in
        file: PathBuf,

        /// Session length in minutes (prompts if omitted)
        #[arg(short, long)]
        minutes: Option<f64>,
    },

    /// Serve an editor plugin over stdin/stdout
    Bridge,

    /// Print the default configuration
    Config,
}
