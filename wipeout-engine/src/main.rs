//! wipeout: keep typing or lose the page

use std::path::Path;

use clap::Parser;
use tracing::error;
use wipeout_engine::bridge::run_bridge;
use wipeout_engine::cli::{Cli, Command};
use wipeout_engine::config::{AppConfig, ConfigLoader, DEFAULT_CONFIG_TOML};
use wipeout_engine::watch::run_watch;
use wipeout_utils::{init_logging_with_config, LogConfig, Result};

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => ConfigLoader::load_and_validate_from(path),
        None => ConfigLoader::load_and_validate(),
    }
}

fn start_logging(config: LogConfig) {
    if let Err(e) = init_logging_with_config(config) {
        eprintln!("warning: logging disabled: {}", e);
    }
}

async fn execute(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Watch { file, minutes } => {
            start_logging(LogConfig::watch());
            let config = load_config(cli.config.as_deref())?;
            run_watch(config, file, minutes).await
        }
        Command::Bridge => {
            start_logging(LogConfig::bridge());
            let config = load_config(cli.config.as_deref())?;
            run_bridge(config).await
        }
        Command::Config => {
            print!("{}", DEFAULT_CONFIG_TOML);
            Ok(0)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let exit_code = match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            if !e.is_user_facing() {
                error!(error = %e, "wipeout failed");
            }
            eprintln!("{}", e);
            1
        }
    };

    std::process::exit(exit_code);
}
