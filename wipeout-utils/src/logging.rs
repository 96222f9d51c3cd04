//! Tracing setup for the wipeout binaries
//!
//! `watch` owns the terminal for its countdown and `bridge` owns stdout for
//! protocol frames, so both send their logs to a file under the state
//! directory. Stderr output is left for interactive debugging.

use std::fs::{File, OpenOptions};

use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

use crate::{paths, Result, WipeoutError};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "WIPEOUT_LOG";

const DEFAULT_LOG_FILE: &str = "wipeout.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    File,
    /// Stderr and the log file
    Both,
}

impl LogOutput {
    fn to_stderr(self) -> bool {
        matches!(self, LogOutput::Stderr | LogOutput::Both)
    }

    fn to_file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub output: LogOutput,
    /// `EnvFilter` directive, e.g. `info` or `wipeout_engine=debug`
    pub filter: String,
    /// Emit span enter/exit events
    pub span_events: bool,
    /// Tag each line with its source location
    pub file_line: bool,
    /// File name inside the log directory; `wipeout.log` when unset
    pub file_name: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            output: LogOutput::Stderr,
            filter: "info".into(),
            span_events: false,
            file_line: false,
            file_name: None,
        }
    }
}

impl LogConfig {
    /// `wipeout watch`: the terminal belongs to the status line
    pub fn watch() -> Self {
        Self {
            output: LogOutput::File,
            filter: filter_from_env("info"),
            ..Self::default()
        }
    }

    /// `wipeout bridge`: stdout carries frames, logs get their own file
    pub fn bridge() -> Self {
        Self {
            output: LogOutput::File,
            filter: filter_from_env("info"),
            file_line: true,
            file_name: Some("bridge.log".into()),
            ..Self::default()
        }
    }

    /// Verbose stderr output for local debugging
    pub fn development() -> Self {
        Self {
            filter: "debug".into(),
            span_events: true,
            file_line: true,
            ..Self::default()
        }
    }

    fn log_file_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or(DEFAULT_LOG_FILE)
    }

    fn layer(&self) -> tracing_subscriber::fmt::Layer<Registry> {
        let spans = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_span_events(spans)
            .with_file(self.file_line)
            .with_line_number(self.file_line)
    }
}

fn filter_from_env(fallback: &str) -> String {
    std::env::var(LOG_ENV).unwrap_or_else(|_| fallback.to_string())
}

/// Install the default stderr subscriber
pub fn init_logging() -> Result<()> {
    init_logging_with_config(LogConfig::default())
}

/// Install a global subscriber built from `config`
///
/// Fails on an unparsable filter or when a subscriber is already set.
pub fn init_logging_with_config(config: LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| WipeoutError::config(format!("Invalid log filter: {}", e)))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.output.to_stderr() {
        layers.push(config.layer().with_writer(std::io::stderr).boxed());
    }
    if config.output.to_file() {
        let file = open_log_file(config.log_file_name())?;
        layers.push(config.layer().with_writer(file).with_ansi(false).boxed());
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| WipeoutError::internal(format!("Failed to init logging: {}", e)))
}

fn open_log_file(name: &str) -> Result<File> {
    let dir = paths::log_dir();
    paths::ensure_dir(&dir).map_err(|source| WipeoutError::FileWrite {
        path: dir.clone(),
        source,
    })?;

    let path = dir.join(name);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| WipeoutError::FileWrite { path, source })
}
