//! wipeout-utils: Common utilities shared across wipeout crates
//!
//! This crate provides:
//! - Unified error types ([`WipeoutError`], [`Result`])
//! - Logging infrastructure ([`init_logging`], [`LogConfig`])
//! - XDG-compliant path utilities ([`paths`] module)

pub mod error;
pub mod logging;
pub mod paths;

// Re-export main types at crate root for convenience
pub use error::{Result, WipeoutError};
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogOutput};

pub use paths::{config_dir, config_file, ensure_dir, log_dir, state_dir};
