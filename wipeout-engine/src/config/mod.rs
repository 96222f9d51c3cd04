//! Configuration management for wipeout
//!
//! Settings are read once at startup. A running session works from the
//! [`SessionConfig`] snapshot it captured when it was armed.

mod defaults;
mod loader;
mod schema;

pub use defaults::DEFAULT_CONFIG_TOML;
pub use loader::ConfigLoader;
pub use schema::*;
