//! Configuration schema

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionSection,
    pub document: DocumentSection,
}

/// `[session]` timing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub idle_cutoff_ms: u64,
    pub overlay_delay_ms: u64,
    pub tick_interval_ms: u64,
    pub quick_durations: Vec<u32>,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            idle_cutoff_ms: 5000,
            overlay_delay_ms: 2000,
            tick_interval_ms: 100,
            quick_durations: vec![5, 10, 15],
        }
    }
}

/// `[document]` settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSection {
    pub header_delimiter: String,
    pub text_extensions: Vec<String>,
}

impl Default for DocumentSection {
    fn default() -> Self {
        Self {
            header_delimiter: "---".into(),
            text_extensions: vec!["md".into(), "markdown".into(), "txt".into()],
        }
    }
}

/// Settings a session captures when it is armed
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub idle_cutoff: Duration,
    pub overlay_delay: Duration,
    pub tick_interval: Duration,
    pub header_delimiter: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        AppConfig::default().session_config()
    }
}

impl AppConfig {
    /// Snapshot of the settings a session runs with
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            idle_cutoff: Duration::from_millis(self.session.idle_cutoff_ms),
            overlay_delay: Duration::from_millis(self.session.overlay_delay_ms),
            tick_interval: Duration::from_millis(self.session.tick_interval_ms),
            header_delimiter: self.document.header_delimiter.clone(),
        }
    }
}
