//! Default configuration values
//!
//! These are embedded in the binary and printed by `wipeout config`.

/// Default configuration as TOML (for reference/documentation)
pub const DEFAULT_CONFIG_TOML: &str = r##"# wipeout configuration

[session]
# Longest pause between typed characters before the page is wiped
idle_cutoff_ms = 5000
# Idle time before the warning overlay starts to show
overlay_delay_ms = 2000
# How often the session is evaluated
tick_interval_ms = 100
# Choices offered by the duration prompt, in minutes
quick_durations = [5, 10, 15]

[document]
# Marker line opening and closing the metadata header kept by a wipe
header_delimiter = "---"
# File extensions treated as plain text documents
text_extensions = ["md", "markdown", "txt"]
"##;
