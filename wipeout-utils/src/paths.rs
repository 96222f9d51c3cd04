//! Where wipeout keeps its config and logs
//!
//! Follows the XDG base directory layout through `directories`, with a
//! `$HOME`-relative fallback for platforms where it has no answer.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const APP_NAME: &str = "wipeout";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

/// `$XDG_CONFIG_HOME/wipeout`, or `~/.config/wipeout`
pub fn config_dir() -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.config_dir().to_path_buf(),
        None => home_relative(&[".config", APP_NAME]),
    }
}

/// `config.toml` inside [`config_dir`]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// `$XDG_STATE_HOME/wipeout`, or `~/.local/state/wipeout`
///
/// Platforms without a state directory (macOS, Windows) use the fallback.
pub fn state_dir() -> PathBuf {
    project_dirs()
        .and_then(|dirs| dirs.state_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| home_relative(&[".local", "state", APP_NAME]))
}

pub fn log_dir() -> PathBuf {
    state_dir().join("log")
}

/// Create `path` and any missing parents
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path)
}

fn home_relative(parts: &[&str]) -> PathBuf {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);
    parts.iter().fold(home, |path, part| path.join(part))
}
