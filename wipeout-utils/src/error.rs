//! The error type shared by the wipeout crates
//!
//! Session-start refusals are ordinary variants so front ends can show
//! them as warnings; everything else is a fault worth logging.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WipeoutError {
    // === IO Errors ===

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Configuration Errors ===

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    // === Session Errors ===

    #[error("A writing session is already running")]
    SessionActive,

    #[error("No document is open")]
    NoActiveDocument,

    #[error("Unsupported document: {0}")]
    UnsupportedDocument(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    // === Bridge Errors ===

    #[error("Protocol error: {0}")]
    Protocol(String),

    // === Internal Errors ===

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WipeoutError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// A refusal to start a session, shown to the writer rather than logged
    ///
    /// None of these leave any state behind.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::SessionActive
                | Self::NoActiveDocument
                | Self::UnsupportedDocument(_)
                | Self::InvalidDuration(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WipeoutError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_messages() {
        let cases = [
            (WipeoutError::SessionActive, "A writing session is already running"),
            (WipeoutError::NoActiveDocument, "No document is open"),
            (
                WipeoutError::UnsupportedDocument("cover.png".into()),
                "Unsupported document: cover.png",
            ),
            (WipeoutError::InvalidDuration("-3".into()), "Invalid duration: -3"),
            (WipeoutError::config("missing key"), "Configuration error: missing key"),
            (WipeoutError::protocol("frame too large"), "Protocol error: frame too large"),
        ];
        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn test_file_errors_name_the_path() {
        let err = WipeoutError::FileWrite {
            path: PathBuf::from("/notes/draft.md"),
            source: IoError::new(ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to write file /notes/draft.md: permission denied"
        );

        let err = WipeoutError::ConfigInvalid {
            path: PathBuf::from("/home/ana/.config/wipeout/config.toml"),
            message: "idle_cutoff_ms must be positive".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Invalid configuration at /home/ana/.config/wipeout/config.toml"));
        assert!(msg.ends_with("idle_cutoff_ms must be positive"));
    }

    #[test]
    fn test_start_refusals_are_user_facing() {
        assert!(WipeoutError::SessionActive.is_user_facing());
        assert!(WipeoutError::NoActiveDocument.is_user_facing());
        assert!(WipeoutError::UnsupportedDocument("cover.png".into()).is_user_facing());
        assert!(WipeoutError::InvalidDuration("abc".into()).is_user_facing());

        assert!(!WipeoutError::config("bad").is_user_facing());
        assert!(!WipeoutError::protocol("bad frame").is_user_facing());
        assert!(!WipeoutError::internal("bad state").is_user_facing());
        assert!(!WipeoutError::FileRead {
            path: PathBuf::from("draft.md"),
            source: IoError::new(ErrorKind::NotFound, "gone"),
        }
        .is_user_facing());
    }

    #[test]
    fn test_io_conversion_keeps_kind() {
        let err: WipeoutError = IoError::new(ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, WipeoutError::Io(ref inner) if inner.kind() == ErrorKind::PermissionDenied));
        assert_eq!(err.to_string(), "IO error: denied");
    }
}
