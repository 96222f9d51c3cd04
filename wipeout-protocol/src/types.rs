//! Core data types shared between the engine and editor plugins

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest overlay intensity level
pub const MAX_OVERLAY_LEVEL: u8 = 10;

/// Persisted identifier of a document (for file-backed hosts, its path)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of an open editor view bound to a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(String);

impl ViewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of document an identifier resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Plain text (markdown, txt): the only kind a session can govern
    Text,
    /// Anything else the host can open (canvas, image, pdf)
    Other,
}

/// Raw user input events the input guard may intercept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Copy,
    Cut,
    Paste,
    SelectAll,
    Undo,
    Redo,
    ContextMenu,
    SelectStart,
    DragOver,
    Drop,
    /// Ordinary typing, never suppressed
    Keystroke,
}

impl InputKind {
    /// Whether this event can be used to cheat during a session
    pub fn is_guarded(self) -> bool {
        !matches!(self, InputKind::Keystroke)
    }
}

/// Guard decision for an intercepted input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Let the event through untouched
    Pass,
    /// Prevent the default action and stop propagation
    Suppress,
}

/// Visual warning state derived from idle time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverlayState {
    pub visible: bool,
    /// Quantized intensity in `0..=MAX_OVERLAY_LEVEL`
    pub level: u8,
}

impl OverlayState {
    pub const HIDDEN: OverlayState = OverlayState {
        visible: false,
        level: 0,
    };

    pub fn visible(level: u8) -> Self {
        Self {
            visible: true,
            level: level.min(MAX_OVERLAY_LEVEL),
        }
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The chosen duration elapsed
    Completed,
    /// The idle cutoff fired and the document was wiped (or the wipe was attempted)
    IdleCutoff,
    /// The user stopped the session explicitly
    Stopped,
    /// The host is unloading
    Unloaded,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::Completed => "completed",
            EndReason::IdleCutoff => "idle_cutoff",
            EndReason::Stopped => "stopped",
            EndReason::Unloaded => "unloaded",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Summary of an armed session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub target: DocumentId,
    pub duration_ms: u64,
    pub idle_cutoff_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_serializes_transparently() {
        let id = DocumentId::new("notes/draft.md");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"notes/draft.md\"");
        assert_eq!(id.to_string(), "notes/draft.md");
    }

    #[test]
    fn test_keystroke_is_not_guarded() {
        assert!(!InputKind::Keystroke.is_guarded());
        for kind in [
            InputKind::Copy,
            InputKind::Cut,
            InputKind::Paste,
            InputKind::SelectAll,
            InputKind::Undo,
            InputKind::Redo,
            InputKind::ContextMenu,
            InputKind::SelectStart,
            InputKind::DragOver,
            InputKind::Drop,
        ] {
            assert!(kind.is_guarded(), "{:?} should be guarded", kind);
        }
    }

    #[test]
    fn test_input_kind_wire_names() {
        let kind: InputKind = serde_json::from_str("\"select_all\"").unwrap();
        assert_eq!(kind, InputKind::SelectAll);
        assert_eq!(serde_json::to_string(&InputKind::DragOver).unwrap(), "\"drag_over\"");
    }

    #[test]
    fn test_overlay_visible_clamps_level() {
        assert_eq!(OverlayState::visible(42).level, MAX_OVERLAY_LEVEL);
        assert!(OverlayState::visible(3).visible);
        assert_eq!(OverlayState::default(), OverlayState::HIDDEN);
    }

    #[test]
    fn test_end_reason_display() {
        assert_eq!(EndReason::IdleCutoff.to_string(), "idle_cutoff");
        assert_eq!(EndReason::Completed.to_string(), "completed");
    }
}
