//! Bridge message types exchanged with an editor plugin

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Messages sent from the editor to the engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    /// The focused document changed
    Focus {
        document: DocumentId,
        /// Character count of the document
        length: usize,
        kind: DocumentKind,
    },
    /// The "Start" command ran; `minutes` is the dialog result, `None` if cancelled
    Start {
        #[serde(default)]
        minutes: Option<f64>,
    },
    /// Structural editor transaction with the lengths of every inserted fragment
    Transaction {
        document: DocumentId,
        inserted: Vec<usize>,
    },
    /// Generic content-changed notification with the new total length
    ContentChanged {
        document: DocumentId,
        length: usize,
    },
    /// Raw input event awaiting a verdict
    Input {
        id: u64,
        document: DocumentId,
        kind: InputKind,
    },
    ViewOpened {
        view: ViewId,
        document: DocumentId,
    },
    ViewClosed {
        view: ViewId,
    },
    /// Explicit stop of the running session
    Stop,
    /// The host is unloading the plugin
    Unload,
}

/// Messages sent from the engine to the editor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineMessage {
    SessionStarted {
        session: SessionInfo,
    },
    /// Status element contents
    Status {
        idle_remaining_ms: u64,
        session_remaining_ms: u64,
        text: String,
    },
    StatusRemoved,
    Overlay {
        overlay: OverlayState,
    },
    OverlayRemoved,
    /// Toggle the document-wide no-selection mode
    SelectionMode {
        disabled: bool,
    },
    Verdict {
        id: u64,
        verdict: Verdict,
    },
    /// Replace the content of an open view
    ReplaceView {
        view: ViewId,
        content: String,
        clear_history: bool,
    },
    Notice {
        notice: Notice,
    },
    SessionEnded {
        reason: EndReason,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_message_wire_format() {
        let json = r#"{"type":"transaction","document":"a.md","inserted":[0,3]}"#;
        let msg: HostMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            HostMessage::Transaction {
                document: DocumentId::new("a.md"),
                inserted: vec![0, 3],
            }
        );
    }

    #[test]
    fn test_start_without_minutes_is_cancel() {
        let msg: HostMessage = serde_json::from_str(r#"{"type":"start"}"#).unwrap();
        assert_eq!(msg, HostMessage::Start { minutes: None });
    }

    #[test]
    fn test_unit_variants() {
        let msg: HostMessage = serde_json::from_str(r#"{"type":"unload"}"#).unwrap();
        assert_eq!(msg, HostMessage::Unload);
        assert_eq!(
            serde_json::to_string(&EngineMessage::OverlayRemoved).unwrap(),
            r#"{"type":"overlay_removed"}"#
        );
    }

    #[test]
    fn test_engine_message_verdict() {
        let msg = EngineMessage::Verdict { id: 7, verdict: Verdict::Suppress };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"verdict","id":7,"verdict":"suppress"}"#
        );
    }
}
