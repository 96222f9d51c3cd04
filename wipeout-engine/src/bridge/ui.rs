//! Session UI forwarded to the editor as protocol frames

use tokio::sync::mpsc;
use tracing::debug;
use wipeout_protocol::{EndReason, EngineMessage, Notice, OverlayState, SessionInfo};

use crate::ui::{SessionUi, StatusLine};

pub struct BridgeUi {
    outbound: mpsc::UnboundedSender<EngineMessage>,
}

impl BridgeUi {
    pub fn new(outbound: mpsc::UnboundedSender<EngineMessage>) -> Self {
        Self { outbound }
    }

    fn send(&self, message: EngineMessage) {
        if self.outbound.send(message).is_err() {
            debug!("Bridge output closed, dropping UI update");
        }
    }

    fn status(status: &StatusLine) -> EngineMessage {
        EngineMessage::Status {
            idle_remaining_ms: status.idle_remaining.as_millis() as u64,
            session_remaining_ms: status.session_remaining.as_millis() as u64,
            text: status.text(),
        }
    }
}

impl SessionUi for BridgeUi {
    fn install_status(&self, status: &StatusLine) {
        self.send(Self::status(status));
    }

    fn update_status(&self, status: &StatusLine) {
        self.send(Self::status(status));
    }

    fn remove_status(&self) {
        self.send(EngineMessage::StatusRemoved);
    }

    fn install_overlay(&self) {
        self.send(EngineMessage::Overlay {
            overlay: OverlayState::HIDDEN,
        });
    }

    fn update_overlay(&self, overlay: OverlayState) {
        self.send(EngineMessage::Overlay { overlay });
    }

    fn remove_overlay(&self) {
        self.send(EngineMessage::OverlayRemoved);
    }

    fn set_selection_disabled(&self, disabled: bool) {
        self.send(EngineMessage::SelectionMode { disabled });
    }

    fn notify(&self, notice: Notice) {
        self.send(EngineMessage::Notice { notice });
    }

    fn session_started(&self, info: &SessionInfo) {
        self.send(EngineMessage::SessionStarted {
            session: info.clone(),
        });
    }

    fn session_ended(&self, reason: EndReason) {
        self.send(EngineMessage::SessionEnded { reason });
    }
}
