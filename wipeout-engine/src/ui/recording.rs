//! UI that records every call, for embedding hosts' tests

use parking_lot::Mutex;
use wipeout_protocol::{Notice, OverlayState};

use super::{SessionUi, StatusLine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    StatusInstalled(StatusLine),
    StatusUpdated(StatusLine),
    StatusRemoved,
    OverlayInstalled,
    OverlayUpdated(OverlayState),
    OverlayRemoved,
    SelectionDisabled(bool),
    Notice(Notice),
}

#[derive(Debug, Default)]
pub struct RecordingUi {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                UiEvent::Notice(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn overlay_updates(&self) -> Vec<OverlayState> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                UiEvent::OverlayUpdated(o) => Some(*o),
                _ => None,
            })
            .collect()
    }

    /// Whether the status element is currently installed
    pub fn has_status(&self) -> bool {
        self.last_of(|e| matches!(e, UiEvent::StatusInstalled(_) | UiEvent::StatusRemoved))
            .map(|e| matches!(e, UiEvent::StatusInstalled(_)))
            .unwrap_or(false)
    }

    /// Whether the overlay is currently installed
    pub fn has_overlay(&self) -> bool {
        self.last_of(|e| matches!(e, UiEvent::OverlayInstalled | UiEvent::OverlayRemoved))
            .map(|e| matches!(e, UiEvent::OverlayInstalled))
            .unwrap_or(false)
    }

    pub fn selection_disabled(&self) -> bool {
        self.last_of(|e| matches!(e, UiEvent::SelectionDisabled(_)))
            .map(|e| matches!(e, UiEvent::SelectionDisabled(true)))
            .unwrap_or(false)
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn last_of(&self, pred: impl Fn(&UiEvent) -> bool) -> Option<UiEvent> {
        self.events.lock().iter().rev().find(|e| pred(e)).cloned()
    }

    fn push(&self, event: UiEvent) {
        self.events.lock().push(event);
    }
}

impl SessionUi for RecordingUi {
    fn install_status(&self, status: &StatusLine) {
        self.push(UiEvent::StatusInstalled(*status));
    }

    fn update_status(&self, status: &StatusLine) {
        self.push(UiEvent::StatusUpdated(*status));
    }

    fn remove_status(&self) {
        self.push(UiEvent::StatusRemoved);
    }

    fn install_overlay(&self) {
        self.push(UiEvent::OverlayInstalled);
    }

    fn update_overlay(&self, overlay: OverlayState) {
        self.push(UiEvent::OverlayUpdated(overlay));
    }

    fn remove_overlay(&self) {
        self.push(UiEvent::OverlayRemoved);
    }

    fn set_selection_disabled(&self, disabled: bool) {
        self.push(UiEvent::SelectionDisabled(disabled));
    }

    fn notify(&self, notice: Notice) {
        self.push(UiEvent::Notice(notice));
    }
}
