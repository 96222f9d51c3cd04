//! Process-scoped session flags shared with the input guard

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use wipeout_protocol::DocumentId;

/// Live "is a session running, and on which document" state
///
/// Created once when the host loads, read by every guard callback, and
/// written only by the session controller.
#[derive(Debug, Default)]
pub struct EngineState {
    active: AtomicBool,
    target: RwLock<Option<DocumentId>>,
}

impl EngineState {
    /// Create the state at host load
    pub fn init() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn activate(&self, target: DocumentId) {
        *self.target.write() = Some(target);
        self.active.store(true, Ordering::Release);
    }

    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
        *self.target.write() = None;
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// True only while a session is running on `document`
    pub fn is_target(&self, document: &DocumentId) -> bool {
        self.is_active() && self.target.read().as_ref() == Some(document)
    }

    pub fn target(&self) -> Option<DocumentId> {
        self.target.read().clone()
    }
}
