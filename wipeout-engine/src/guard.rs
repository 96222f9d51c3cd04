//! Input guard: blocks editing shortcuts that would let the user cheat
//!
//! The guard is installed once per process and stays installed. Whether
//! it suppresses anything is decided per event from the live
//! [`EngineState`], so repeated start/stop cycles never add or remove
//! handlers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::{debug, info};
use wipeout_protocol::{DocumentId, InputKind, Verdict};

use crate::state::EngineState;

static INSTALLED: OnceLock<InputGuard> = OnceLock::new();

pub struct InputGuard {
    state: Arc<EngineState>,
    suppressed: AtomicU64,
}

impl InputGuard {
    pub fn new(state: Arc<EngineState>) -> Self {
        Self {
            state,
            suppressed: AtomicU64::new(0),
        }
    }

    /// Install the process-wide guard
    ///
    /// Only the first call installs; later calls return the same guard
    /// and ignore their argument.
    pub fn install(state: &Arc<EngineState>) -> &'static InputGuard {
        INSTALLED.get_or_init(|| {
            info!("Input guard installed");
            InputGuard::new(Arc::clone(state))
        })
    }

    /// The installed guard, if any
    pub fn installed() -> Option<&'static InputGuard> {
        INSTALLED.get()
    }

    /// Decide what happens to an input event
    pub fn intercept(&self, document: &DocumentId, kind: InputKind) -> Verdict {
        if !kind.is_guarded() || !self.state.is_target(document) {
            return Verdict::Pass;
        }

        self.suppressed.fetch_add(1, Ordering::Relaxed);
        debug!(document = %document, ?kind, "Suppressed input during session");
        Verdict::Suppress
    }

    /// Number of events suppressed since the guard was created
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUARDED: [InputKind; 10] = [
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
    ];

    #[test]
    fn test_passes_everything_when_inactive() {
        let guard = InputGuard::new(EngineState::init());
        let doc = DocumentId::new("a.md");

        for kind in GUARDED {
            assert_eq!(guard.intercept(&doc, kind), Verdict::Pass);
        }
        assert_eq!(guard.suppressed_count(), 0);
    }

    #[test]
    fn test_suppresses_guarded_kinds_on_target() {
        let state = EngineState::init();
        let guard = InputGuard::new(Arc::clone(&state));
        let doc = DocumentId::new("a.md");
        state.activate(doc.clone());

        for kind in GUARDED {
            assert_eq!(guard.intercept(&doc, kind), Verdict::Suppress, "{:?}", kind);
        }
        assert_eq!(guard.intercept(&doc, InputKind::Keystroke), Verdict::Pass);
        assert_eq!(guard.suppressed_count(), GUARDED.len() as u64);
    }

    #[test]
    fn test_other_documents_pass() {
        let state = EngineState::init();
        let guard = InputGuard::new(Arc::clone(&state));
        state.activate(DocumentId::new("a.md"));

        assert_eq!(
            guard.intercept(&DocumentId::new("b.md"), InputKind::Paste),
            Verdict::Pass
        );
    }

    #[test]
    fn test_follows_live_flag_across_sessions() {
        let state = EngineState::init();
        let guard = InputGuard::new(Arc::clone(&state));
        let doc = DocumentId::new("a.md");

        for _ in 0..3 {
            state.activate(doc.clone());
            assert_eq!(guard.intercept(&doc, InputKind::Undo), Verdict::Suppress);
            state.deactivate();
            assert_eq!(guard.intercept(&doc, InputKind::Undo), Verdict::Pass);
        }
    }

    #[test]
    fn test_install_is_idempotent() {
        let first = InputGuard::install(&EngineState::init());
        let second = InputGuard::install(&EngineState::init());
        assert!(std::ptr::eq(first, second));
        assert!(InputGuard::installed().is_some());
    }
}
