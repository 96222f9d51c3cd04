//! File-watch front end
//!
//! Arms a session on a file edited by any external editor that saves as
//! you type. Every save is a content-changed signal with the file's new
//! length; the terminal shows the countdown.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, FileIdMap};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, error, info};
use wipeout_protocol::{DocumentId, EndReason, Notice};
use wipeout_utils::{Result, WipeoutError};

use crate::config::AppConfig;
use crate::host::{EditorHost, FsHost};
use crate::session::{EditSignal, FixedDuration, Minutes, SessionController, SessionPhase};
use crate::state::EngineState;
use crate::ui::{SessionUi, TerminalPrompt, TerminalUi};

/// Exit status when the session ended in a wipe
pub const EXIT_WIPED: i32 = 2;

/// Watches one document for saves
pub struct DocumentWatcher {
    path: PathBuf,
    rx: mpsc::UnboundedReceiver<Result<Vec<Event>>>,
    /// Debouncer handle (kept alive)
    _debouncer: Debouncer<RecommendedWatcher, FileIdMap>,
}

impl DocumentWatcher {
    /// Watch `path`, which must already be canonical
    ///
    /// The parent directory is watched so that editors saving through a
    /// rename are still seen.
    pub fn new(path: &Path) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| WipeoutError::internal(format!("{} has no parent", path.display())))?
            .to_path_buf();

        let (tx, rx) = mpsc::unbounded_channel();
        let mut debouncer = new_debouncer(
            Duration::from_millis(100),
            None,
            move |result: DebounceEventResult| {
                let events = result
                    .map(|events| events.into_iter().map(|e| e.event).collect())
                    .map_err(|errs| WipeoutError::internal(format!("Watch error: {:?}", errs)));
                let _ = tx.send(events);
            },
        )
        .map_err(|e| WipeoutError::internal(format!("Failed to create watcher: {}", e)))?;

        debouncer
            .watcher()
            .watch(&parent, RecursiveMode::NonRecursive)
            .map_err(|e| WipeoutError::internal(format!("Failed to watch: {}", e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            rx,
            _debouncer: debouncer,
        })
    }

    /// Whether an event is a write to the watched document
    fn is_document_change(event: &Event, path: &Path) -> bool {
        matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
            && event.paths.iter().any(|p| p == path)
    }

    /// Feed saves to the controller until the watcher closes
    pub async fn run<H: EditorHost, U: SessionUi>(
        mut self,
        controller: Arc<SessionController<H, U>>,
    ) {
        info!("Watching {:?}", self.path);
        let document = DocumentId::new(self.path.to_string_lossy());

        while let Some(result) = self.rx.recv().await {
            let events = match result {
                Ok(events) => events,
                Err(e) => {
                    error!("Document watch error: {}", e);
                    continue;
                }
            };
            if !events.iter().any(|e| Self::is_document_change(e, &self.path)) {
                continue;
            }

            let length = match tokio::fs::read_to_string(&self.path).await {
                Ok(content) => content.chars().count(),
                Err(e) => {
                    debug!("Could not read {:?} after change: {}", self.path, e);
                    continue;
                }
            };
            let signal = EditSignal::ContentChanged {
                document: document.clone(),
                length,
            };
            if controller.handle_edit(&signal, Instant::now()) {
                debug!(length, "Insertion detected");
            }
        }
    }
}

/// Wait until the phase reports an ended session
///
/// Returns `None` if the controller went away first.
pub async fn wait_for_end(mut phase: watch::Receiver<SessionPhase>) -> Option<EndReason> {
    loop {
        let ended = match &*phase.borrow_and_update() {
            SessionPhase::Ended(reason) => Some(*reason),
            _ => None,
        };
        if ended.is_some() {
            return ended;
        }
        if phase.changed().await.is_err() {
            return None;
        }
    }
}

/// Process exit status for how a session ended
pub fn exit_code(reason: Option<EndReason>) -> i32 {
    match reason {
        Some(EndReason::IdleCutoff) => EXIT_WIPED,
        _ => 0,
    }
}

/// Run `wipeout watch`
pub async fn run_watch(config: AppConfig, file: PathBuf, minutes: Option<f64>) -> Result<i32> {
    let host = Arc::new(FsHost::new(config.document.text_extensions.clone()));
    let document = host.focus_path(&file).await?;
    let path = PathBuf::from(document.id.as_str());

    let controller = Arc::new(SessionController::new(
        host,
        Arc::new(TerminalUi::new()),
        EngineState::init(),
        config.session_config(),
    ));

    let watcher = DocumentWatcher::new(&path)?;
    let pump = tokio::spawn(watcher.run(Arc::clone(&controller)));

    let started = match minutes {
        Some(value) => {
            let prompt = FixedDuration::new(Some(Minutes::new(value)?));
            controller.start_session_flow(&prompt).await?
        }
        None => {
            let prompt = TerminalPrompt::new(config.session.quick_durations.clone());
            controller.start_session_flow(&prompt).await?
        }
    };
    if started.is_none() {
        controller.ui().notify(Notice::info("Cancelled."));
        pump.abort();
        return Ok(0);
    }

    let reason = tokio::select! {
        reason = wait_for_end(controller.subscribe()) => reason,
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for Ctrl-C: {}", e);
            }
            controller.teardown();
            Some(EndReason::Unloaded)
        }
    };

    pump.abort();
    info!(reason = ?reason, "Watch finished");
    Ok(exit_code(reason))
}
