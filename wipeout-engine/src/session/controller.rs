//! Session lifetime and the periodic evaluator
//!
//! At most one session exists. It is armed by [`SessionController::start_session_flow`]
//! (or [`SessionController::arm`]) and ended by exactly one of: duration
//! expiry, an idle-cutoff wipe, [`SessionController::stop`], or
//! [`SessionController::teardown`]. Every ending goes through the same
//! path, which cancels the ticker and releases all session UI.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};
use uuid::Uuid;
use wipeout_protocol::{DocumentId, EndReason, Notice, OverlayState, SessionInfo};
use wipeout_utils::{Result, WipeoutError};

use super::classifier::EditSignal;
use super::duration::{DurationPrompt, Minutes};
use super::session::Session;
use crate::config::SessionConfig;
use crate::host::{ActiveDocument, EditorHost};
use crate::state::EngineState;
use crate::ui::{SessionUi, StatusLine};
use crate::wipe::{WipeEngine, WipeOutcome};

/// Observable controller phase
#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    /// No session has run yet
    Idle,
    Armed(SessionInfo),
    /// The last session ended
    Ended(EndReason),
}

/// Result of one evaluation tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No session (or not the expected one)
    Inactive,
    Running {
        idle: Duration,
        overlay: OverlayState,
    },
    Ended(EndReason),
    /// Idle cutoff reached while another wipe is still running
    WipeInFlight,
}

/// What a tick decided while holding the session lock
enum Decision {
    Expire(Uuid),
    Continue {
        idle: Duration,
        overlay: OverlayState,
        changed: Option<OverlayState>,
        status: StatusLine,
    },
    Wipe {
        id: Uuid,
        target: DocumentId,
        changed: Option<OverlayState>,
        status: StatusLine,
    },
}

pub struct SessionController<H, U> {
    host: Arc<H>,
    ui: Arc<U>,
    config: SessionConfig,
    state: Arc<EngineState>,
    session: Mutex<Option<Session>>,
    wipe: WipeEngine,
    /// Cancels the running ticker task
    ticker: Mutex<Option<oneshot::Sender<()>>>,
    phase: watch::Sender<SessionPhase>,
}

impl<H: EditorHost, U: SessionUi> SessionController<H, U> {
    pub fn new(host: Arc<H>, ui: Arc<U>, state: Arc<EngineState>, config: SessionConfig) -> Self {
        let (phase, _) = watch::channel(SessionPhase::Idle);
        let wipe = WipeEngine::new(config.header_delimiter.clone());
        Self {
            host,
            ui,
            config,
            state,
            session: Mutex::new(None),
            wipe,
            ticker: Mutex::new(None),
            phase,
        }
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    pub fn ui(&self) -> &Arc<U> {
        &self.ui
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &Arc<EngineState> {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.session.lock().is_some()
    }

    /// The running session, if any
    pub fn current(&self) -> Option<SessionInfo> {
        self.session.lock().as_ref().map(Session::info)
    }

    pub fn last_insert_at(&self) -> Option<Instant> {
        self.session.lock().as_ref().map(Session::last_insert_at)
    }

    pub fn wipe_in_flight(&self) -> bool {
        self.wipe.is_in_flight()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase.borrow().clone()
    }

    /// The "Start" command: validate, ask for a length, arm and start ticking
    ///
    /// Returns `Ok(None)` if the prompt was cancelled. Validation failures
    /// leave no state behind.
    pub async fn start_session_flow<P: DurationPrompt>(
        self: &Arc<Self>,
        prompt: &P,
    ) -> Result<Option<SessionInfo>> {
        if self.is_active() {
            return Err(WipeoutError::SessionActive);
        }
        let document = self
            .host
            .active_document()
            .ok_or(WipeoutError::NoActiveDocument)?;
        if !document.is_eligible() {
            return Err(WipeoutError::UnsupportedDocument(document.id.to_string()));
        }

        let Some(minutes) = prompt.pick().await else {
            debug!("Duration prompt cancelled");
            return Ok(None);
        };

        let info = self.arm(&document, minutes, Instant::now())?;
        self.start(info.id);
        Ok(Some(info))
    }

    /// `Idle -> Armed` without starting the ticker
    pub fn arm(&self, document: &ActiveDocument, minutes: Minutes, now: Instant) -> Result<SessionInfo> {
        let (info, status) = {
            let mut slot = self.session.lock();
            if slot.is_some() {
                return Err(WipeoutError::SessionActive);
            }
            let session = Session::new(
                document.id.clone(),
                document.length,
                minutes.as_duration(),
                &self.config,
                now,
            )
            .map_err(|_| WipeoutError::InvalidDuration(minutes.get().to_string()))?;
            let info = session.info();
            let status = session.status(now);
            self.state.activate(document.id.clone());
            *slot = Some(session);
            (info, status)
        };

        self.ui.install_overlay();
        self.ui.install_status(&status);
        self.ui.set_selection_disabled(true);
        self.ui.session_started(&info);
        self.ui.notify(Notice::info(format!(
            "Writing session started: {}. Keep typing.",
            minutes
        )));
        self.phase.send_replace(SessionPhase::Armed(info.clone()));

        info!(
            session_id = %info.id,
            document = %info.target,
            duration_ms = info.duration_ms,
            "Session armed"
        );
        Ok(info)
    }

    /// Spawn the periodic evaluator for `session_id`
    pub fn start(self: &Arc<Self>, session_id: Uuid) {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        if let Some(previous) = self.ticker.lock().replace(cancel_tx) {
            let _ = previous.send(());
        }
        tokio::spawn(ticker_task(Arc::clone(self), session_id, cancel_rx));
        debug!(session_id = %session_id, "Session ticker started");
    }

    /// Feed an edit signal from either channel
    ///
    /// Returns true if it was a qualifying insertion on the target.
    pub fn handle_edit(&self, signal: &EditSignal, now: Instant) -> bool {
        match self.session.lock().as_mut() {
            Some(session) => session.observe_edit(signal, now),
            None => false,
        }
    }

    /// Evaluate the running session at `now`
    pub async fn evaluate(&self, now: Instant) -> TickOutcome {
        self.evaluate_session(None, now).await
    }

    async fn evaluate_session(&self, expected: Option<Uuid>, now: Instant) -> TickOutcome {
        let decision = {
            let mut slot = self.session.lock();
            let Some(session) = slot
                .as_mut()
                .filter(|s| expected.map_or(true, |id| s.id() == id))
            else {
                return TickOutcome::Inactive;
            };

            // Expiry wins over idle cutoff on the same tick
            if session.is_expired(now) {
                Decision::Expire(session.id())
            } else {
                let changed = session.observe_overlay(now);
                if session.is_idle_cutoff(now) {
                    Decision::Wipe {
                        id: session.id(),
                        target: session.target().clone(),
                        changed,
                        status: session.status(now),
                    }
                } else {
                    Decision::Continue {
                        idle: session.idle(now),
                        overlay: session.overlay(),
                        changed,
                        status: session.status(now),
                    }
                }
            }
        };

        match decision {
            Decision::Expire(id) => {
                if self.finish(Some(id), EndReason::Completed) {
                    TickOutcome::Ended(EndReason::Completed)
                } else {
                    TickOutcome::Inactive
                }
            }
            Decision::Continue {
                idle,
                overlay,
                changed,
                status,
            } => {
                if let Some(overlay) = changed {
                    self.ui.update_overlay(overlay);
                }
                self.ui.update_status(&status);
                TickOutcome::Running { idle, overlay }
            }
            Decision::Wipe {
                id,
                target,
                changed,
                status,
            } => {
                if let Some(overlay) = changed {
                    self.ui.update_overlay(overlay);
                }
                // Shows the idle countdown at zero while the wipe runs
                self.ui.update_status(&status);
                self.wipe_and_end(id, target).await
            }
        }
    }

    async fn wipe_and_end(&self, session_id: Uuid, target: DocumentId) -> TickOutcome {
        let Some(flight) = self.wipe.begin() else {
            debug!(session_id = %session_id, "Wipe already in flight");
            return TickOutcome::WipeInFlight;
        };

        info!(session_id = %session_id, document = %target, "Idle cutoff reached");
        match self.wipe.run(&flight, self.host.as_ref(), &target).await {
            Ok(WipeOutcome::Wiped { .. }) => {
                self.ui
                    .notify(Notice::warning("You stopped typing. The document was wiped."));
            }
            Ok(WipeOutcome::Skipped) => {
                self.ui.notify(Notice::info(
                    "You stopped typing, but the document was no longer available.",
                ));
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "Wipe failed");
                self.ui
                    .notify(Notice::error("Could not wipe the document. Session ended."));
            }
        }

        // The slot is released only after the session is gone
        let ended = self.finish(Some(session_id), EndReason::IdleCutoff);
        drop(flight);

        if ended {
            TickOutcome::Ended(EndReason::IdleCutoff)
        } else {
            TickOutcome::Inactive
        }
    }

    /// Explicit stop
    pub fn stop(&self) -> bool {
        self.finish(None, EndReason::Stopped)
    }

    /// Host unload
    pub fn teardown(&self) -> bool {
        self.finish(None, EndReason::Unloaded)
    }

    /// `Armed -> Idle`
    ///
    /// With `expected` set, only that session is ended, so a late caller
    /// never ends a newer session. Returns false if nothing was ended.
    fn finish(&self, expected: Option<Uuid>, reason: EndReason) -> bool {
        let session = {
            let mut slot = self.session.lock();
            match slot.as_ref() {
                Some(s) if expected.map_or(true, |id| s.id() == id) => slot.take(),
                _ => None,
            }
        };
        let Some(session) = session else {
            return false;
        };

        if let Some(cancel) = self.ticker.lock().take() {
            let _ = cancel.send(());
        }
        self.state.deactivate();
        self.ui.remove_overlay();
        self.ui.remove_status();
        self.ui.set_selection_disabled(false);

        match reason {
            EndReason::Completed => self.ui.notify(Notice::success("Session complete. Well done!")),
            EndReason::Stopped => self.ui.notify(Notice::info("Session stopped.")),
            EndReason::IdleCutoff | EndReason::Unloaded => {}
        }
        self.ui.session_ended(reason);
        self.phase.send_replace(SessionPhase::Ended(reason));

        info!(
            session_id = %session.id(),
            document = %session.target(),
            reason = %reason,
            "Session ended"
        );
        true
    }
}

/// Background task evaluating one session at the configured rate
async fn ticker_task<H: EditorHost, U: SessionUi>(
    controller: Arc<SessionController<H, U>>,
    session_id: Uuid,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    let mut interval = tokio::time::interval(controller.config.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            _ = &mut cancel_rx => {
                debug!(session_id = %session_id, "Session ticker cancelled");
                break;
            }
            _ = interval.tick() => {
                match controller.evaluate_session(Some(session_id), Instant::now()).await {
                    TickOutcome::Running { .. } | TickOutcome::WipeInFlight => {}
                    TickOutcome::Ended(_) | TickOutcome::Inactive => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::ui::{RecordingUi, UiEvent};
    use crate::session::FixedDuration;
    use wipeout_protocol::DocumentKind;

    type Controller = SessionController<MemoryHost, RecordingUi>;

    fn doc() -> DocumentId {
        DocumentId::new("draft.md")
    }

    fn controller_with(content: &str) -> Arc<Controller> {
        let host = MemoryHost::new();
        host.insert_document(doc(), DocumentKind::Text, content);
        host.set_active(&doc());
        Arc::new(SessionController::new(
            Arc::new(host),
            Arc::new(RecordingUi::new()),
            EngineState::init(),
            SessionConfig::default(),
        ))
    }

    fn minutes(value: f64) -> Minutes {
        Minutes::new(value).unwrap()
    }

    fn active(controller: &Controller) -> ActiveDocument {
        controller.host().active_document().unwrap()
    }

    fn typed(length: usize) -> EditSignal {
        EditSignal::ContentChanged {
            document: doc(),
            length,
        }
    }

    // ==================== Start Flow Tests ====================

    #[tokio::test]
    async fn test_start_flow_without_document() {
        let controller = Arc::new(Controller::new(
            Arc::new(MemoryHost::new()),
            Arc::new(RecordingUi::new()),
            EngineState::init(),
            SessionConfig::default(),
        ));
        let err = controller
            .start_session_flow(&FixedDuration::new(Some(minutes(5.0))))
            .await
            .unwrap_err();
        assert!(matches!(err, WipeoutError::NoActiveDocument));
        assert!(controller.ui().events().is_empty());
    }

    #[tokio::test]
    async fn test_start_flow_rejects_unsaved_document() {
        let controller = controller_with("");
        controller.host().remove_document(&doc());
        crate::host::HostRegistry::focus(controller.host().as_ref(), doc(), 0, DocumentKind::Text);

        let err = controller
            .start_session_flow(&FixedDuration::new(Some(minutes(5.0))))
            .await
            .unwrap_err();
        assert!(matches!(err, WipeoutError::UnsupportedDocument(_)));
        assert!(!controller.is_active());
    }

    #[tokio::test]
    async fn test_start_flow_cancelled() {
        let controller = controller_with("body");
        let result = controller
            .start_session_flow(&FixedDuration::cancelled())
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(!controller.is_active());
        assert!(!controller.state().is_active());
        assert_eq!(controller.phase(), SessionPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_flow_arms_and_rejects_second_session() {
        let controller = controller_with("body");
        let prompt = FixedDuration::new(Some(minutes(5.0)));

        let info = controller.start_session_flow(&prompt).await.unwrap().unwrap();
        assert_eq!(info.target, doc());
        assert_eq!(info.duration_ms, 300_000);
        assert!(controller.state().is_target(&doc()));

        let err = controller.start_session_flow(&prompt).await.unwrap_err();
        assert!(matches!(err, WipeoutError::SessionActive));

        controller.stop();
    }

    // ==================== Arm Tests ====================

    #[test]
    fn test_arm_installs_ui() {
        let controller = controller_with("body");
        let now = Instant::now();
        let info = controller.arm(&active(&controller), minutes(10.0), now).unwrap();

        let ui = controller.ui();
        assert!(ui.has_overlay());
        assert!(ui.has_status());
        assert!(ui.selection_disabled());
        assert_eq!(controller.phase(), SessionPhase::Armed(info));
        assert_eq!(controller.last_insert_at(), Some(now));
    }

    #[test]
    fn test_arm_rejects_unrepresentable_duration() {
        let controller = controller_with("body");
        let huge = minutes(2e17);

        let err = controller.arm(&active(&controller), huge, Instant::now()).unwrap_err();

        assert!(matches!(err, WipeoutError::InvalidDuration(_)));
        assert!(!controller.is_active());
        assert!(!controller.state().is_active());
        assert_eq!(controller.phase(), SessionPhase::Idle);
        assert!(controller.ui().events().is_empty());
    }

    // ==================== Evaluate Tests ====================

    #[tokio::test]
    async fn test_evaluate_without_session() {
        let controller = controller_with("body");
        assert_eq!(controller.evaluate(Instant::now()).await, TickOutcome::Inactive);
    }

    #[tokio::test]
    async fn test_overlay_rises_then_resets_after_insertion() {
        let controller = controller_with("body");
        let start = Instant::now();
        controller.arm(&active(&controller), minutes(10.0), start).unwrap();

        let outcome = controller.evaluate(start + Duration::from_millis(1000)).await;
        assert_eq!(
            outcome,
            TickOutcome::Running {
                idle: Duration::from_millis(1000),
                overlay: OverlayState::HIDDEN,
            }
        );

        controller.evaluate(start + Duration::from_millis(3500)).await;
        controller.evaluate(start + Duration::from_millis(4400)).await;

        assert!(controller.handle_edit(&typed(5), start + Duration::from_millis(4500)));
        let outcome = controller.evaluate(start + Duration::from_millis(4600)).await;
        assert!(matches!(
            outcome,
            TickOutcome::Running { overlay: OverlayState::HIDDEN, .. }
        ));

        assert_eq!(
            controller.ui().overlay_updates(),
            vec![
                OverlayState::visible(5),
                OverlayState::visible(8),
                OverlayState::HIDDEN,
            ]
        );
        controller.stop();
    }

    #[tokio::test]
    async fn test_idle_cutoff_wipes_and_ends() {
        let controller = controller_with("---\nkey: v\n---\nbody text");
        let start = Instant::now();
        controller.arm(&active(&controller), minutes(10.0), start).unwrap();

        let outcome = controller.evaluate(start + Duration::from_millis(5000)).await;

        assert_eq!(outcome, TickOutcome::Ended(EndReason::IdleCutoff));
        assert_eq!(controller.host().content(&doc()).unwrap(), "---\nkey: v\n---\n");
        assert!(!controller.is_active());
        assert!(!controller.state().is_active());
        assert!(!controller.wipe_in_flight());
        assert_eq!(controller.phase(), SessionPhase::Ended(EndReason::IdleCutoff));

        let ui = controller.ui();
        assert!(!ui.has_overlay());
        assert!(!ui.has_status());
        assert!(!ui.selection_disabled());

        let last_status = ui.events().into_iter().rev().find_map(|e| match e {
            UiEvent::StatusUpdated(status) => Some(status),
            _ => None,
        });
        assert_eq!(
            last_status.map(|status| status.idle_remaining),
            Some(Duration::ZERO)
        );
    }

    #[tokio::test]
    async fn test_expiry_checked_before_idle_cutoff() {
        let controller = controller_with("body");
        let start = Instant::now();
        // Six seconds long: idle cutoff and expiry both hold at +6s
        controller.arm(&active(&controller), minutes(0.1), start).unwrap();

        let outcome = controller.evaluate(start + Duration::from_secs(6)).await;

        assert_eq!(outcome, TickOutcome::Ended(EndReason::Completed));
        assert_eq!(controller.host().content(&doc()).unwrap(), "body");
        assert_eq!(controller.host().write_count(), 0);
    }

    #[tokio::test]
    async fn test_wipe_failure_still_ends_session() {
        let controller = controller_with("body");
        controller.host().fail_io(true);
        let start = Instant::now();
        controller.arm(&active(&controller), minutes(10.0), start).unwrap();

        let outcome = controller.evaluate(start + Duration::from_secs(5)).await;

        assert_eq!(outcome, TickOutcome::Ended(EndReason::IdleCutoff));
        assert!(!controller.is_active());
        let notices = controller.ui().notices();
        assert_eq!(notices.last().unwrap().level, wipeout_protocol::NoticeLevel::Error);

        controller.host().fail_io(false);
        let later = start + Duration::from_secs(10);
        assert!(controller.arm(&active(&controller), minutes(5.0), later).is_ok());
    }

    // ==================== Stop Tests ====================

    #[test]
    fn test_stop_releases_everything() {
        let controller = controller_with("body");
        controller.arm(&active(&controller), minutes(5.0), Instant::now()).unwrap();
        controller.ui().clear();

        assert!(controller.stop());
        assert!(!controller.stop());
        assert!(!controller.state().is_active());
        assert_eq!(
            controller.ui().events(),
            vec![
                UiEvent::OverlayRemoved,
                UiEvent::StatusRemoved,
                UiEvent::SelectionDisabled(false),
                UiEvent::Notice(Notice::info("Session stopped.")),
            ]
        );
        assert_eq!(controller.phase(), SessionPhase::Ended(EndReason::Stopped));
    }

    #[test]
    fn test_teardown_is_silent() {
        let controller = controller_with("body");
        controller.arm(&active(&controller), minutes(5.0), Instant::now()).unwrap();
        controller.ui().clear();

        assert!(controller.teardown());
        assert!(controller.ui().notices().is_empty());
        assert_eq!(controller.phase(), SessionPhase::Ended(EndReason::Unloaded));
    }

    // ==================== Ticker Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_after_stop() {
        let controller = controller_with("body");
        let mut phase = controller.subscribe();
        controller
            .start_session_flow(&FixedDuration::new(Some(minutes(10.0))))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        controller.stop();
        phase.changed().await.unwrap();
        controller.ui().clear();

        // Long past the idle cutoff: a live ticker would have wiped
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(controller.host().content(&doc()).unwrap(), "body");
        assert!(controller.ui().events().is_empty());
    }
}
