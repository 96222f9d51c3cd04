use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;
use wipeout_protocol::{DocumentId, OverlayState, SessionInfo};
use wipeout_utils::{Result, WipeoutError};

use super::classifier::{EditSignal, InputClassifier};
use super::clock::IdleClock;
use crate::config::SessionConfig;
use crate::overlay::OverlayModel;
use crate::ui::StatusLine;

/// One armed writing session bound to a single document
#[derive(Debug)]
pub struct Session {
    /// Unique session identifier
    id: Uuid,
    /// Document this session governs
    target: DocumentId,
    started_at: Instant,
    ends_at: Instant,
    idle_cutoff: Duration,
    classifier: InputClassifier,
    clock: IdleClock,
    overlay: OverlayModel,
}

impl Session {
    /// Create a session starting at `now`
    ///
    /// Fails with `InvalidDuration` when the end of the session is past
    /// what the clock can represent.
    pub fn new(
        target: DocumentId,
        initial_length: usize,
        duration: Duration,
        config: &SessionConfig,
        now: Instant,
    ) -> Result<Self> {
        let ends_at = now
            .checked_add(duration)
            .ok_or_else(|| WipeoutError::InvalidDuration(format!("{:?}", duration)))?;
        Ok(Self {
            id: Uuid::new_v4(),
            target,
            started_at: now,
            ends_at,
            idle_cutoff: config.idle_cutoff,
            classifier: InputClassifier::new(initial_length),
            clock: IdleClock::new(now),
            overlay: OverlayModel::new(config.overlay_delay, config.idle_cutoff),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn target(&self) -> &DocumentId {
        &self.target
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn ends_at(&self) -> Instant {
        self.ends_at
    }

    pub fn idle_cutoff(&self) -> Duration {
        self.idle_cutoff
    }

    pub fn last_insert_at(&self) -> Instant {
        self.clock.last_insert_at()
    }

    pub fn last_observed_length(&self) -> usize {
        self.classifier.last_observed_length()
    }

    /// Feed an edit signal; returns true if it was a qualifying insertion
    ///
    /// Signals for any other document are ignored.
    pub fn observe_edit(&mut self, signal: &EditSignal, now: Instant) -> bool {
        if signal.document() != &self.target {
            return false;
        }
        if !self.classifier.classify(signal) {
            return false;
        }
        self.clock.record_insertion(now);
        true
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.ends_at
    }

    pub fn idle(&self, now: Instant) -> Duration {
        self.clock.idle(now)
    }

    pub fn is_idle_cutoff(&self, now: Instant) -> bool {
        self.idle(now) >= self.idle_cutoff
    }

    /// Update the overlay model; returns the new state if it changed
    pub fn observe_overlay(&mut self, now: Instant) -> Option<OverlayState> {
        let idle = self.idle(now);
        self.overlay.observe(idle)
    }

    pub fn overlay(&self) -> OverlayState {
        self.overlay.current()
    }

    pub fn status(&self, now: Instant) -> StatusLine {
        StatusLine {
            idle_remaining: self.idle_cutoff.saturating_sub(self.idle(now)),
            session_remaining: self.ends_at.saturating_duration_since(now),
        }
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            target: self.target.clone(),
            duration_ms: self.ends_at.duration_since(self.started_at).as_millis() as u64,
            idle_cutoff_ms: self.idle_cutoff.as_millis() as u64,
        }
    }
}
