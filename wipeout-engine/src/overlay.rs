//! Idle-time warning overlay
//!
//! The overlay stays hidden for a grace period, then ramps up in ten
//! discrete steps until the idle cutoff is reached.

use std::time::Duration;

use wipeout_protocol::{OverlayState, MAX_OVERLAY_LEVEL};

/// Overlay state for a given idle time
///
/// The grace period is clamped to the cutoff so the overlay is always
/// visible by the time the page is wiped.
pub fn overlay_for(idle: Duration, overlay_delay: Duration, idle_cutoff: Duration) -> OverlayState {
    let delay = overlay_delay.min(idle_cutoff);
    if idle < delay {
        return OverlayState::HIDDEN;
    }

    let span = (idle_cutoff - delay).as_millis().max(1) as f64;
    let ratio = ((idle - delay).as_millis() as f64 / span).clamp(0.0, 1.0);
    let level = (ratio * f64::from(MAX_OVERLAY_LEVEL)).round() as u8;

    OverlayState::visible(level)
}

/// Tracks the last emitted overlay state so redraws only happen on change
#[derive(Debug, Clone)]
pub struct OverlayModel {
    overlay_delay: Duration,
    idle_cutoff: Duration,
    current: OverlayState,
}

impl OverlayModel {
    pub fn new(overlay_delay: Duration, idle_cutoff: Duration) -> Self {
        Self {
            overlay_delay,
            idle_cutoff,
            current: OverlayState::HIDDEN,
        }
    }

    /// Effective grace period before the overlay shows
    pub fn delay(&self) -> Duration {
        self.overlay_delay.min(self.idle_cutoff)
    }

    pub fn current(&self) -> OverlayState {
        self.current
    }

    /// Feed the current idle time; returns the new state only if it changed
    pub fn observe(&mut self, idle: Duration) -> Option<OverlayState> {
        let next = overlay_for(idle, self.overlay_delay, self.idle_cutoff);
        if next == self.current {
            return None;
        }
        self.current = next;
        Some(next)
    }
}
