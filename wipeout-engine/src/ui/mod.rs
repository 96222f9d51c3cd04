//! Session UI collaborators
//!
//! The controller drives three pieces of UI while a session is armed: a
//! status element with the idle countdown, a warning overlay, and the
//! document-wide no-selection mode. How they look is up to the front end.

mod recording;
mod terminal;

use std::fmt;
use std::time::Duration;

use wipeout_protocol::{EndReason, Notice, OverlayState, SessionInfo};

pub use recording::{RecordingUi, UiEvent};
pub use terminal::{parse_prompt_answer, render_line, TerminalPrompt, TerminalUi};

/// Contents of the status element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine {
    /// Time left before the idle cutoff fires
    pub idle_remaining: Duration,
    /// Time left in the session
    pub session_remaining: Duration,
}

impl StatusLine {
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}s idle left | {} to go",
            format_tenths(self.idle_remaining),
            format_clock(self.session_remaining)
        )
    }
}

/// Seconds with one decimal place, truncated (`3.29s` shows as `3.2`)
pub fn format_tenths(duration: Duration) -> String {
    let tenths = duration.as_millis() / 100;
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// `mm:ss`, or `h:mm:ss` past an hour, rounded up to the next second
pub fn format_clock(duration: Duration) -> String {
    let mut secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs += 1;
    }
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// UI surfaces a session drives
pub trait SessionUi: Send + Sync + 'static {
    fn install_status(&self, status: &StatusLine);
    fn update_status(&self, status: &StatusLine);
    fn remove_status(&self);

    fn install_overlay(&self);
    fn update_overlay(&self, overlay: OverlayState);
    fn remove_overlay(&self);

    fn set_selection_disabled(&self, disabled: bool);

    fn notify(&self, notice: Notice);

    /// A session was armed
    fn session_started(&self, _info: &SessionInfo) {}

    /// The session ended and its UI has been removed
    fn session_ended(&self, _reason: EndReason) {}
}
