//! Terminal front end: one redrawn status line on stderr and a line prompt

use std::io::{self, Write};

use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use wipeout_protocol::{Notice, NoticeLevel, OverlayState, MAX_OVERLAY_LEVEL};

use super::{SessionUi, StatusLine};
use crate::session::{DurationChoice, DurationPrompt, Minutes};

const BAR_FILLED: char = '#';
const BAR_EMPTY: char = '.';

/// The status line as drawn, without colour
pub fn render_line(status: &StatusLine, overlay: OverlayState) -> String {
    let filled = if overlay.visible { overlay.level } else { 0 };
    let bar: String = (0..MAX_OVERLAY_LEVEL)
        .map(|i| if i < filled { BAR_FILLED } else { BAR_EMPTY })
        .collect();
    format!("[{}] {}", bar, status)
}

/// Colour for the status line at a given warning level
pub fn overlay_color(overlay: OverlayState) -> Color {
    match overlay.level {
        _ if !overlay.visible => Color::Green,
        0..=4 => Color::Yellow,
        _ => Color::Red,
    }
}

#[derive(Debug, Default)]
struct LineState {
    status: Option<StatusLine>,
    overlay: OverlayState,
}

/// [`SessionUi`] drawing to stderr
///
/// Selection mode has no terminal equivalent and is ignored.
#[derive(Debug, Default)]
pub struct TerminalUi {
    line: Mutex<LineState>,
}

impl TerminalUi {
    pub fn new() -> Self {
        Self::default()
    }

    fn redraw(&self) {
        let line = self.line.lock();
        let result = match line.status {
            Some(status) => draw(&render_line(&status, line.overlay), overlay_color(line.overlay)),
            None => clear(),
        };
        if let Err(e) = result {
            tracing::debug!("Failed to draw status line: {}", e);
        }
    }
}

fn draw(text: &str, color: Color) -> io::Result<()> {
    let mut stderr = io::stderr().lock();
    queue!(
        stderr,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        SetForegroundColor(color),
        Print(text),
        ResetColor
    )?;
    stderr.flush()
}

fn clear() -> io::Result<()> {
    let mut stderr = io::stderr().lock();
    queue!(stderr, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    stderr.flush()
}

fn notice_prefix(level: NoticeLevel) -> (&'static str, Color) {
    match level {
        NoticeLevel::Info => ("info", Color::Blue),
        NoticeLevel::Success => ("done", Color::Green),
        NoticeLevel::Warning => ("warning", Color::Yellow),
        NoticeLevel::Error => ("error", Color::Red),
    }
}

impl SessionUi for TerminalUi {
    fn install_status(&self, status: &StatusLine) {
        self.line.lock().status = Some(*status);
        self.redraw();
    }

    fn update_status(&self, status: &StatusLine) {
        self.install_status(status);
    }

    fn remove_status(&self) {
        self.line.lock().status = None;
        self.redraw();
    }

    fn install_overlay(&self) {
        self.line.lock().overlay = OverlayState::HIDDEN;
    }

    fn update_overlay(&self, overlay: OverlayState) {
        self.line.lock().overlay = overlay;
        self.redraw();
    }

    fn remove_overlay(&self) {
        self.line.lock().overlay = OverlayState::HIDDEN;
    }

    fn set_selection_disabled(&self, _disabled: bool) {}

    fn notify(&self, notice: Notice) {
        let (prefix, color) = notice_prefix(notice.level);
        let result = (|| {
            let mut stderr = io::stderr().lock();
            queue!(
                stderr,
                MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                SetForegroundColor(color),
                Print(format!("{}: ", prefix)),
                ResetColor,
                Print(format!("{}\n", notice.message))
            )?;
            stderr.flush()
        })();
        if let Err(e) = result {
            tracing::debug!("Failed to print notice: {}", e);
        }
        self.redraw();
    }
}

/// Map a typed answer to a choice
///
/// Letters pick the matching quick duration (`a` is the first), an empty
/// line or `q` cancels, anything else is a custom entry.
pub fn parse_prompt_answer(input: &str, quick: &[u32]) -> DurationChoice {
    let answer = input.trim();
    if answer.is_empty() || answer.eq_ignore_ascii_case("q") {
        return DurationChoice::Cancel;
    }

    let mut chars = answer.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            let index = (c.to_ascii_lowercase() as u8 - b'a') as usize;
            if let Some(minutes) = quick.get(index) {
                return DurationChoice::Quick(*minutes);
            }
        }
    }

    DurationChoice::Custom(answer.to_string())
}

/// Duration dialog on stdin/stderr
#[derive(Debug, Clone)]
pub struct TerminalPrompt {
    quick: Vec<u32>,
}

impl TerminalPrompt {
    pub fn new(quick: Vec<u32>) -> Self {
        Self { quick }
    }

    fn menu(&self) -> String {
        let mut menu = String::from("Session length:");
        for (i, minutes) in self.quick.iter().enumerate() {
            let letter = (b'a' + i as u8) as char;
            menu.push_str(&format!("  {}) {} min", letter, minutes));
        }
        menu.push_str("\nPick a letter, type minutes, or press Enter to cancel: ");
        menu
    }
}

impl DurationPrompt for TerminalPrompt {
    async fn pick(&self) -> Option<Minutes> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            eprint!("{}", self.menu());
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => {
                    tracing::warn!("Failed to read duration: {}", e);
                    return None;
                }
            };

            match parse_prompt_answer(&line, &self.quick).resolve() {
                Ok(minutes) => return minutes,
                Err(e) => eprintln!("{}. Enter a positive number of minutes.", e),
            }
        }
    }
}
