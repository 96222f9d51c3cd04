//! wipeout-engine: timed writing sessions with a destructive idle cutoff
//!
//! A session is armed on one document for a chosen length. If no text is
//! inserted for the idle cutoff, the document is cleared down to its
//! metadata header. While a session runs, editing shortcuts that would
//! let the writer cheat are suppressed by the [`guard::InputGuard`].

pub mod bridge;
pub mod cli;
pub mod config;
pub mod guard;
pub mod host;
pub mod overlay;
pub mod session;
pub mod state;
pub mod ui;
pub mod watch;
pub mod wipe;

pub use config::{AppConfig, ConfigLoader, SessionConfig};
pub use guard::InputGuard;
pub use host::{ActiveDocument, EditorHost, FsHost, HostRegistry, MemoryHost};
pub use session::{
    DurationPrompt, EditSignal, FixedDuration, Minutes, SessionController, SessionPhase,
    TickOutcome,
};
pub use state::EngineState;
pub use ui::{RecordingUi, SessionUi, StatusLine, TerminalUi};
pub use wipe::{preserved_header, WipeEngine, WipeOutcome};
