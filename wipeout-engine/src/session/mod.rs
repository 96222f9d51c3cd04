//! Writing sessions: insertion detection, idle tracking, and the controller

mod classifier;
mod clock;
mod controller;
mod duration;
mod session;

pub use classifier::{inserted_chars, EditSignal, InputClassifier};
pub use clock::IdleClock;
pub use controller::{SessionController, SessionPhase, TickOutcome};
pub use duration::{DurationChoice, DurationPrompt, FixedDuration, Minutes};
pub use session::Session;
