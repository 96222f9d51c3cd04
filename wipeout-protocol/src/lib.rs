//! wipeout-protocol: Shared definitions for the editor bridge
//!
//! This crate defines the message types and data structures exchanged
//! between the wipeout engine and an editor plugin as newline-delimited
//! JSON over stdin/stdout.

pub mod codec;
pub mod messages;
pub mod types;

// Re-export main types at crate root
pub use codec::{CodecError, EngineCodec, HostCodec, JsonLinesCodec};
pub use messages::{EngineMessage, HostMessage};
pub use types::{
    DocumentId, DocumentKind, EndReason, InputKind, Notice, NoticeLevel, OverlayState,
    SessionInfo, Verdict, ViewId, MAX_OVERLAY_LEVEL,
};
