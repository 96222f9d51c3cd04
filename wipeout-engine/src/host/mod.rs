//! Host editor collaborators
//!
//! The engine never touches an editor directly. Everything it needs from
//! the host (which document is focused, reading and writing content,
//! pushing content into open views) goes through [`EditorHost`].

mod fs;
mod memory;

use std::future::Future;
use std::io;

use wipeout_protocol::{DocumentId, DocumentKind, ViewId};
use wipeout_utils::Result;

pub use fs::FsHost;
pub use memory::{MemoryHost, MemoryView};

/// The focused document as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDocument {
    pub id: DocumentId,
    /// Character count
    pub length: usize,
    pub kind: DocumentKind,
    /// Whether the document is persisted in host storage
    pub file_backed: bool,
}

impl ActiveDocument {
    /// Whether a session may be armed on this document
    pub fn is_eligible(&self) -> bool {
        self.file_backed && self.kind == DocumentKind::Text
    }
}

/// Document storage and views provided by the host editor
pub trait EditorHost: Send + Sync + 'static {
    /// Currently focused document, if any
    fn active_document(&self) -> Option<ActiveDocument>;

    /// Look a document up by its persisted identifier
    fn resolve(&self, id: &DocumentId) -> impl Future<Output = Option<DocumentKind>> + Send;

    /// Read the full content of a document
    fn read(&self, id: &DocumentId) -> impl Future<Output = io::Result<String>> + Send;

    /// Replace the full content of a document
    fn write(&self, id: &DocumentId, content: &str) -> impl Future<Output = io::Result<()>> + Send;

    /// Views currently showing a document
    fn open_views(&self, id: &DocumentId) -> Vec<ViewId>;

    /// Push content into a view, optionally dropping its edit history
    fn replace_view(&self, view: &ViewId, content: &str, clear_history: bool) -> Result<()>;
}

/// Focus and view bookkeeping driven by editor notifications
pub trait HostRegistry: Send + Sync + 'static {
    /// The editor focused a document; the host decides whether it is file backed
    fn focus(&self, document: DocumentId, length: usize, kind: DocumentKind);
    fn open_view(&self, view: ViewId, document: DocumentId);
    fn close_view(&self, view: &ViewId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligibility() {
        let mut doc = ActiveDocument {
            id: DocumentId::new("a.md"),
            length: 0,
            kind: DocumentKind::Text,
            file_backed: true,
        };
        assert!(doc.is_eligible());

        doc.file_backed = false;
        assert!(!doc.is_eligible());

        doc.file_backed = true;
        doc.kind = DocumentKind::Other;
        assert!(!doc.is_eligible());
    }
}
