//! In-memory host for embedding and tests

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use parking_lot::Mutex;
use wipeout_protocol::{DocumentId, DocumentKind, ViewId};
use wipeout_utils::{Result, WipeoutError};

use super::{ActiveDocument, EditorHost, HostRegistry};

/// Snapshot of an in-memory view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryView {
    pub document: DocumentId,
    pub content: String,
    pub history_cleared: bool,
    /// Make `replace_view` fail for this view
    pub broken: bool,
}

#[derive(Debug, Default)]
struct MemoryState {
    documents: HashMap<DocumentId, (DocumentKind, String)>,
    views: HashMap<ViewId, MemoryView>,
    active: Option<ActiveDocument>,
    writes: usize,
    fail_io: bool,
    write_delay: Option<Duration>,
}

/// Documents and views held in memory
#[derive(Debug, Default)]
pub struct MemoryHost {
    state: Mutex<MemoryState>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_document(&self, id: impl Into<DocumentId>, kind: DocumentKind, content: &str) {
        self.state
            .lock()
            .documents
            .insert(id.into(), (kind, content.to_string()));
    }

    pub fn remove_document(&self, id: &DocumentId) {
        self.state.lock().documents.remove(id);
    }

    /// Focus a stored document
    pub fn set_active(&self, id: &DocumentId) {
        let mut state = self.state.lock();
        let active = state.documents.get(id).map(|(kind, content)| ActiveDocument {
            id: id.clone(),
            length: content.chars().count(),
            kind: *kind,
            file_backed: true,
        });
        state.active = active;
    }

    pub fn content(&self, id: &DocumentId) -> Option<String> {
        self.state
            .lock()
            .documents
            .get(id)
            .map(|(_, content)| content.clone())
    }

    /// Number of completed writes
    pub fn write_count(&self) -> usize {
        self.state.lock().writes
    }

    /// Make reads and writes fail
    pub fn fail_io(&self, fail: bool) {
        self.state.lock().fail_io = fail;
    }

    /// Delay every write by `delay` (simulates slow storage)
    pub fn set_write_delay(&self, delay: Duration) {
        self.state.lock().write_delay = Some(delay);
    }

    pub fn add_view(&self, view: impl Into<String>, document: &DocumentId) {
        let content = self.content(document).unwrap_or_default();
        self.state.lock().views.insert(
            ViewId::new(view),
            MemoryView {
                document: document.clone(),
                content,
                history_cleared: false,
                broken: false,
            },
        );
    }

    pub fn break_view(&self, view: &ViewId) {
        if let Some(v) = self.state.lock().views.get_mut(view) {
            v.broken = true;
        }
    }

    pub fn view(&self, view: &ViewId) -> Option<MemoryView> {
        self.state.lock().views.get(view).cloned()
    }

    /// Apply typing to a stored document, returning its new length
    pub fn append(&self, id: &DocumentId, text: &str) -> usize {
        let mut state = self.state.lock();
        match state.documents.get_mut(id) {
            Some((_, content)) => {
                content.push_str(text);
                content.chars().count()
            }
            None => 0,
        }
    }
}

fn simulated_failure() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "simulated I/O failure")
}

impl EditorHost for MemoryHost {
    fn active_document(&self) -> Option<ActiveDocument> {
        self.state.lock().active.clone()
    }

    async fn resolve(&self, id: &DocumentId) -> Option<DocumentKind> {
        self.state.lock().documents.get(id).map(|(kind, _)| *kind)
    }

    async fn read(&self, id: &DocumentId) -> io::Result<String> {
        let state = self.state.lock();
        if state.fail_io {
            return Err(simulated_failure());
        }
        state
            .documents
            .get(id)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, id.to_string()))
    }

    async fn write(&self, id: &DocumentId, content: &str) -> io::Result<()> {
        let delay = self.state.lock().write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        if state.fail_io {
            return Err(simulated_failure());
        }
        let entry = state
            .documents
            .get_mut(id)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, id.to_string()))?;
        entry.1 = content.to_string();
        state.writes += 1;
        Ok(())
    }

    fn open_views(&self, id: &DocumentId) -> Vec<ViewId> {
        self.state
            .lock()
            .views
            .iter()
            .filter(|(_, v)| v.document == *id)
            .map(|(view, _)| view.clone())
            .collect()
    }

    fn replace_view(&self, view: &ViewId, content: &str, clear_history: bool) -> Result<()> {
        let mut state = self.state.lock();
        let entry = state
            .views
            .get_mut(view)
            .ok_or_else(|| WipeoutError::internal(format!("Unknown view {}", view)))?;
        if entry.broken {
            return Err(WipeoutError::internal(format!("View {} is detached", view)));
        }
        entry.content = content.to_string();
        entry.history_cleared |= clear_history;
        Ok(())
    }
}

impl HostRegistry for MemoryHost {
    fn focus(&self, document: DocumentId, length: usize, kind: DocumentKind) {
        let mut state = self.state.lock();
        let file_backed = state.documents.contains_key(&document);
        state.active = Some(ActiveDocument {
            id: document,
            length,
            kind,
            file_backed,
        });
    }

    fn open_view(&self, view: ViewId, document: DocumentId) {
        self.add_view(view.as_str(), &document);
    }

    fn close_view(&self, view: &ViewId) {
        self.state.lock().views.remove(view);
    }
}
