//! Insertion detection from editor change signals
//!
//! Two independent channels report edits. Either one may fire for a
//! given keystroke, both may, or (on some host editing paths) only the
//! fallback does. Feeding both into the idle clock is safe because
//! recording an insertion is idempotent.

use wipeout_protocol::DocumentId;

/// A change notification from the host editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditSignal {
    /// Structural transaction: lengths of every inserted text fragment
    Transaction {
        document: DocumentId,
        inserted: Vec<usize>,
    },
    /// Generic content change carrying the new total character count
    ContentChanged { document: DocumentId, length: usize },
}

impl EditSignal {
    pub fn document(&self) -> &DocumentId {
        match self {
            EditSignal::Transaction { document, .. } => document,
            EditSignal::ContentChanged { document, .. } => document,
        }
    }
}

/// Decides whether a signal proves at least one character was inserted
#[derive(Debug, Clone)]
pub struct InputClassifier {
    last_observed_length: usize,
}

impl InputClassifier {
    pub fn new(initial_length: usize) -> Self {
        Self {
            last_observed_length: initial_length,
        }
    }

    pub fn last_observed_length(&self) -> usize {
        self.last_observed_length
    }

    /// Classify a signal already known to target the session document
    pub fn classify(&mut self, signal: &EditSignal) -> bool {
        match signal {
            // Deletions in the same transaction do not cancel an insertion
            EditSignal::Transaction { inserted, .. } => inserted_chars(inserted) > 0,
            EditSignal::ContentChanged { length, .. } => {
                let grew = *length > self.last_observed_length;
                self.last_observed_length = *length;
                grew
            }
        }
    }
}

/// Total characters inserted by a transaction
pub fn inserted_chars(inserted: &[usize]) -> usize {
    inserted.iter().fold(0usize, |acc, n| acc.saturating_add(*n))
}
