//! Destructive wipe of a session's document
//!
//! A wipe keeps only the leading metadata header (a block opened and
//! closed by the delimiter line, `---` by default) and discards the rest.
//! Only one wipe may run at a time; see [`WipeEngine::begin`].

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};
use wipeout_protocol::{DocumentId, DocumentKind};
use wipeout_utils::{Result, WipeoutError};

use crate::host::EditorHost;

/// The header block to keep from `content`, or `""` if there is none
///
/// The first line must be the delimiter and a later line must close the
/// block; both are compared after trimming. The result always ends in
/// exactly one `\n`.
pub fn preserved_header(content: &str, delimiter: &str) -> String {
    let mut lines = content.lines();
    let opening = match lines.next() {
        Some(line) if line.trim() == delimiter => line,
        _ => return String::new(),
    };

    let mut block = vec![opening];
    for line in lines {
        block.push(line);
        if line.trim() == delimiter {
            let mut header = block.join("\n");
            header.push('\n');
            return header;
        }
    }

    // Unterminated header
    String::new()
}

/// What a wipe did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WipeOutcome {
    /// Content replaced with the preserved header
    Wiped {
        preserved_chars: usize,
        removed_chars: usize,
        views_refreshed: usize,
    },
    /// Target gone or no longer plain text; nothing written
    Skipped,
}

/// Proof that the caller holds the single-flight slot
///
/// The slot is released when this is dropped.
#[derive(Debug)]
pub struct WipeFlight {
    in_flight: Arc<AtomicBool>,
}

impl Drop for WipeFlight {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
pub struct WipeEngine {
    delimiter: String,
    in_flight: Arc<AtomicBool>,
}

impl WipeEngine {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the single-flight slot; `None` if a wipe is already running
    pub fn begin(&self) -> Option<WipeFlight> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| WipeFlight {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    /// Replace `target` with its preserved header and refresh open views
    ///
    /// Read and write failures are returned. View refresh failures are
    /// only logged.
    pub async fn run<H: EditorHost>(
        &self,
        _flight: &WipeFlight,
        host: &H,
        target: &DocumentId,
    ) -> Result<WipeOutcome> {
        match host.resolve(target).await {
            Some(DocumentKind::Text) => {}
            Some(DocumentKind::Other) => {
                info!(document = %target, "Wipe target is not plain text, skipping");
                return Ok(WipeOutcome::Skipped);
            }
            None => {
                info!(document = %target, "Wipe target no longer exists, skipping");
                return Ok(WipeOutcome::Skipped);
            }
        }

        let content = host
            .read(target)
            .await
            .map_err(|e| WipeoutError::FileRead {
                path: PathBuf::from(target.as_str()),
                source: e,
            })?;
        let preserved = preserved_header(&content, &self.delimiter);

        host.write(target, &preserved)
            .await
            .map_err(|e| WipeoutError::FileWrite {
                path: PathBuf::from(target.as_str()),
                source: e,
            })?;

        let mut views_refreshed = 0;
        for view in host.open_views(target) {
            match host.replace_view(&view, &preserved, true) {
                Ok(()) => views_refreshed += 1,
                Err(e) => warn!(view = %view, error = %e, "Failed to refresh view after wipe"),
            }
        }

        let preserved_chars = preserved.chars().count();
        let removed_chars = content.chars().count().saturating_sub(preserved_chars);
        info!(
            document = %target,
            removed_chars,
            views_refreshed,
            "Document wiped"
        );

        Ok(WipeOutcome::Wiped {
            preserved_chars,
            removed_chars,
            views_refreshed,
        })
    }
}
