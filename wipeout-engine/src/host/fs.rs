//! Filesystem-backed host: documents are files, identified by path

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use wipeout_protocol::{DocumentId, DocumentKind, EngineMessage, ViewId};
use wipeout_utils::{Result, WipeoutError};

use super::{ActiveDocument, EditorHost, HostRegistry};

pub struct FsHost {
    /// Extensions (lowercase, no dot) treated as plain text
    text_extensions: Vec<String>,
    active: RwLock<Option<ActiveDocument>>,
    /// Editor views registered over the bridge (view -> document)
    views: Mutex<HashMap<ViewId, DocumentId>>,
    /// Where view replacements are sent, if an editor is attached
    outbound: Option<mpsc::UnboundedSender<EngineMessage>>,
}

impl FsHost {
    /// Host with no editor views (file watch mode)
    pub fn new(text_extensions: Vec<String>) -> Self {
        Self {
            text_extensions: normalize_extensions(text_extensions),
            active: RwLock::new(None),
            views: Mutex::new(HashMap::new()),
            outbound: None,
        }
    }

    /// Host whose views live in an attached editor
    pub fn with_views(
        text_extensions: Vec<String>,
        outbound: mpsc::UnboundedSender<EngineMessage>,
    ) -> Self {
        Self {
            outbound: Some(outbound),
            ..Self::new(text_extensions)
        }
    }

    /// Classify a path by its extension
    pub fn kind_of(&self, path: &Path) -> DocumentKind {
        let is_text = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.text_extensions.iter().any(|known| *known == ext)
            })
            .unwrap_or(false);

        if is_text {
            DocumentKind::Text
        } else {
            DocumentKind::Other
        }
    }

    /// Focus a file on disk, measuring its current length
    pub async fn focus_path(&self, path: &Path) -> Result<ActiveDocument> {
        let path = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| WipeoutError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?;
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| WipeoutError::FileRead {
                path: path.clone(),
                source: e,
            })?;

        let document = ActiveDocument {
            id: DocumentId::new(path.to_string_lossy()),
            length: content.chars().count(),
            kind: self.kind_of(&path),
            file_backed: true,
        };
        *self.active.write() = Some(document.clone());
        Ok(document)
    }
}

fn normalize_extensions(extensions: Vec<String>) -> Vec<String> {
    extensions
        .into_iter()
        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
        .collect()
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.wipeout.tmp", name))
}

impl EditorHost for FsHost {
    fn active_document(&self) -> Option<ActiveDocument> {
        self.active.read().clone()
    }

    async fn resolve(&self, id: &DocumentId) -> Option<DocumentKind> {
        let path = Path::new(id.as_str());
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Some(self.kind_of(path)),
            _ => None,
        }
    }

    async fn read(&self, id: &DocumentId) -> io::Result<String> {
        tokio::fs::read_to_string(id.as_str()).await
    }

    async fn write(&self, id: &DocumentId, content: &str) -> io::Result<()> {
        // Write atomically: write to temp file, then rename
        let final_path = PathBuf::from(id.as_str());
        let temp_path = temp_path_for(&final_path);
        let permissions = tokio::fs::metadata(&final_path)
            .await
            .ok()
            .map(|meta| meta.permissions());

        {
            let mut file = tokio::fs::File::create(&temp_path).await?;
            file.write_all(content.as_bytes()).await?;
            file.sync_all().await?;
        }

        // The renamed file replaces the original inode; carry its mode over
        if let Some(permissions) = permissions {
            if let Err(e) = tokio::fs::set_permissions(&temp_path, permissions).await {
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(e);
            }
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &final_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e);
        }
        Ok(())
    }

    fn open_views(&self, id: &DocumentId) -> Vec<ViewId> {
        self.views
            .lock()
            .iter()
            .filter(|(_, document)| *document == id)
            .map(|(view, _)| view.clone())
            .collect()
    }

    fn replace_view(&self, view: &ViewId, content: &str, clear_history: bool) -> Result<()> {
        if !self.views.lock().contains_key(view) {
            return Err(WipeoutError::internal(format!("Unknown view {}", view)));
        }
        let outbound = self
            .outbound
            .as_ref()
            .ok_or_else(|| WipeoutError::internal("No editor attached"))?;

        outbound
            .send(EngineMessage::ReplaceView {
                view: view.clone(),
                content: content.to_string(),
                clear_history,
            })
            .map_err(|_| WipeoutError::protocol("Editor bridge closed"))
    }
}

impl HostRegistry for FsHost {
    fn focus(&self, document: DocumentId, length: usize, kind: DocumentKind) {
        let path = Path::new(document.as_str());
        let file_backed = path.is_file();
        *self.active.write() = Some(ActiveDocument {
            id: document,
            length,
            kind,
            file_backed,
        });
    }

    fn open_view(&self, view: ViewId, document: DocumentId) {
        self.views.lock().insert(view, document);
    }

    fn close_view(&self, view: &ViewId) {
        self.views.lock().remove(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> FsHost {
        FsHost::new(vec!["md".into(), ".TXT".into()])
    }

    #[test]
    fn test_kind_by_extension() {
        let host = host();
        assert_eq!(host.kind_of(Path::new("notes/a.md")), DocumentKind::Text);
        assert_eq!(host.kind_of(Path::new("notes/a.MD")), DocumentKind::Text);
        assert_eq!(host.kind_of(Path::new("notes/a.txt")), DocumentKind::Text);
        assert_eq!(host.kind_of(Path::new("notes/a.png")), DocumentKind::Other);
        assert_eq!(host.kind_of(Path::new("notes/README")), DocumentKind::Other);
    }

    #[tokio::test]
    async fn test_resolve_missing_and_directories() {
        let temp = tempfile::tempdir().unwrap();
        let host = host();

        let missing = DocumentId::new(temp.path().join("gone.md").to_string_lossy());
        assert_eq!(host.resolve(&missing).await, None);

        let dir = DocumentId::new(temp.path().to_string_lossy());
        assert_eq!(host.resolve(&dir).await, None);
    }

    #[tokio::test]
    async fn test_focus_path_measures_chars() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("draft.md");
        std::fs::write(&path, "héllo").unwrap();

        let host = host();
        let doc = host.focus_path(&path).await.unwrap();

        assert_eq!(doc.length, 5);
        assert_eq!(doc.kind, DocumentKind::Text);
        assert!(doc.is_eligible());
        assert_eq!(host.active_document(), Some(doc.clone()));
        assert_eq!(host.resolve(&doc.id).await, Some(DocumentKind::Text));
    }

    #[tokio::test]
    async fn test_focus_missing_path_fails() {
        let temp = tempfile::tempdir().unwrap();
        let err = host().focus_path(&temp.path().join("nope.md")).await.unwrap_err();
        assert!(matches!(err, WipeoutError::FileRead { .. }));
    }

    #[tokio::test]
    async fn test_write_replaces_content_atomically() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("draft.md");
        std::fs::write(&path, "---\na: 1\n---\nbody").unwrap();
        let id = DocumentId::new(path.to_string_lossy());

        let host = host();
        host.write(&id, "---\na: 1\n---\n").await.unwrap();

        assert_eq!(host.read(&id).await.unwrap(), "---\na: 1\n---\n");
        assert!(!temp_path_for(&path).exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_write_keeps_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("draft.md");
        std::fs::write(&path, "body").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();
        let id = DocumentId::new(path.to_string_lossy());

        host().write(&id, "").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_views_forwarded_to_editor() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let host = FsHost::with_views(vec!["md".into()], tx);
        let doc = DocumentId::new("/notes/a.md");
        let view = ViewId::new("leaf-1");

        host.open_view(view.clone(), doc.clone());
        host.open_view(ViewId::new("leaf-2"), DocumentId::new("/notes/b.md"));
        assert_eq!(host.open_views(&doc), vec![view.clone()]);

        host.replace_view(&view, "", true).unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            EngineMessage::ReplaceView {
                view: view.clone(),
                content: String::new(),
                clear_history: true,
            }
        );

        host.close_view(&view);
        assert!(host.open_views(&doc).is_empty());
        assert!(host.replace_view(&view, "", true).is_err());
    }

    #[test]
    fn test_focus_checks_file_backing() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("a.md");
        std::fs::write(&path, "x").unwrap();
        let host = host();

        host.focus(DocumentId::new(path.to_string_lossy()), 1, DocumentKind::Text);
        assert!(host.active_document().unwrap().file_backed);

        host.focus(DocumentId::new("Untitled"), 0, DocumentKind::Text);
        assert!(!host.active_document().unwrap().file_backed);
    }
}
