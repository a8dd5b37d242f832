use super::VaultStore;
use crate::config::IndiceConfig;
use crate::error::{IndiceError, Result};
use crate::model::{normalize_path, Document, Folder, ROOT_PATH};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::warn;
use uuid::Uuid;
use walkdir::{DirEntry, WalkDir};

/// A vault backed by a directory on disk.
///
/// - Documents are files whose extension is one of `extensions` (default `md`).
/// - Hidden entries (`.obsidian`, `.git`, `.indice`, temp files) and folders
///   named in `ignore` are invisible, together with everything below them.
/// - Enumeration is sorted by file name so results never depend on the
///   directory listing order of the platform.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    extensions: Vec<String>,
    ignore: Vec<String>,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: vec!["md".to_string()],
            ignore: Vec::new(),
        }
    }

    pub fn from_config(root: impl Into<PathBuf>, config: &IndiceConfig) -> Self {
        Self::new(root)
            .with_extensions(&config.extensions())
            .with_ignore(&config.ignore)
    }

    pub fn with_extensions(mut self, extensions: &[String]) -> Self {
        self.extensions = extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn with_ignore(mut self, names: &[String]) -> Self {
        self.ignore = names.to_vec();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a file name has one of the document extensions.
    pub fn is_document_name(&self, name: &str) -> bool {
        match name.rfind('.') {
            Some(dot) if dot > 0 => {
                let ext = name[dot + 1..].to_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            }
            _ => false,
        }
    }

    /// Whether an entry with this name is hidden from the vault.
    pub fn is_ignored_name(&self, name: &str) -> bool {
        name.starts_with('.') || self.ignore.iter().any(|ignored| ignored == name)
    }

    /// Converts an absolute filesystem path into a vault path.
    /// Returns `None` for paths outside the vault or inside ignored folders.
    pub fn vault_path(&self, absolute: &Path) -> Option<String> {
        let relative = absolute.strip_prefix(&self.root).ok()?;
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str()?;
                    if self.is_ignored_name(part) {
                        return None;
                    }
                    parts.push(part);
                }
                _ => return None,
            }
        }
        Some(normalize_path(&parts.join("/")))
    }

    fn absolute(&self, path: &str) -> PathBuf {
        if path == ROOT_PATH {
            return self.root.clone();
        }
        path.split('/')
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }

    /// Visible entries below `dir`, at most `max_depth` levels down, sorted
    /// by file name.
    fn walk_from(
        &self,
        dir: &Path,
        max_depth: usize,
    ) -> impl Iterator<Item = Result<DirEntry>> + '_ {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| !self.is_ignored_name(name))
            })
            .map(|entry| entry.map_err(|e| IndiceError::Io(e.into())))
    }

    fn collect_documents(&self, dir: &Path, max_depth: usize) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        for entry in self.walk_from(dir, max_depth) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let is_doc = entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.is_document_name(name));
            if let (true, Some(path)) = (is_doc, self.vault_path(entry.path())) {
                docs.push(Document::from_path(path));
            }
        }
        Ok(docs)
    }

    fn collect_folders(&self, dir: &Path, max_depth: usize) -> Result<Vec<Folder>> {
        let mut folders = Vec::new();
        for entry in self.walk_from(dir, max_depth) {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if let Some(path) = self.vault_path(entry.path()) {
                folders.push(Folder::from_path(path));
            }
        }
        Ok(folders)
    }
}

impl VaultStore for FsVault {
    fn documents(&self) -> Result<Vec<Document>> {
        self.collect_documents(&self.root, usize::MAX)
    }

    fn folders(&self) -> Result<Vec<Folder>> {
        self.collect_folders(&self.root, usize::MAX)
    }

    /// Bytes that are not valid UTF-8 are replaced rather than failing the
    /// read, so one damaged file cannot block the outlines that list it.
    fn read(&self, doc: &Document) -> Result<String> {
        let path = self.absolute(&doc.path);
        if !path.is_file() {
            return Err(IndiceError::NotFound(doc.path.clone()));
        }
        let bytes = fs::read(path).map_err(IndiceError::Io)?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(path = %doc.path, "Document is not valid UTF-8, decoding lossily");
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }

    fn child_documents(&self, folder: &Folder) -> Result<Vec<Document>> {
        let dir = self.absolute(&folder.path);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        self.collect_documents(&dir, 1)
    }

    fn child_folders(&self, folder: &Folder) -> Result<Vec<Folder>> {
        let dir = self.absolute(&folder.path);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut children = self.collect_folders(&dir, 1)?;
        children.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(children)
    }

    fn write(&self, doc: &Document, content: &str) -> Result<()> {
        let target = self.absolute(&doc.path);
        let dir = target
            .parent()
            .ok_or_else(|| IndiceError::Store(format!("No parent directory for {}", doc.path)))?;
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(IndiceError::Io)?;
        }

        // Atomic write: hidden temp file in the same folder, then rename
        let tmp = dir.join(format!(".{}.{}.tmp", doc.basename, Uuid::new_v4()));
        fs::write(&tmp, content).map_err(IndiceError::Io)?;
        fs::rename(&tmp, &target).map_err(IndiceError::Io)?;
        Ok(())
    }

    fn document(&self, path: &str) -> Result<Option<Document>> {
        let path = normalize_path(path);
        let absolute = self.absolute(&path);
        let visible = self.vault_path(&absolute).as_deref() == Some(path.as_str());
        let doc = Document::from_path(path);
        if visible && absolute.is_file() && self.is_document_name(doc.name()) {
            Ok(Some(doc))
        } else {
            Ok(None)
        }
    }

    fn folder(&self, path: &str) -> Result<Option<Folder>> {
        let path = normalize_path(path);
        if path == ROOT_PATH {
            return Ok(Some(Folder::root()));
        }
        let absolute = self.absolute(&path);
        let visible = self.vault_path(&absolute).as_deref() == Some(path.as_str());
        if visible && absolute.is_dir() {
            Ok(Some(Folder::from_path(path)))
        } else {
            Ok(None)
        }
    }
}
