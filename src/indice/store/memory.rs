use super::VaultStore;
use crate::error::{IndiceError, Result};
use crate::model::{is_within, normalize_path, parent_path, Document, Folder, ROOT_PATH};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// In-memory vault for testing.
///
/// Uses `RefCell` for interior mutability since indice is single-threaded,
/// letting [`VaultStore::write`] take `&self` like the filesystem backend.
/// Folders are created implicitly for every document's ancestors.
#[derive(Default)]
pub struct MemVault {
    documents: RefCell<BTreeMap<String, String>>,
    folders: RefCell<BTreeSet<String>>,
    failing_writes: RefCell<HashSet<String>>,
    failing_reads: RefCell<HashSet<String>>,
    reads: RefCell<BTreeMap<String, usize>>,
    writes: Cell<usize>,
}

impl MemVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemVault::insert`].
    pub fn with_document(self, path: &str, content: &str) -> Self {
        self.insert(path, content);
        self
    }

    /// Builder form of [`MemVault::add_folder`].
    pub fn with_folder(self, path: &str) -> Self {
        self.add_folder(path);
        self
    }

    /// Creates or replaces a document without counting it as a store write.
    pub fn insert(&self, path: &str, content: &str) -> Document {
        let doc = Document::from_path(path);
        if let Some(parent) = &doc.parent {
            self.add_folder(parent);
        }
        self.documents
            .borrow_mut()
            .insert(doc.path.clone(), content.to_string());
        doc
    }

    /// Registers a folder and all of its ancestors.
    pub fn add_folder(&self, path: &str) {
        let mut current = Some(normalize_path(path));
        let mut folders = self.folders.borrow_mut();
        while let Some(path) = current {
            if path == ROOT_PATH {
                break;
            }
            current = parent_path(&path);
            folders.insert(path);
        }
    }

    /// Moves a document, or a folder with everything below it.
    pub fn rename(&self, from: &str, to: &str) {
        let from = normalize_path(from);
        let to = normalize_path(to);
        let rebase = |path: &str| format!("{}{}", to, &path[from.len()..]);

        let moved_docs: Vec<(String, String)> = self
            .documents
            .borrow()
            .iter()
            .filter(|(path, _)| is_within(&from, path))
            .map(|(path, content)| (path.clone(), content.clone()))
            .collect();
        let moved_folders: Vec<String> = self
            .folders
            .borrow()
            .iter()
            .filter(|path| is_within(&from, path))
            .cloned()
            .collect();

        for folder in &moved_folders {
            self.folders.borrow_mut().remove(folder);
        }
        for folder in &moved_folders {
            self.add_folder(&rebase(folder));
        }
        for (path, content) in moved_docs {
            self.documents.borrow_mut().remove(&path);
            self.insert(&rebase(&path), &content);
        }
    }

    /// Deletes a document, or a folder with everything below it.
    pub fn remove(&self, path: &str) {
        let path = normalize_path(path);
        self.documents
            .borrow_mut()
            .retain(|doc, _| !is_within(&path, doc));
        self.folders
            .borrow_mut()
            .retain(|folder| !is_within(&path, folder));
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.documents.borrow().get(&normalize_path(path)).cloned()
    }

    /// Makes every subsequent write to `path` fail.
    pub fn fail_writes_to(&self, path: &str) {
        self.failing_writes.borrow_mut().insert(normalize_path(path));
    }

    /// Makes every subsequent read of `path` fail.
    pub fn fail_reads_of(&self, path: &str) {
        self.failing_reads.borrow_mut().insert(normalize_path(path));
    }

    /// Number of [`VaultStore::read`] calls for `path`.
    pub fn reads_of(&self, path: &str) -> usize {
        self.reads
            .borrow()
            .get(&normalize_path(path))
            .copied()
            .unwrap_or(0)
    }

    /// Number of successful [`VaultStore::write`] calls.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl VaultStore for MemVault {
    fn documents(&self) -> Result<Vec<Document>> {
        Ok(self
            .documents
            .borrow()
            .keys()
            .map(|path| Document::from_path(path.as_str()))
            .collect())
    }

    fn folders(&self) -> Result<Vec<Folder>> {
        Ok(self
            .folders
            .borrow()
            .iter()
            .map(|path| Folder::from_path(path.as_str()))
            .collect())
    }

    fn read(&self, doc: &Document) -> Result<String> {
        *self.reads.borrow_mut().entry(doc.path.clone()).or_insert(0) += 1;
        if self.failing_reads.borrow().contains(&doc.path) {
            return Err(IndiceError::Store("Simulated read error".to_string()));
        }
        self.documents
            .borrow()
            .get(&doc.path)
            .cloned()
            .ok_or_else(|| IndiceError::NotFound(doc.path.clone()))
    }

    fn write(&self, doc: &Document, content: &str) -> Result<()> {
        if self.failing_writes.borrow().contains(&doc.path) {
            return Err(IndiceError::Store("Simulated write error".to_string()));
        }
        self.insert(&doc.path, content);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
