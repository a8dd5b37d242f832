//! # Storage Layer
//!
//! This module defines the vault abstraction for indice. The [`VaultStore`]
//! trait is the only way the rest of the crate touches documents and folders.
//!
//! ## Design Rationale
//!
//! Note-taking hosts expose a live, mutable object graph (folders pointing at
//! children, files pointing at parents). Indice instead asks narrow
//! repository-style questions:
//!
//! - which documents / folders exist ([`VaultStore::documents`], [`VaultStore::folders`])
//! - what is directly inside a folder ([`VaultStore::child_documents`], [`VaultStore::child_folders`])
//! - what is the parent of a path ([`VaultStore::parent`])
//! - read / write a document's full text
//!
//! Every answer is a plain value ([`Document`], [`Folder`]) computed on demand,
//! so nothing goes stale when the vault changes underneath us, and the whole
//! core can be tested against [`memory::MemVault`] without a filesystem.
//!
//! Only [`VaultStore::documents`], [`VaultStore::folders`], [`VaultStore::read`]
//! and [`VaultStore::write`] are required; the accessors have default
//! implementations derived from them that backends may override when they
//! can answer more cheaply.
//!
//! ## Implementations
//!
//! - [`fs::FsVault`]: A directory on disk. Atomic writes, hidden entries skipped.
//! - [`memory::MemVault`]: In-memory vault for tests, with helpers to simulate
//!   renames, deletions and write failures.
//!
//! ## Ordering
//!
//! [`VaultStore::child_folders`] returns folders in path order. Outline output
//! must be byte-for-byte reproducible, so enumeration order may not depend on
//! hash maps or directory listing order.

use crate::error::Result;
use crate::model::{normalize_path, parent_path, Document, Entry, Folder, ROOT_PATH};
use crate::tags::extract_tags;

pub mod fs;
pub mod memory;

/// Abstract interface for a vault of markdown documents.
pub trait VaultStore {
    /// All documents in the vault, at any depth.
    fn documents(&self) -> Result<Vec<Document>>;

    /// All folders in the vault, excluding the root.
    fn folders(&self) -> Result<Vec<Folder>>;

    /// Read the full text of a document.
    fn read(&self, doc: &Document) -> Result<String>;

    /// Replace the full text of a document.
    /// MUST be atomic from the reader's perspective.
    fn write(&self, doc: &Document, content: &str) -> Result<()>;

    /// Tags of a document, `#`-prefixed.
    fn tags(&self, doc: &Document) -> Result<Vec<String>> {
        Ok(extract_tags(&self.read(doc)?))
    }

    /// Documents whose direct parent is `folder`, in no particular order.
    fn child_documents(&self, folder: &Folder) -> Result<Vec<Document>> {
        Ok(self
            .documents()?
            .into_iter()
            .filter(|doc| doc.parent.as_deref() == Some(folder.path.as_str()))
            .collect())
    }

    /// Folders whose direct parent is `folder`, in path order.
    fn child_folders(&self, folder: &Folder) -> Result<Vec<Folder>> {
        let mut children: Vec<Folder> = self
            .folders()?
            .into_iter()
            .filter(|child| child.parent.as_deref() == Some(folder.path.as_str()))
            .collect();
        children.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(children)
    }

    fn document(&self, path: &str) -> Result<Option<Document>> {
        let path = normalize_path(path);
        Ok(self.documents()?.into_iter().find(|doc| doc.path == path))
    }

    fn folder(&self, path: &str) -> Result<Option<Folder>> {
        let path = normalize_path(path);
        if path == ROOT_PATH {
            return Ok(Some(Folder::root()));
        }
        Ok(self.folders()?.into_iter().find(|folder| folder.path == path))
    }

    /// Resolves a path to whatever currently lives there.
    fn entry(&self, path: &str) -> Result<Option<Entry>> {
        if let Some(doc) = self.document(path)? {
            return Ok(Some(Entry::Document(doc)));
        }
        Ok(self.folder(path)?.map(Entry::Folder))
    }

    /// The folder containing `path`, or `None` for the root.
    fn parent(&self, path: &str) -> Result<Option<Folder>> {
        match parent_path(&normalize_path(path)) {
            Some(parent) => self.folder(&parent),
            None => Ok(None),
        }
    }
}
