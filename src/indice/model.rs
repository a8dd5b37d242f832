//! # Domain Model: Vault Paths, Documents and Folders
//!
//! A vault is a tree of folders holding markdown documents. Every entity is
//! identified by its **vault path**: relative to the vault root, `/`-separated,
//! without a leading slash.
//!
//! ```text
//! /                      <-- the root folder (path "/", empty name)
//! ├── Home.md            <-- path "Home.md", parent "/"
//! └── Projects           <-- path "Projects", parent "/"
//!     ├── Alpha.md       <-- path "Projects/Alpha.md", parent "Projects"
//!     └── Sub            <-- path "Projects/Sub", parent "Projects"
//! ```
//!
//! Paths change on rename, so nothing in the crate holds on to an entity
//! across events: documents and folders are plain values re-resolved from the
//! store whenever they are needed.
//!
//! ## Governing Scope
//!
//! An index document governs its parent folder and everything nested below
//! it. [`is_within`] answers "does `scope` contain `path`?" on whole path
//! components, so `Proj` does not contain `Projects/Alpha.md`, while the root
//! contains everything.

/// Path of the vault root folder.
pub const ROOT_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Document {
    pub path: String,
    /// File name without extension, used as link text.
    pub basename: String,
    pub extension: String,
    /// Path of the folder holding the document (`/` at the vault root).
    pub parent: Option<String>,
}

impl Document {
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = normalize_path(&path.into());
        let name = file_name(&path).to_string();
        let (basename, extension) = match name.rfind('.') {
            Some(dot) if dot > 0 => (name[..dot].to_string(), name[dot + 1..].to_string()),
            _ => (name.clone(), String::new()),
        };
        let parent = parent_path(&path);
        Self {
            path,
            basename,
            extension,
            parent,
        }
    }

    /// File name including the extension (`Alpha.md`).
    pub fn name(&self) -> &str {
        file_name(&self.path)
    }

    /// The path without its extension, as used in wiki-link targets.
    pub fn link_target(&self) -> &str {
        if self.extension.is_empty() {
            return &self.path;
        }
        self.path
            .strip_suffix(&format!(".{}", self.extension))
            .unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Folder {
    pub path: String,
    pub name: String,
    pub parent: Option<String>,
}

impl Folder {
    pub fn root() -> Self {
        Self {
            path: ROOT_PATH.to_string(),
            name: String::new(),
            parent: None,
        }
    }

    pub fn from_path(path: impl Into<String>) -> Self {
        let path = normalize_path(&path.into());
        if path == ROOT_PATH {
            return Self::root();
        }
        Self {
            name: file_name(&path).to_string(),
            parent: parent_path(&path),
            path,
        }
    }

    pub fn is_root(&self) -> bool {
        self.path == ROOT_PATH
    }
}

/// Either side of the vault tree, as delivered by lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Document(Document),
    Folder(Folder),
}

impl Entry {
    pub fn path(&self) -> &str {
        match self {
            Entry::Document(doc) => &doc.path,
            Entry::Folder(folder) => &folder.path,
        }
    }

    pub fn parent(&self) -> Option<&str> {
        match self {
            Entry::Document(doc) => doc.parent.as_deref(),
            Entry::Folder(folder) => folder.parent.as_deref(),
        }
    }
}

/// Strips surrounding slashes and backslashes; an empty path is the root.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let trimmed = unified.trim_matches('/');
    if trimmed.is_empty() || trimmed == "." {
        ROOT_PATH.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parent folder path of a vault path. The root has no parent.
pub fn parent_path(path: &str) -> Option<String> {
    if path == ROOT_PATH {
        return None;
    }
    match path.rfind('/') {
        Some(slash) => Some(path[..slash].to_string()),
        None => Some(ROOT_PATH.to_string()),
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether `path` is `scope` itself or nested anywhere below it.
pub fn is_within(scope: &str, path: &str) -> bool {
    if scope == ROOT_PATH {
        return true;
    }
    path == scope
        || path
            .strip_prefix(scope)
            .is_some_and(|rest| rest.starts_with('/'))
}
