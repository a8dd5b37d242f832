//! # Change Ledger
//!
//! Remembers, per document path, the heading lines seen the last time the
//! document was observed. The reconciler consults it on every modification so
//! that edits which leave the heading structure untouched do not trigger an
//! index rebuild.
//!
//! The ledger lives for the lifetime of its owner and is never persisted: a
//! path with no entry is "unknown" and counts as changed.
//!
//! Comparison is positional: reordering headings is a change, and so is
//! adding or removing one.

use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct HeadingLedger {
    entries: HashMap<String, Vec<String>>,
}

impl HeadingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn was_seen(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn recorded_headings(&self, path: &str) -> Option<&[String]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn update(&mut self, path: &str, headings: Vec<String>) {
        self.entries.insert(path.to_string(), headings);
    }

    /// Re-keys an entry after a rename, storing the freshly extracted headings.
    pub fn move_entry(&mut self, old_path: &str, new_path: &str, headings: Vec<String>) {
        self.entries.remove(old_path);
        self.entries.insert(new_path.to_string(), headings);
    }

    pub fn has_changed(&self, path: &str, headings: &[String]) -> bool {
        match self.entries.get(path) {
            None => true,
            Some(previous) => previous.as_slice() != headings,
        }
    }

    pub fn forget(&mut self, path: &str) -> Option<Vec<String>> {
        self.entries.remove(path)
    }

    /// Drops every entry at or below `folder`. Returns how many were removed.
    pub fn forget_within(&mut self, folder: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|path, _| !crate::model::is_within(folder, path));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
