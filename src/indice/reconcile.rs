//! # Reconciliation
//!
//! The [`Reconciler`] keeps index regions in step with the vault. It reacts to
//! lifecycle events (create, rename, modify, delete) and to explicit commands,
//! and decides which index documents need their region regenerated.
//!
//! ## Governing Scope
//!
//! An index document governs its parent folder and everything nested below
//! it. A change inside folder `F` therefore rebuilds every index document
//! whose parent is `F`, an ancestor of `F`, or the vault root.
//!
//! ## Change Detection
//!
//! Edits are frequent and most of them do not touch headings. On every
//! modification the reconciler extracts the heading lines and compares them
//! with the [`HeadingLedger`]. Only a change (or a document seen for the first
//! time) triggers a rebuild. The ledger is owned here and lives as long as
//! the reconciler; [`Reconciler::teardown`] clears it.
//!
//! ## Failure Semantics
//!
//! Rebuilds are best effort per index document: a failure is logged, recorded
//! in the [`RebuildReport`] and the remaining documents are still processed.
//! Index documents are only written when their text actually changes, which
//! also stops the write of an index document from feeding back into another
//! rebuild.

use crate::config::DEFAULT_MAX_DEPTH;
use crate::editor::{offset_to_pos, pos_to_offset, EditorView};
use crate::error::{IndiceError, Result};
use crate::events::VaultEvent;
use crate::headings::extract_headings;
use crate::ledger::HeadingLedger;
use crate::model::{normalize_path, parent_path, Document, Entry, Folder};
use crate::outline::OutlineBuilder;
use crate::region;
use crate::store::VaultStore;
use crate::tags::has_index_tag;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct RebuildFailure {
    pub path: String,
    pub error: IndiceError,
}

/// Outcome of one rebuild pass over a set of index documents.
#[derive(Debug, Default)]
pub struct RebuildReport {
    pub rewritten: Vec<String>,
    pub unchanged: Vec<String>,
    pub failed: Vec<RebuildFailure>,
}

impl RebuildReport {
    /// True when no index document was touched at all.
    pub fn is_empty(&self) -> bool {
        self.rewritten.is_empty() && self.unchanged.is_empty() && self.failed.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn merge(&mut self, other: RebuildReport) {
        self.rewritten.extend(other.rewritten);
        self.unchanged.extend(other.unchanged);
        self.failed.extend(other.failed);
    }
}

pub struct Reconciler<S: VaultStore> {
    store: S,
    ledger: HeadingLedger,
    max_depth: usize,
}

impl<S: VaultStore> Reconciler<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            ledger: HeadingLedger::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ledger(&self) -> &HeadingLedger {
        &self.ledger
    }

    /// Resolves an event against the store and dispatches it. Events for
    /// paths that are not (or no longer) documents or folders are ignored.
    pub fn handle(&mut self, event: &VaultEvent) -> Result<RebuildReport> {
        debug!(event = %event, "Handling vault event");
        match event {
            VaultEvent::Created(path) => match self.store.entry(path)? {
                Some(entry) => self.on_create(&entry),
                None => Ok(ignored(path)),
            },
            VaultEvent::Modified(path) => match self.store.document(path)? {
                Some(doc) => self.on_modify(&doc),
                None => Ok(ignored(path)),
            },
            VaultEvent::Renamed { from, to } => match self.store.entry(to)? {
                Some(entry) => self.on_rename(&entry, from),
                None => Ok(ignored(to)),
            },
            VaultEvent::Deleted(path) => self.on_delete(path),
        }
    }

    pub fn on_create(&mut self, entry: &Entry) -> Result<RebuildReport> {
        match entry {
            Entry::Document(doc) => {
                let headings = extract_headings(&self.store.read(doc)?);
                self.ledger.update(&doc.path, headings);
                match doc.parent.as_deref() {
                    Some(parent) => self.rebuild_governing(parent),
                    None => Ok(RebuildReport::default()),
                }
            }
            Entry::Folder(folder) => self.rebuild_governing(&folder.path),
        }
    }

    /// Handles an entry that now lives at its current path and used to live
    /// at `old_path`. Index documents around both locations are rebuilt.
    pub fn on_rename(&mut self, entry: &Entry, old_path: &str) -> Result<RebuildReport> {
        let old_path = normalize_path(old_path);
        let mut scopes = Vec::new();

        match entry {
            Entry::Document(doc) => {
                let headings = extract_headings(&self.store.read(doc)?);
                self.ledger.move_entry(&old_path, &doc.path, headings);
                if let Some(parent) = &doc.parent {
                    scopes.push(parent.clone());
                }
            }
            Entry::Folder(folder) => {
                // Entries under the old name are re-seeded on their next modify
                self.ledger.forget_within(&old_path);
                scopes.push(folder.path.clone());
            }
        }

        if let Some(old_parent) = parent_path(&old_path) {
            if !scopes.contains(&old_parent) && self.store.folder(&old_parent)?.is_some() {
                scopes.push(old_parent);
            }
        }

        debug!(from = %old_path, to = %entry.path(), "Entry renamed");
        self.rebuild_scopes(&scopes)
    }

    /// Rebuilds when the heading structure changed, or when the document has
    /// never been seen before. The ledger always ends up holding the current
    /// headings.
    pub fn on_modify(&mut self, doc: &Document) -> Result<RebuildReport> {
        let headings = extract_headings(&self.store.read(doc)?);
        let first_sight = !self.ledger.was_seen(&doc.path);
        let changed = self.ledger.has_changed(&doc.path, &headings);
        self.ledger.update(&doc.path, headings);

        if !changed {
            debug!(path = %doc.path, "Headings unchanged, skipping rebuild");
            return Ok(RebuildReport::default());
        }

        debug!(path = %doc.path, first_sight, "Headings changed");
        match doc.parent.as_deref() {
            Some(parent) => self.rebuild_governing(parent),
            None => Ok(RebuildReport::default()),
        }
    }

    /// Handles a document or folder that no longer exists at `path`.
    pub fn on_delete(&mut self, path: &str) -> Result<RebuildReport> {
        let path = normalize_path(path);
        let forgotten = self.ledger.forget_within(&path);
        debug!(path = %path, forgotten, "Entry deleted");

        match parent_path(&path) {
            Some(parent) if self.store.folder(&parent)?.is_some() => {
                self.rebuild_governing(&parent)
            }
            _ => Ok(RebuildReport::default()),
        }
    }

    /// Index documents whose governing scope contains `folder`.
    pub fn index_documents_governing(&self, folder: &str) -> Result<Vec<Document>> {
        self.index_documents_for(&[normalize_path(folder)])
    }

    pub fn rebuild_governing(&self, folder: &str) -> Result<RebuildReport> {
        self.rebuild_scopes(&[normalize_path(folder)])
    }

    /// Observes every document, then rebuilds each affected index document
    /// once.
    pub fn rebuild_all(&mut self) -> Result<RebuildReport> {
        let mut scopes: Vec<String> = Vec::new();

        for doc in self.store.documents()? {
            let content = match self.store.read(&doc) {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %doc.path, error = %e, "Failed to read document");
                    continue;
                }
            };
            let headings = extract_headings(&content);
            let changed = self.ledger.has_changed(&doc.path, &headings);
            self.ledger.update(&doc.path, headings);

            if let (true, Some(parent)) = (changed, doc.parent) {
                if !scopes.contains(&parent) {
                    scopes.push(parent);
                }
            }
        }

        debug!(folders = scopes.len(), "Folders with heading changes");
        self.rebuild_scopes(&scopes)
    }

    /// Builds the outline of the active document's folder, leaving the
    /// document itself out, and writes it into the view: over the existing
    /// region if there is one, at the cursor otherwise.
    ///
    /// Returns `false` when the document has no folder to index.
    pub fn build_index(&self, active: &Document, view: &mut dyn EditorView) -> Result<bool> {
        let Some(folder) = self.parent_folder(active)? else {
            return Ok(false);
        };

        let outline = self.outline_builder().build(&folder, 0, Some(active))?;
        let text = view.text();
        let cursor = pos_to_offset(&text, view.cursor());
        let edit = region::plan_edit(&text, cursor, &outline);

        view.replace_range(
            &edit.text,
            offset_to_pos(&text, edit.range.start),
            offset_to_pos(&text, edit.range.end),
        );
        debug!(path = %active.path, inserted = edit.is_insertion(), "Index built");
        Ok(true)
    }

    /// The outline of a folder, as it would be written into its index.
    pub fn outline(&self, folder: &Folder) -> Result<String> {
        self.outline_builder().build(folder, 0, None)
    }

    pub fn teardown(&mut self) {
        debug!(entries = self.ledger.len(), "Clearing heading ledger");
        self.ledger.clear();
    }

    fn outline_builder(&self) -> OutlineBuilder<'_, S> {
        OutlineBuilder::new(&self.store).with_max_depth(self.max_depth)
    }

    fn parent_folder(&self, doc: &Document) -> Result<Option<Folder>> {
        match doc.parent.as_deref() {
            Some(parent) => self.store.folder(parent),
            None => Ok(None),
        }
    }

    /// Index documents governing any of `scopes`, in path order. Only
    /// documents directly inside a scope or one of its ancestors can govern
    /// it, so only their tags are read.
    fn index_documents_for(&self, scopes: &[String]) -> Result<Vec<Document>> {
        let mut candidates: Vec<String> = Vec::new();
        for scope in scopes {
            let mut current = Some(scope.clone());
            while let Some(path) = current {
                current = parent_path(&path);
                if !candidates.contains(&path) {
                    candidates.push(path);
                }
            }
        }

        let mut found = Vec::new();
        for path in candidates {
            for doc in self.store.child_documents(&Folder::from_path(path))? {
                match self.store.tags(&doc) {
                    Ok(tags) if has_index_tag(&tags) => found.push(doc),
                    Ok(_) => {}
                    Err(e) => warn!(path = %doc.path, error = %e, "Failed to read tags"),
                }
            }
        }
        found.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(found)
    }

    fn rebuild_scopes(&self, scopes: &[String]) -> Result<RebuildReport> {
        if scopes.is_empty() {
            return Ok(RebuildReport::default());
        }

        let targets = self.index_documents_for(scopes)?;

        let mut report = RebuildReport::default();
        for doc in targets {
            match self.rebuild_document(&doc) {
                Ok(true) => {
                    info!(path = %doc.path, "Index rewritten");
                    report.rewritten.push(doc.path);
                }
                Ok(false) => report.unchanged.push(doc.path),
                Err(e) => {
                    warn!(path = %doc.path, error = %e, "Failed to rebuild index");
                    report.failed.push(RebuildFailure {
                        path: doc.path,
                        error: e,
                    });
                }
            }
        }
        Ok(report)
    }

    /// Regenerates one index document's region. Returns whether it was
    /// written.
    fn rebuild_document(&self, doc: &Document) -> Result<bool> {
        let Some(folder) = self.parent_folder(doc)? else {
            return Ok(false);
        };

        let outline = self.outline_builder().build(&folder, 0, None)?;
        let content = self.store.read(doc)?;
        let updated = region::rewrite(&content, &outline);
        if updated == content {
            return Ok(false);
        }
        self.store.write(doc, &updated)?;
        Ok(true)
    }
}

fn ignored(path: &str) -> RebuildReport {
    debug!(path = %path, "Ignoring event for path outside the vault");
    RebuildReport::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{Position, TextBuffer};
    use crate::region::{new_region, END_MARKER, START_MARKER};
    use crate::store::memory::MemVault;

    fn index_text(title: &str) -> String {
        format!("# {}\n{}\n#indice\n\n{}\n", title, START_MARKER, END_MARKER)
    }

    fn indexed(title: &str, outline: &str) -> String {
        format!(
            "# {}\n{}\n#indice\n\n{}\n{}\n",
            title, START_MARKER, outline, END_MARKER
        )
    }

    fn projects_vault() -> MemVault {
        MemVault::new()
            .with_document("Projects/Index.md", &index_text("Projects"))
            .with_document("Projects/Alpha.md", "# A\n")
    }

    fn doc(path: &str) -> Document {
        Document::from_path(path)
    }

    #[test]
    fn test_first_sight_modify_rebuilds() {
        let mut reconciler = Reconciler::new(projects_vault());

        let report = reconciler.on_modify(&doc("Projects/Alpha.md")).unwrap();

        assert_eq!(report.rewritten, vec!["Projects/Index.md"]);
        assert_eq!(
            reconciler.store().content("Projects/Index.md").unwrap(),
            indexed(
                "Projects",
                "- [[Projects/Alpha|Alpha]]\n\t- [[Projects/Alpha#A|A]]\n"
            )
        );
        assert!(reconciler.ledger().was_seen("Projects/Alpha.md"));
    }

    #[test]
    fn test_unchanged_headings_do_not_rebuild() {
        let mut reconciler = Reconciler::new(projects_vault());
        reconciler.on_modify(&doc("Projects/Alpha.md")).unwrap();
        let writes = reconciler.store().write_count();

        reconciler
            .store()
            .insert("Projects/Alpha.md", "# A\nnew body text\n");
        let report = reconciler.on_modify(&doc("Projects/Alpha.md")).unwrap();

        assert!(report.is_empty());
        assert_eq!(reconciler.store().write_count(), writes);
    }

    #[test]
    fn test_heading_change_rebuilds() {
        let mut reconciler = Reconciler::new(projects_vault());
        reconciler.on_modify(&doc("Projects/Alpha.md")).unwrap();

        reconciler.store().insert("Projects/Alpha.md", "# A\n## B\n");
        let report = reconciler.on_modify(&doc("Projects/Alpha.md")).unwrap();

        assert_eq!(report.rewritten, vec!["Projects/Index.md"]);
        assert!(reconciler
            .store()
            .content("Projects/Index.md")
            .unwrap()
            .contains("\t\t- [[Projects/Alpha#B|B]]\n"));
    }

    #[test]
    fn test_unchanged_region_is_not_written() {
        let mut reconciler = Reconciler::new(projects_vault());
        reconciler.rebuild_governing("Projects").unwrap();
        let writes = reconciler.store().write_count();

        let report = reconciler.rebuild_governing("Projects").unwrap();

        assert_eq!(report.unchanged, vec!["Projects/Index.md"]);
        assert_eq!(reconciler.store().write_count(), writes);
        reconciler.teardown();
    }

    #[test]
    fn test_write_failure_does_not_stop_batch() {
        let vault = projects_vault().with_document("Home.md", &index_text("Home"));
        vault.fail_writes_to("Projects/Index.md");
        let mut reconciler = Reconciler::new(vault);

        let report = reconciler.on_modify(&doc("Projects/Alpha.md")).unwrap();

        assert_eq!(report.rewritten, vec!["Home.md"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, "Projects/Index.md");
        assert!(!report.is_clean());
    }

    #[test]
    fn test_governing_scope_uses_whole_components() {
        let vault = MemVault::new()
            .with_document("Proj/Index.md", &index_text("Proj"))
            .with_document("Projects/Index.md", &index_text("Projects"))
            .with_document("Projects/Sub/x.md", "")
            .with_document("Home.md", &index_text("Home"));
        let reconciler = Reconciler::new(vault);

        let paths: Vec<String> = reconciler
            .index_documents_governing("Projects/Sub")
            .unwrap()
            .into_iter()
            .map(|d| d.path)
            .collect();

        assert_eq!(paths, vec!["Home.md", "Projects/Index.md"]);
    }

    #[test]
    fn test_rebuild_only_reads_documents_that_can_govern() {
        let vault = projects_vault()
            .with_document("Other/a.md", "# Other\n")
            .with_document("Other/Deep/b.md", "");
        let reconciler = Reconciler::new(vault);

        let report = reconciler.rebuild_governing("Projects").unwrap();

        assert_eq!(report.rewritten, vec!["Projects/Index.md"]);
        assert_eq!(reconciler.store().reads_of("Other/a.md"), 0);
        assert_eq!(reconciler.store().reads_of("Other/Deep/b.md"), 0);
    }

    #[test]
    fn test_unreadable_sibling_does_not_block_index() {
        let vault = projects_vault().with_document("Projects/bad.md", "# Bad\n");
        vault.fail_reads_of("Projects/bad.md");
        let mut reconciler = Reconciler::new(vault);

        assert!(reconciler.handle(&VaultEvent::Modified("Projects/bad.md".to_string())).is_err());

        let report = reconciler.on_modify(&doc("Projects/Alpha.md")).unwrap();
        assert_eq!(report.rewritten, vec!["Projects/Index.md"]);
        assert!(report.is_clean());
        let index = reconciler.store().content("Projects/Index.md").unwrap();
        assert!(index.contains("- [[Projects/Alpha|Alpha]]\n\t- [[Projects/Alpha#A|A]]\n"));
        assert!(index.contains("- [[Projects/bad|bad]]\n"));
    }

    #[test]
    fn test_root_index_governs_everything() {
        let vault = MemVault::new()
            .with_document("Home.md", &index_text("Home"))
            .with_document("a/b/c/deep.md", "# Deep\n");
        let mut reconciler = Reconciler::new(vault);

        reconciler.on_modify(&doc("a/b/c/deep.md")).unwrap();

        let home = reconciler.store().content("Home.md").unwrap();
        assert!(home.contains("\n# a\n\n## b\n\n### c\n- [[a/b/c/deep|deep]]\n"));
    }

    #[test]
    fn test_rename_moves_ledger_and_updates_both_folders() {
        let vault = projects_vault().with_document("Archive/Index.md", &index_text("Archive"));
        let mut reconciler = Reconciler::new(vault);
        reconciler.rebuild_all().unwrap();

        reconciler
            .store()
            .rename("Projects/Alpha.md", "Archive/Alpha.md");
        let report = reconciler
            .handle(&VaultEvent::Renamed {
                from: "Projects/Alpha.md".to_string(),
                to: "Archive/Alpha.md".to_string(),
            })
            .unwrap();

        assert_eq!(report.rewritten.len(), 2);
        assert!(!reconciler.ledger().was_seen("Projects/Alpha.md"));
        assert!(reconciler.ledger().was_seen("Archive/Alpha.md"));
        assert!(!reconciler
            .store()
            .content("Projects/Index.md")
            .unwrap()
            .contains("Alpha"));
        assert!(reconciler
            .store()
            .content("Archive/Index.md")
            .unwrap()
            .contains("- [[Archive/Alpha|Alpha]]"));
    }

    #[test]
    fn test_folder_rename_rebuilds_parent_index() {
        let vault = projects_vault().with_document("Projects/Old/note.md", "");
        let mut reconciler = Reconciler::new(vault);
        reconciler.rebuild_all().unwrap();

        reconciler.store().rename("Projects/Old", "Projects/New");
        reconciler
            .handle(&VaultEvent::Renamed {
                from: "Projects/Old".to_string(),
                to: "Projects/New".to_string(),
            })
            .unwrap();

        let index = reconciler.store().content("Projects/Index.md").unwrap();
        assert!(index.contains("# New\n- [[Projects/New/note|note]]"));
        assert!(!index.contains("Old"));
        assert!(!reconciler.ledger().was_seen("Projects/Old/note.md"));
    }

    #[test]
    fn test_create_document_and_folder() {
        let mut reconciler = Reconciler::new(projects_vault());

        reconciler.store().insert("Projects/Beta.md", "## Two\n");
        reconciler
            .handle(&VaultEvent::Created("Projects/Beta.md".to_string()))
            .unwrap();
        assert!(reconciler.ledger().was_seen("Projects/Beta.md"));
        assert!(reconciler
            .store()
            .content("Projects/Index.md")
            .unwrap()
            .contains("\t\t- [[Projects/Beta#Two|Two]]"));

        reconciler.store().add_folder("Projects/Empty");
        let report = reconciler
            .handle(&VaultEvent::Created("Projects/Empty".to_string()))
            .unwrap();
        assert_eq!(report.rewritten, vec!["Projects/Index.md"]);
        assert!(reconciler
            .store()
            .content("Projects/Index.md")
            .unwrap()
            .contains("\n# Empty\n"));
    }

    #[test]
    fn test_delete_forgets_and_rebuilds() {
        let mut reconciler = Reconciler::new(projects_vault());
        reconciler.rebuild_all().unwrap();

        reconciler.store().remove("Projects/Alpha.md");
        let report = reconciler
            .handle(&VaultEvent::Deleted("Projects/Alpha.md".to_string()))
            .unwrap();

        assert_eq!(report.rewritten, vec!["Projects/Index.md"]);
        assert!(!reconciler.ledger().was_seen("Projects/Alpha.md"));
        assert_eq!(
            reconciler.store().content("Projects/Index.md").unwrap(),
            indexed("Projects", "")
        );
    }

    #[test]
    fn test_events_for_unknown_paths_are_ignored() {
        let mut reconciler = Reconciler::new(projects_vault());
        let report = reconciler
            .handle(&VaultEvent::Modified("Nowhere/ghost.md".to_string()))
            .unwrap();
        assert!(report.is_empty());
        assert!(reconciler.ledger().is_empty());
    }

    #[test]
    fn test_rebuild_all_rewrites_each_index_once() {
        let vault = projects_vault()
            .with_document("Projects/Beta.md", "# B\n")
            .with_document("Projects/Sub/Gamma.md", "")
            .with_document("Home.md", &index_text("Home"));
        let mut reconciler = Reconciler::new(vault);

        let report = reconciler.rebuild_all().unwrap();

        assert_eq!(report.rewritten, vec!["Home.md", "Projects/Index.md"]);
        assert_eq!(reconciler.store().write_count(), 2);
        assert_eq!(reconciler.ledger().len(), 5);

        // Index documents gained heading lines from their outlines, so they
        // are rebuilt once more but end up byte-identical
        let again = reconciler.rebuild_all().unwrap();
        assert!(again.rewritten.is_empty());
        assert_eq!(reconciler.store().write_count(), 2);

        let settled = reconciler.rebuild_all().unwrap();
        assert!(settled.is_empty());
    }

    #[test]
    fn test_bulk_rebuild_skips_documents_without_region() {
        let vault = MemVault::new()
            .with_document("Projects/Tagged.md", "---\ntags: [indice]\n---\nno region\n")
            .with_document("Projects/Alpha.md", "# A\n");
        let mut reconciler = Reconciler::new(vault);

        let report = reconciler.rebuild_all().unwrap();

        assert_eq!(report.unchanged, vec!["Projects/Tagged.md"]);
        assert_eq!(reconciler.store().write_count(), 0);
    }

    #[test]
    fn test_build_index_inserts_at_cursor() {
        let vault = MemVault::new()
            .with_document("Projects/Notes.md", "Top\n")
            .with_document("Projects/Alpha.md", "# A\n");
        let reconciler = Reconciler::new(vault);
        let mut view = TextBuffer::new("Top\n").with_cursor(Position::new(1, 0));

        let built = reconciler
            .build_index(&doc("Projects/Notes.md"), &mut view)
            .unwrap();

        assert!(built);
        assert_eq!(
            view.text(),
            format!(
                "Top\n{}",
                new_region("- [[Projects/Alpha|Alpha]]\n\t- [[Projects/Alpha#A|A]]\n")
            )
        );
    }

    #[test]
    fn test_build_index_replaces_existing_region() {
        let vault = projects_vault();
        let reconciler = Reconciler::new(vault);
        let original = format!("intro\n{}stale{}\noutro\n", START_MARKER, END_MARKER);
        let mut view = TextBuffer::new(original.as_str());

        reconciler
            .build_index(&doc("Projects/Index.md"), &mut view)
            .unwrap();

        assert_eq!(
            view.text(),
            format!(
                "intro\n{}\n#indice\n\n- [[Projects/Alpha|Alpha]]\n\t- [[Projects/Alpha#A|A]]\n\n{}\noutro\n",
                START_MARKER, END_MARKER
            )
        );
    }

    #[test]
    fn test_build_index_without_folder_is_unavailable() {
        let reconciler = Reconciler::new(MemVault::new());
        let mut view = TextBuffer::new("text");

        let built = reconciler
            .build_index(&doc("Gone/Missing.md"), &mut view)
            .unwrap();

        assert!(!built);
        assert_eq!(view.text(), "text");
    }
}
