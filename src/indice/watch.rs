//! # Vault Watcher
//!
//! Bridges filesystem notifications (`notify`) into [`VaultEvent`]s.
//!
//! The `notify` backend calls us on its own thread; that callback only
//! forwards raw events over a channel. Translation, filtering and debouncing
//! happen on the thread that calls [`VaultWatcher::next_event`], so the
//! reconciler consuming the events stays single-threaded.
//!
//! ## Translation
//!
//! | notify event | vault event |
//! |--------------|-------------|
//! | `Create` | `Created` |
//! | `Modify(Name(Both))` with two paths | `Renamed` (or `Created` / `Deleted` when one side is outside the vault) |
//! | `Modify(Name(From))` | `Deleted` |
//! | other `Modify(Name(_))` | `Created` if the path exists, else `Deleted` |
//! | `Modify(Data / Any / Other)` on a document | `Modified` |
//! | `Remove` | `Deleted` |
//!
//! Hidden and ignored paths, the vault root itself and files that are not
//! documents are dropped. A path that no longer exists is kept when it has no
//! extension, since it may have been a folder.
//!
//! ## Debouncing
//!
//! Editors often write a file several times in quick succession. An event is
//! only released once it has not been seen again for the debounce window;
//! repeats inside the window are folded into the pending one.

use crate::error::{IndiceError, Result};
use crate::events::VaultEvent;
use crate::model::ROOT_PATH;
use crate::store::fs::FsVault;
use notify::event::{ModifyKind, RenameMode};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A live subscription to a vault directory. Dropping it unregisters the
/// subscription.
pub struct VaultWatcher {
    vault: FsVault,
    watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    debounce: Duration,
    pending: Vec<(VaultEvent, Instant)>,
}

impl VaultWatcher {
    pub fn new(vault: &FsVault, debounce: Duration) -> Result<Self> {
        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                // The receiver is gone only while the watcher is being dropped
                let _ = tx.send(res);
            },
            NotifyConfig::default(),
        )?;
        watcher.watch(vault.root(), RecursiveMode::Recursive)?;
        debug!(root = %vault.root().display(), "Watching vault");

        Ok(Self {
            vault: vault.clone(),
            watcher,
            rx,
            debounce,
            pending: Vec::new(),
        })
    }

    /// Waits up to `timeout` for the next settled event. Backend errors are
    /// logged and skipped; only losing the backend altogether is an error.
    pub fn next_event(&mut self, timeout: Duration) -> Result<Option<VaultEvent>> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(event) = self.pop_settled(Instant::now()) {
                return Ok(Some(event));
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let mut wait = deadline - now;
            if let Some(settles_in) = self.next_settle(now) {
                wait = wait.min(settles_in);
            }

            match self.rx.recv_timeout(wait) {
                Ok(Ok(raw)) => {
                    for event in translate(&raw, &self.vault) {
                        self.push(event, Instant::now());
                    }
                }
                Ok(Err(e)) => warn!(error = %e, "Watch backend error, skipping notification"),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(IndiceError::Store("Watch channel closed".to_string()));
                }
            }
        }
    }

    fn push(&mut self, event: VaultEvent, now: Instant) {
        match self.pending.iter_mut().find(|(pending, _)| *pending == event) {
            Some(slot) => slot.1 = now,
            None => self.pending.push((event, now)),
        }
    }

    fn pop_settled(&mut self, now: Instant) -> Option<VaultEvent> {
        let index = self
            .pending
            .iter()
            .position(|(_, seen)| now.duration_since(*seen) >= self.debounce)?;
        Some(self.pending.remove(index).0)
    }

    fn next_settle(&self, now: Instant) -> Option<Duration> {
        self.pending
            .iter()
            .map(|(_, seen)| self.debounce.saturating_sub(now.duration_since(*seen)))
            .min()
    }
}

impl Drop for VaultWatcher {
    fn drop(&mut self) {
        if let Err(e) = self.watcher.unwatch(self.vault.root()) {
            debug!(error = %e, "Failed to unwatch vault");
        }
    }
}

/// Translates one raw notification into zero or more vault events.
pub fn translate(event: &Event, vault: &FsVault) -> Vec<VaultEvent> {
    let paths = &event.paths;

    match &event.kind {
        EventKind::Create(_) => paths
            .iter()
            .filter_map(|path| vault_entry(vault, path))
            .map(VaultEvent::Created)
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if paths.len() == 2 => {
            match (vault_entry(vault, &paths[0]), vault_entry(vault, &paths[1])) {
                (Some(from), Some(to)) => vec![VaultEvent::Renamed { from, to }],
                (None, Some(to)) => vec![appeared(&paths[1], to)],
                (Some(from), None) => vec![VaultEvent::Deleted(from)],
                (None, None) => Vec::new(),
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => paths
            .iter()
            .filter_map(|path| vault_entry(vault, path))
            .map(VaultEvent::Deleted)
            .collect(),
        EventKind::Modify(ModifyKind::Name(_)) => paths
            .iter()
            .filter_map(|path| {
                let entry = vault_entry(vault, path)?;
                Some(if path.exists() {
                    VaultEvent::Created(entry)
                } else {
                    VaultEvent::Deleted(entry)
                })
            })
            .collect(),
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(_) | EventKind::Any => paths
            .iter()
            .filter_map(|path| {
                let entry = vault_entry(vault, path)?;
                if path.is_file() {
                    Some(VaultEvent::Modified(entry))
                } else if !path.exists() {
                    Some(VaultEvent::Deleted(entry))
                } else {
                    None
                }
            })
            .collect(),
        EventKind::Remove(_) => paths
            .iter()
            .filter_map(|path| vault_entry(vault, path))
            .map(VaultEvent::Deleted)
            .collect(),
        EventKind::Access(_) | EventKind::Other => Vec::new(),
    }
}

/// A file written by moving a temp file over it is a modification; anything
/// else moved into the vault is new.
fn appeared(absolute: &Path, path: String) -> VaultEvent {
    if absolute.is_dir() {
        VaultEvent::Created(path)
    } else {
        VaultEvent::Modified(path)
    }
}

fn vault_entry(vault: &FsVault, absolute: &Path) -> Option<String> {
    let path = vault.vault_path(absolute)?;
    if path == ROOT_PATH {
        return None;
    }
    if absolute.is_dir() {
        return Some(path);
    }
    let name = path.rsplit('/').next()?;
    if vault.is_document_name(name) || (!absolute.exists() && !name.contains('.')) {
        Some(path)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind};
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FsVault) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("Projects")).unwrap();
        fs::write(dir.path().join("Projects").join("Alpha.md"), "# A\n").unwrap();
        fs::write(dir.path().join("Projects").join("image.png"), "").unwrap();
        let vault = FsVault::new(dir.path());
        (dir, vault)
    }

    fn event(kind: EventKind, paths: &[&Path]) -> Event {
        paths
            .iter()
            .fold(Event::new(kind), |event, path| event.add_path(path.to_path_buf()))
    }

    #[test]
    fn test_create_document_and_folder() {
        let (dir, vault) = setup();
        let alpha = dir.path().join("Projects/Alpha.md");
        let projects = dir.path().join("Projects");

        assert_eq!(
            translate(&event(EventKind::Create(CreateKind::File), &[&alpha]), &vault),
            vec![VaultEvent::Created("Projects/Alpha.md".to_string())]
        );
        assert_eq!(
            translate(&event(EventKind::Create(CreateKind::Folder), &[&projects]), &vault),
            vec![VaultEvent::Created("Projects".to_string())]
        );
    }

    #[test]
    fn test_modify_data() {
        let (dir, vault) = setup();
        let alpha = dir.path().join("Projects/Alpha.md");
        let kind = EventKind::Modify(ModifyKind::Data(DataChange::Content));

        assert_eq!(
            translate(&event(kind, &[&alpha]), &vault),
            vec![VaultEvent::Modified("Projects/Alpha.md".to_string())]
        );
    }

    #[test]
    fn test_rename_both_sides() {
        let (dir, vault) = setup();
        let old = dir.path().join("Projects/Old.md");
        let new = dir.path().join("Projects/Alpha.md");
        let kind = EventKind::Modify(ModifyKind::Name(RenameMode::Both));

        assert_eq!(
            translate(&event(kind, &[&old, &new]), &vault),
            vec![VaultEvent::Renamed {
                from: "Projects/Old.md".to_string(),
                to: "Projects/Alpha.md".to_string(),
            }]
        );
    }

    #[test]
    fn test_atomic_write_is_a_modification() {
        let (dir, vault) = setup();
        let tmp = dir.path().join("Projects/.Alpha.1234.tmp");
        let target = dir.path().join("Projects/Alpha.md");
        let kind = EventKind::Modify(ModifyKind::Name(RenameMode::Both));

        assert_eq!(
            translate(&event(kind, &[&tmp, &target]), &vault),
            vec![VaultEvent::Modified("Projects/Alpha.md".to_string())]
        );
    }

    #[test]
    fn test_remove() {
        let (dir, vault) = setup();
        let gone_doc = dir.path().join("Projects/Gone.md");
        let gone_folder = dir.path().join("Projects/Gone");

        assert_eq!(
            translate(&event(EventKind::Remove(RemoveKind::File), &[&gone_doc]), &vault),
            vec![VaultEvent::Deleted("Projects/Gone.md".to_string())]
        );
        assert_eq!(
            translate(&event(EventKind::Remove(RemoveKind::Folder), &[&gone_folder]), &vault),
            vec![VaultEvent::Deleted("Projects/Gone".to_string())]
        );
    }

    #[test]
    fn test_irrelevant_paths_are_dropped() {
        let (dir, vault) = setup();
        let created = |path: &Path| event(EventKind::Create(CreateKind::File), &[path]);

        let image = dir.path().join("Projects/image.png");
        let hidden = dir.path().join(".obsidian/workspace.md");
        assert!(translate(&created(&image), &vault).is_empty());
        assert!(translate(&created(&hidden), &vault).is_empty());
        assert!(translate(&created(Path::new("/somewhere/else.md")), &vault).is_empty());
        assert!(translate(&created(dir.path()), &vault).is_empty());
    }

    #[test]
    fn test_metadata_and_access_are_ignored() {
        let (dir, vault) = setup();
        let alpha = dir.path().join("Projects/Alpha.md");
        let metadata = EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions));

        assert!(translate(&event(metadata, &[&alpha]), &vault).is_empty());
        assert!(translate(&event(EventKind::Other, &[&alpha]), &vault).is_empty());
    }

    #[test]
    fn test_watcher_reports_new_document() {
        let (dir, vault) = setup();
        let mut watcher = VaultWatcher::new(&vault, Duration::from_millis(20)).unwrap();

        fs::write(dir.path().join("Projects/Beta.md"), "# B\n").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen = Vec::new();
        while Instant::now() < deadline {
            if let Some(event) = watcher.next_event(Duration::from_millis(100)).unwrap() {
                seen.push(event);
            }
            if seen.iter().any(|e| e.path() == "Projects/Beta.md") {
                break;
            }
        }
        assert!(seen.iter().any(|e| e.path() == "Projects/Beta.md"));
    }

    #[test]
    fn test_backend_errors_are_skipped() {
        let (dir, vault) = setup();
        let mut watcher = VaultWatcher::new(&vault, Duration::ZERO).unwrap();
        let (tx, rx) = channel();
        watcher.rx = rx;

        tx.send(Err(notify::Error::generic("queue overflow"))).unwrap();
        let alpha = dir.path().join("Projects/Alpha.md");
        let kind = EventKind::Modify(ModifyKind::Data(DataChange::Content));
        tx.send(Ok(event(kind, &[&alpha]))).unwrap();

        let next = watcher.next_event(Duration::from_secs(1)).unwrap();
        assert_eq!(next, Some(VaultEvent::Modified("Projects/Alpha.md".to_string())));
    }

    #[test]
    fn test_lost_backend_is_an_error() {
        let (_dir, vault) = setup();
        let mut watcher = VaultWatcher::new(&vault, Duration::ZERO).unwrap();
        let (tx, rx) = channel();
        watcher.rx = rx;
        drop(tx);

        assert!(watcher.next_event(Duration::from_millis(50)).is_err());
    }
}
