use crate::commands::{report_result, CmdMessage, CmdResult};
use crate::error::{IndiceError, Result};
use crate::model::{normalize_path, Entry};
use crate::reconcile::Reconciler;
use crate::store::VaultStore;
use tracing::debug;

/// Rebuilds every index document governing `path`: the folder itself when
/// `path` is a folder, the document's folder otherwise.
pub fn run<S: VaultStore>(reconciler: &Reconciler<S>, path: &str) -> Result<CmdResult> {
    let folder = match reconciler.store().entry(path)? {
        Some(Entry::Document(doc)) => doc.parent,
        Some(Entry::Folder(folder)) => Some(folder.path),
        None => return Err(IndiceError::NotFound(normalize_path(path))),
    };

    let Some(folder) = folder else {
        let mut result = CmdResult::default();
        result.add_message(CmdMessage::warning(format!(
            "{} is not inside a vault folder",
            path
        )));
        return Ok(result);
    };

    let report = reconciler.rebuild_governing(&folder)?;
    let nothing_governs = report.is_empty();
    if report.rewritten.is_empty() && report.is_clean() && !nothing_governs {
        debug!(folder = %folder, "Indexes already up to date");
    }

    let mut result = report_result(report);
    if nothing_governs {
        result.add_message(CmdMessage::info(format!(
            "No index documents govern {}",
            folder
        )));
    }
    Ok(result)
}
