use crate::commands::{CmdMessage, CmdResult};
use crate::error::{IndiceError, Result};
use crate::reconcile::Reconciler;
use crate::store::VaultStore;

/// Computes the outline of a folder without writing anything.
pub fn run<S: VaultStore>(reconciler: &Reconciler<S>, path: &str) -> Result<CmdResult> {
    let folder = reconciler
        .store()
        .folder(path)?
        .ok_or_else(|| IndiceError::NotFound(path.to_string()))?;
    let outline = reconciler.outline(&folder)?;

    let mut result = CmdResult::default();
    if outline.is_empty() {
        result.add_message(CmdMessage::info("Nothing to index"));
    }
    Ok(result.with_outline(outline))
}
