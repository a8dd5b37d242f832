use crate::commands::{CmdMessage, CmdResult};
use crate::editor::{offset_to_pos, EditorView, Position, TextBuffer};
use crate::error::{IndiceError, Result};
use crate::reconcile::Reconciler;
use crate::store::VaultStore;
use tracing::{debug, info};

/// Builds the index of a document's folder into the document itself, the
/// way an editor command would: over the existing region, or as a new region
/// at `cursor` (the end of the document when not given).
pub fn run<S: VaultStore>(
    reconciler: &Reconciler<S>,
    path: &str,
    cursor: Option<Position>,
) -> Result<CmdResult> {
    let store = reconciler.store();
    let doc = store
        .document(path)?
        .ok_or_else(|| IndiceError::NotFound(path.to_string()))?;
    let content = store.read(&doc)?;
    let cursor = cursor.unwrap_or_else(|| offset_to_pos(&content, content.len()));

    let mut view = TextBuffer::new(content.as_str()).with_cursor(cursor);
    let mut result = CmdResult::default();

    if !reconciler.build_index(&doc, &mut view)? {
        result.add_message(CmdMessage::warning(format!(
            "Cannot build an index for {}: it is not inside a vault folder",
            doc.path
        )));
        return Ok(result);
    }

    let updated = view.text();
    if updated == content {
        debug!(path = %doc.path, "Index already up to date");
        return Ok(result);
    }

    store.write(&doc, &updated)?;
    info!(path = %doc.path, "Index built");
    Ok(result.with_affected_documents(vec![doc.path]))
}
