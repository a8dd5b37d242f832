use crate::commands::{report_result, CmdResult};
use crate::error::Result;
use crate::events::VaultEvent;
use crate::reconcile::Reconciler;
use crate::store::VaultStore;

/// Reconciles a single vault event. Rewritten indexes are listed in
/// `affected_documents`; only failures produce messages.
pub fn apply<S: VaultStore>(
    reconciler: &mut Reconciler<S>,
    event: &VaultEvent,
) -> Result<CmdResult> {
    let report = reconciler.handle(event)?;
    Ok(report_result(report))
}
