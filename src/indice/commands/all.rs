use crate::commands::{report_result, CmdMessage, CmdResult};
use crate::error::Result;
use crate::reconcile::Reconciler;
use crate::store::VaultStore;

/// Observes every document in the vault and rebuilds each affected index
/// document once. Ends with a single confirmation.
pub fn run<S: VaultStore>(reconciler: &mut Reconciler<S>) -> Result<CmdResult> {
    let report = reconciler.rebuild_all()?;
    let mut result = report_result(report);
    result.add_message(CmdMessage::success("Indexes updated"));
    Ok(result)
}
