//! Conflict checks for in-flight request batches

use std::collections::BTreeMap;

use modelsync_core_types::RequestId;
use modelsync_core::errors::Result;
use modelsync_core::{ChangeId, ChangeLedger, ModelChange};

/// Applied but undeployed changes under any of `paths`, up to `horizon`
///
/// Each change appears once, in id order, even when several paths cover it.
pub fn pending_conflicts(
    ledger: &dyn ChangeLedger,
    paths: &[&str],
    horizon: u64,
) -> Result<Vec<ModelChange>> {
    let mut found: BTreeMap<ChangeId, ModelChange> = BTreeMap::new();
    for path in paths {
        for change in ledger.not_deployed_changes_for_path(path, horizon)? {
            found.entry(change.id).or_insert(change);
        }
    }
    Ok(found.into_values().collect())
}

/// Pending changes from other batches that touch the paths of `request_id`
///
/// Used to validate a batch before committing it. Changes of the batch itself
/// are never reported.
pub fn request_conflicts(
    ledger: &dyn ChangeLedger,
    request_id: &RequestId,
    horizon: u64,
) -> Result<Vec<ModelChange>> {
    let batch = ledger.changes_by_request_id(request_id)?;
    let paths: Vec<&str> = batch.iter().map(|c| c.path.as_str()).collect();
    let conflicts = pending_conflicts(ledger, &paths, horizon)?
        .into_iter()
        .filter(|c| &c.request_id != request_id)
        .collect::<Vec<_>>();
    if !conflicts.is_empty() {
        tracing::debug!(
            request_id = request_id.as_str(),
            conflicts = conflicts.len(),
            "Batch overlaps pending changes"
        );
    }
    Ok(conflicts)
}
