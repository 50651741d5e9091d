//! Ledger query predicates
//!
//! The named ledger queries expressed as pure filters over `ModelChange`.
//! The in-memory backend evaluates them directly; the SQLite backend mirrors
//! them in SQL and its tests cross-check against these definitions.

use modelsync_core_types::RequestId;

use crate::model::{ChangeStatus, ModelChange};

/// `changes_since(version)`
pub fn is_pending_replay(change: &ModelChange, version: u64) -> bool {
    !change.is_deployed() && change.applied_version().is_some_and(|v| v > version)
}

/// `not_deployed_changes(version, statuses)`
pub fn is_deployable(change: &ModelChange, version: u64, statuses: &[ChangeStatus]) -> bool {
    !change.is_deployed()
        && change.applied_version().is_some_and(|v| v <= version)
        && statuses.contains(&change.status())
}

/// `changes_by_request_id(request_id)`
pub fn is_unapplied_in_request(change: &ModelChange, request_id: &RequestId) -> bool {
    change.applied_version().is_none() && &change.request_id == request_id
}

/// `not_deployed_changes_for_path(path_prefix, version)`
pub fn is_pending_under_path(change: &ModelChange, path_prefix: &str, version: u64) -> bool {
    !change.is_deployed()
        && change.applied_version().is_some_and(|v| v <= version)
        && change.is_under(path_prefix)
}

/// Guard shared by `mark_deployed` and `mark_failed`: applied, not yet deployed
pub fn accepts_deployment(change: &ModelChange) -> bool {
    matches!(change.status(), ChangeStatus::Applied | ChangeStatus::Failed)
}

pub fn accepts_failure(change: &ModelChange) -> bool {
    accepts_deployment(change)
}

/// Validate a path before it enters the ledger
pub fn validate_path(path: &str) -> Result<(), crate::errors::SyncError> {
    if path.trim().is_empty() {
        return Err(crate::errors::SyncError::InvalidInput {
            reason: "change path cannot be empty".to_string(),
        });
    }
    Ok(())
}
