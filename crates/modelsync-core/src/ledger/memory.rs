use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use modelsync_core_types::RequestId;

use super::queries;
use super::ChangeLedger;
use crate::errors::{Result, SyncError};
use crate::model::{now_utc, ChangeId, ChangeStatus, ModelChange};

/// In-memory change ledger
///
/// BTreeMap keyed by id, so iteration is already in deployment order.
/// Not thread-safe; designed for single-threaded drivers and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    changes: BTreeMap<ChangeId, ModelChange>,
    next_id: u64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    fn select<F>(&self, predicate: F) -> Vec<ModelChange>
    where
        F: Fn(&ModelChange) -> bool,
    {
        self.changes
            .values()
            .filter(|c| predicate(c))
            .cloned()
            .collect()
    }
}

impl ChangeLedger for InMemoryLedger {
    fn append_change(
        &mut self,
        request_id: &RequestId,
        path: &str,
        initial_version: u64,
        created_by: &str,
        change_data: &str,
    ) -> Result<ModelChange> {
        queries::validate_path(path)?;
        self.next_id += 1;
        let change = ModelChange::new(
            ChangeId(self.next_id),
            request_id.clone(),
            path,
            initial_version,
            created_by,
            change_data,
        );
        self.changes.insert(change.id, change.clone());
        tracing::debug!(change_id = change.id.get(), path, "Appended model change");
        Ok(change)
    }

    fn get_change(&self, id: ChangeId) -> Result<Option<ModelChange>> {
        Ok(self.changes.get(&id).cloned())
    }

    fn mark_applied(&mut self, id: ChangeId, applied_version: u64) -> Result<ModelChange> {
        let change = self
            .changes
            .get_mut(&id)
            .ok_or(SyncError::ChangeNotFound { change_id: id.get() })?;
        change.state = change
            .state
            .clone()
            .apply(id.get(), applied_version, now_utc())?;
        Ok(change.clone())
    }

    fn changes_since(&self, version: u64) -> Result<Vec<ModelChange>> {
        Ok(self.select(|c| queries::is_pending_replay(c, version)))
    }

    fn not_deployed_changes(
        &self,
        version: u64,
        statuses: &[ChangeStatus],
    ) -> Result<Vec<ModelChange>> {
        Ok(self.select(|c| queries::is_deployable(c, version, statuses)))
    }

    fn changes_by_request_id(&self, request_id: &RequestId) -> Result<Vec<ModelChange>> {
        Ok(self.select(|c| queries::is_unapplied_in_request(c, request_id)))
    }

    fn not_deployed_changes_for_path(
        &self,
        path_prefix: &str,
        version: u64,
    ) -> Result<Vec<ModelChange>> {
        Ok(self.select(|c| queries::is_pending_under_path(c, path_prefix, version)))
    }

    fn last_known_model_version(&self) -> Result<Option<u64>> {
        Ok(self
            .changes
            .values()
            .filter_map(|c| c.applied_version())
            .max())
    }

    fn mark_deployed(&mut self, ids: &[ChangeId], deployed_on: DateTime<Utc>) -> Result<usize> {
        let mut affected = 0;
        for id in ids {
            let Some(change) = self.changes.get_mut(id) else {
                continue;
            };
            if !queries::accepts_deployment(change) {
                continue;
            }
            change.state = change.state.clone().deploy(id.get(), deployed_on)?;
            affected += 1;
        }
        Ok(affected)
    }

    fn mark_failed(
        &mut self,
        id: ChangeId,
        failed_on: DateTime<Utc>,
        message: &str,
    ) -> Result<bool> {
        let Some(change) = self.changes.get_mut(&id) else {
            return Ok(false);
        };
        if !queries::accepts_failure(change) {
            return Ok(false);
        }
        change.state = change.state.clone().fail(id.get(), failed_on, message)?;
        Ok(true)
    }
}
