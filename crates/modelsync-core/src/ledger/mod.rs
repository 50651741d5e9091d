//! Change ledger: durable, queryable log of model changes
//!
//! `ChangeLedger` names the lifecycle queries semantically; backends decide
//! how to store rows. `InMemoryLedger` lives here, the SQLite backend lives
//! in `modelsync-store`.

pub mod memory;
pub mod queries;

use chrono::{DateTime, Utc};
use modelsync_core_types::RequestId;

use crate::errors::Result;
use crate::model::{ChangeId, ChangeStatus, ModelChange};

pub use memory::InMemoryLedger;

/// Append-only, versioned record of model changes
///
/// All list queries return changes ordered by ascending `id`.
pub trait ChangeLedger {
    /// Record a newly authored change in the `Pending` state.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty path; storage failures otherwise.
    fn append_change(
        &mut self,
        request_id: &RequestId,
        path: &str,
        initial_version: u64,
        created_by: &str,
        change_data: &str,
    ) -> Result<ModelChange>;

    /// Look up a change by id.
    fn get_change(&self, id: ChangeId) -> Result<Option<ModelChange>>;

    /// Confirm a change against `applied_version`, setting `applied_on` to now.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `IllegalState` if the change is already
    /// deployed, `VersionRegression` if the version would decrease.
    fn mark_applied(&mut self, id: ChangeId, applied_version: u64) -> Result<ModelChange>;

    /// Pending replay log: `applied_version > version`, not deployed.
    fn changes_since(&self, version: u64) -> Result<Vec<ModelChange>>;

    /// Deployable frontier: `applied_version <= version`, not deployed,
    /// status in `statuses`.
    fn not_deployed_changes(
        &self,
        version: u64,
        statuses: &[ChangeStatus],
    ) -> Result<Vec<ModelChange>>;

    /// Not-yet-applied changes of one request batch.
    fn changes_by_request_id(&self, request_id: &RequestId) -> Result<Vec<ModelChange>>;

    /// Conflict detection: not deployed, `applied_version <= version`, path
    /// at or below `path_prefix`.
    fn not_deployed_changes_for_path(
        &self,
        path_prefix: &str,
        version: u64,
    ) -> Result<Vec<ModelChange>>;

    /// Highest applied version in the ledger, `None` if nothing was applied.
    fn last_known_model_version(&self) -> Result<Option<u64>>;

    /// Bulk transition to `Deployed`.
    ///
    /// Only rows that are applied and still have no `deployed_on` are
    /// touched, so redelivery of the same ids is a no-op. Returns the number
    /// of rows transitioned. The resulting status is always `DEPLOYED`,
    /// derived from the state rather than passed in.
    fn mark_deployed(&mut self, ids: &[ChangeId], deployed_on: DateTime<Utc>) -> Result<usize>;

    /// Record a failed deployment attempt for an applied, undeployed change.
    ///
    /// A change that already failed takes the newer failure. Returns `false`
    /// when the guard did not match (unknown, pending or deployed).
    fn mark_failed(
        &mut self,
        id: ChangeId,
        failed_on: DateTime<Utc>,
        message: &str,
    ) -> Result<bool>;
}
