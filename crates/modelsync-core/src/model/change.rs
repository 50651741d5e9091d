use chrono::{DateTime, Utc};
use modelsync_core_types::RequestId;
use serde::{Deserialize, Serialize};

use super::lifecycle::{ChangeState, ChangeStatus};

/// Ledger-assigned change identifier; ascending ids define deployment order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeId(pub u64);

impl ChangeId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ChangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current time truncated to millisecond precision
///
/// Ledger timestamps are persisted as epoch milliseconds; truncating at the
/// source keeps in-memory and persisted values equal.
pub fn now_utc() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// One atomic, addressable alteration to the domain model
///
/// Each change:
/// - Belongs to one request batch (via `request_id`)
/// - Addresses one model node (via `path`)
/// - Carries its low-level add/remove payload in `change_data`
/// - Moves through the lifecycle in `state`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelChange {
    pub id: ChangeId,

    /// Batch the change was submitted with
    pub request_id: RequestId,

    /// Hierarchical address of the affected model node
    pub path: String,

    /// Model version at authoring time (immutable)
    pub initial_version: u64,

    /// Opaque serialized payload describing the add/remove operations
    pub change_data: String,

    pub created_by: String,
    pub created_on: DateTime<Utc>,

    pub state: ChangeState,
}

impl ModelChange {
    /// Create a freshly authored change in the `Pending` state
    pub fn new(
        id: ChangeId,
        request_id: RequestId,
        path: impl Into<String>,
        initial_version: u64,
        created_by: impl Into<String>,
        change_data: impl Into<String>,
    ) -> Self {
        Self {
            id,
            request_id,
            path: path.into(),
            initial_version,
            change_data: change_data.into(),
            created_by: created_by.into(),
            created_on: now_utc(),
            state: ChangeState::Pending,
        }
    }

    pub fn status(&self) -> ChangeStatus {
        self.state.status()
    }

    pub fn applied_version(&self) -> Option<u64> {
        self.state.applied_version()
    }

    pub fn applied_on(&self) -> Option<DateTime<Utc>> {
        self.state.applied_on()
    }

    pub fn deployed_on(&self) -> Option<DateTime<Utc>> {
        self.state.deployed_on()
    }

    pub fn failed_on(&self) -> Option<DateTime<Utc>> {
        self.state.failed_on()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.state.status_message()
    }

    pub fn is_deployed(&self) -> bool {
        self.deployed_on().is_some()
    }

    /// Whether this change's path starts with `path_prefix`
    ///
    /// A raw, case-sensitive string prefix: `class=emf:Case` also matches
    /// `class=emf:CaseFile`.
    pub fn is_under(&self, path_prefix: &str) -> bool {
        self.path.starts_with(path_prefix)
    }
}
