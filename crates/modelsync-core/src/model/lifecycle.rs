//! Model change lifecycle state machine
//!
//! `Pending → Applied → {Deployed | Failed}`
//!
//! Each state owns only the milestones that are valid in it, so a change can
//! never carry a deployment timestamp without an applied timestamp, nor both a
//! deployment and a failure. The typed states (`Applied`, `Deployed`,
//! `Failed`) expose only the transitions they permit; `ChangeState` dispatches
//! over them and reports forbidden transitions as `SyncError`s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SyncError;

/// Lifecycle label persisted alongside a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeStatus {
    Pending,
    Applied,
    Deployed,
    Failed,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeStatus::Pending => "PENDING",
            ChangeStatus::Applied => "APPLIED",
            ChangeStatus::Deployed => "DEPLOYED",
            ChangeStatus::Failed => "FAILED",
        }
    }

    /// Parse a persisted label; `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(ChangeStatus::Pending),
            "APPLIED" => Some(ChangeStatus::Applied),
            "DEPLOYED" => Some(ChangeStatus::Deployed),
            "FAILED" => Some(ChangeStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change confirmed against a model version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applied {
    pub version: u64,
    pub applied_on: DateTime<Utc>,
}

impl Applied {
    pub fn new(version: u64, applied_on: DateTime<Utc>) -> Self {
        Self {
            version,
            applied_on,
        }
    }

    /// Re-confirm against a newer (or equal) version.
    ///
    /// Returns the current version as the error value when `version` would
    /// move backwards.
    pub fn reapply(self, version: u64, applied_on: DateTime<Utc>) -> Result<Applied, u64> {
        if version < self.version {
            return Err(self.version);
        }
        Ok(Applied::new(version, applied_on))
    }

    pub fn deploy(self, deployed_on: DateTime<Utc>) -> Deployed {
        Deployed {
            applied: self,
            deployed_on,
        }
    }

    pub fn fail(self, failed_on: DateTime<Utc>, message: impl Into<String>) -> Failed {
        Failed {
            applied: self,
            failed_on,
            message: message.into(),
        }
    }
}

/// Terminal state: the change's statements are in the semantic store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployed {
    pub applied: Applied,
    pub deployed_on: DateTime<Utc>,
}

/// A deployment attempt failed; the change may be re-applied or redeployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failed {
    pub applied: Applied,
    pub failed_on: DateTime<Utc>,
    pub message: String,
}

impl Failed {
    /// A later attempt succeeded; the failure milestone is dropped.
    pub fn deploy(self, deployed_on: DateTime<Utc>) -> Deployed {
        self.applied.deploy(deployed_on)
    }

    pub fn reapply(self, version: u64, applied_on: DateTime<Utc>) -> Result<Applied, u64> {
        self.applied.reapply(version, applied_on)
    }

    /// A retried attempt failed again; the latest failure replaces this one.
    pub fn refail(self, failed_on: DateTime<Utc>, message: impl Into<String>) -> Failed {
        self.applied.fail(failed_on, message)
    }
}

/// Current lifecycle state of a model change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChangeState {
    Pending,
    Applied(Applied),
    Deployed(Deployed),
    Failed(Failed),
}

impl ChangeState {
    pub fn status(&self) -> ChangeStatus {
        match self {
            ChangeState::Pending => ChangeStatus::Pending,
            ChangeState::Applied(_) => ChangeStatus::Applied,
            ChangeState::Deployed(_) => ChangeStatus::Deployed,
            ChangeState::Failed(_) => ChangeStatus::Failed,
        }
    }

    fn applied(&self) -> Option<&Applied> {
        match self {
            ChangeState::Pending => None,
            ChangeState::Applied(a) => Some(a),
            ChangeState::Deployed(d) => Some(&d.applied),
            ChangeState::Failed(f) => Some(&f.applied),
        }
    }

    pub fn applied_version(&self) -> Option<u64> {
        self.applied().map(|a| a.version)
    }

    pub fn applied_on(&self) -> Option<DateTime<Utc>> {
        self.applied().map(|a| a.applied_on)
    }

    pub fn deployed_on(&self) -> Option<DateTime<Utc>> {
        match self {
            ChangeState::Deployed(d) => Some(d.deployed_on),
            _ => None,
        }
    }

    pub fn failed_on(&self) -> Option<DateTime<Utc>> {
        match self {
            ChangeState::Failed(f) => Some(f.failed_on),
            _ => None,
        }
    }

    pub fn status_message(&self) -> Option<&str> {
        match self {
            ChangeState::Failed(f) => Some(f.message.as_str()),
            _ => None,
        }
    }

    /// `mark_applied` transition.
    ///
    /// # Errors
    ///
    /// `AlreadyDeployed` from `Deployed`; `VersionRegression` if `version` is
    /// lower than the version already recorded.
    pub fn apply(
        self,
        change_id: u64,
        version: u64,
        applied_on: DateTime<Utc>,
    ) -> Result<ChangeState, SyncError> {
        let regression = |current| SyncError::VersionRegression {
            change_id,
            current,
            requested: version,
        };
        match self {
            ChangeState::Pending => Ok(ChangeState::Applied(Applied::new(version, applied_on))),
            ChangeState::Applied(a) => a
                .reapply(version, applied_on)
                .map(ChangeState::Applied)
                .map_err(regression),
            ChangeState::Failed(f) => f
                .reapply(version, applied_on)
                .map(ChangeState::Applied)
                .map_err(regression),
            ChangeState::Deployed(_) => Err(SyncError::AlreadyDeployed { change_id }),
        }
    }

    /// `mark_deployed` transition.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from `Pending` (never applied) or `Deployed`.
    pub fn deploy(self, change_id: u64, deployed_on: DateTime<Utc>) -> Result<ChangeState, SyncError> {
        match self {
            ChangeState::Applied(a) => Ok(ChangeState::Deployed(a.deploy(deployed_on))),
            ChangeState::Failed(f) => Ok(ChangeState::Deployed(f.deploy(deployed_on))),
            other => Err(SyncError::InvalidTransition {
                change_id,
                transition: "deploy",
                state: other.status().as_str(),
            }),
        }
    }

    /// `mark_failed` transition.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from `Pending` or `Deployed`.
    pub fn fail(
        self,
        change_id: u64,
        failed_on: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Result<ChangeState, SyncError> {
        match self {
            ChangeState::Applied(a) => Ok(ChangeState::Failed(a.fail(failed_on, message))),
            ChangeState::Failed(f) => Ok(ChangeState::Failed(f.refail(failed_on, message))),
            other => Err(SyncError::InvalidTransition {
                change_id,
                transition: "fail",
                state: other.status().as_str(),
            }),
        }
    }

    /// Rebuild a state from flat persisted milestones.
    ///
    /// # Errors
    ///
    /// `Internal` when the combination cannot describe a valid state (for
    /// example a deployment timestamp without an applied version).
    pub fn from_milestones(
        change_id: u64,
        applied_version: Option<u64>,
        applied_on: Option<DateTime<Utc>>,
        deployed_on: Option<DateTime<Utc>>,
        failed_on: Option<DateTime<Utc>>,
        status_message: Option<String>,
    ) -> Result<ChangeState, SyncError> {
        let corrupt = |reason: &str| SyncError::Internal {
            message: format!("change {} has corrupt lifecycle columns: {}", change_id, reason),
        };
        let applied = match (applied_version, applied_on) {
            (None, None) => None,
            (Some(version), Some(on)) => Some(Applied::new(version, on)),
            _ => return Err(corrupt("applied_version and applied_on disagree")),
        };
        match (applied, deployed_on, failed_on) {
            (None, None, None) => Ok(ChangeState::Pending),
            (Some(a), None, None) => Ok(ChangeState::Applied(a)),
            (Some(a), Some(d), None) => Ok(ChangeState::Deployed(a.deploy(d))),
            (Some(a), None, Some(f)) => Ok(ChangeState::Failed(
                a.fail(f, status_message.unwrap_or_default()),
            )),
            (None, _, _) => Err(corrupt("milestone set without applied_on")),
            (Some(_), Some(_), Some(_)) => Err(corrupt("both deployed_on and failed_on set")),
        }
    }
}
