use serde::{Deserialize, Serialize};

use crate::errors::SyncError;
use crate::model::{Iri, Term};

/// What `save_changes` does when a removal target cannot be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InconsistencyPolicy {
    /// Log the inconsistency, skip the target and keep going
    #[default]
    WarnAndContinue,
    /// Abort the whole diff and roll back
    FailFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InconsistencyReason {
    /// The store holds nothing for (subject, predicate)
    NothingFound,
    /// Values exist but no removal rule selected any of them
    Ambiguous,
}

impl InconsistencyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InconsistencyReason::NothingFound => "expected a value but the store holds none",
            InconsistencyReason::Ambiguous => "no removal rule matched the stored values",
        }
    }
}

/// A removal target the store content does not account for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inconsistency {
    pub subject: Iri,
    pub predicate: Iri,
    pub target: Term,
    pub reason: InconsistencyReason,
}

impl std::fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}: {}",
            self.subject,
            self.predicate,
            self.target,
            self.reason.as_str()
        )
    }
}

impl From<&Inconsistency> for SyncError {
    fn from(i: &Inconsistency) -> Self {
        SyncError::Inconsistency {
            subject: i.subject.as_str().to_string(),
            predicate: i.predicate.as_str().to_string(),
            reason: format!("{} (target {})", i.reason.as_str(), i.target),
        }
    }
}
