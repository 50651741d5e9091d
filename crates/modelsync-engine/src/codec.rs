//! Change payload codec
//!
//! A change's `change_data` is a JSON `StatementDiff`: the statements the
//! change adds and the statements it expects to replace.

use modelsync_core::errors::{ExError, ExErrorKind, Result, SyncError};
use modelsync_core::{ModelChange, Statement};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementDiff {
    #[serde(default)]
    pub add: Vec<Statement>,
    #[serde(default)]
    pub remove: Vec<Statement>,
}

impl StatementDiff {
    pub fn new(add: Vec<Statement>, remove: Vec<Statement>) -> Self {
        Self { add, remove }
    }

    /// Decode the payload of `change`
    ///
    /// # Errors
    ///
    /// `InvalidChangeData` when the payload is not a valid diff.
    pub fn decode(change: &ModelChange) -> Result<Self> {
        serde_json::from_str(&change.change_data).map_err(|e| {
            ExError::from(SyncError::InvalidChangeData {
                change_id: change.id.get(),
                reason: e.to_string(),
            })
            .with_op("decode_change_data")
        })
    }

    /// Serialize into the `change_data` form
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("encode_change_data")
                .with_message(e.to_string())
        })
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}
