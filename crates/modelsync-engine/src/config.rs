//! Engine configuration
//!
//! ```toml
//! [reconciler]
//! deployment_context = "http://example.com/graph/model"
//! inconsistency_policy = "warn_and_continue"   # or "fail_fast"
//!
//! [deployment]
//! block_on_validation_warnings = false
//! statuses = ["APPLIED", "FAILED"]
//! ```

use std::path::Path;

use modelsync_core::errors::{ExError, ExErrorKind, Result};
use modelsync_core::{ChangeStatus, ReconcilerConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub reconciler: ReconcilerConfig,
    #[serde(default)]
    pub deployment: DeploymentConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Fail a change instead of deploying it when the store drifted from
    /// what its removals expect
    #[serde(default)]
    pub block_on_validation_warnings: bool,
    /// Lifecycle states eligible for deployment
    #[serde(default = "default_statuses")]
    pub statuses: Vec<ChangeStatus>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            block_on_validation_warnings: false,
            statuses: default_statuses(),
        }
    }
}

/// Failed changes are retried so a failure keeps blocking later changes
fn default_statuses() -> Vec<ChangeStatus> {
    vec![ChangeStatus::Applied, ChangeStatus::Failed]
}

impl EngineConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `Configuration` if it does not parse
    /// or fails validation.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_config")
                .with_entity_id(path.display().to_string())
                .with_message(e.to_string())
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content).map_err(|e| {
            ExError::new(ExErrorKind::Configuration)
                .with_op("parse_config")
                .with_message(e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| {
            ExError::new(ExErrorKind::Configuration)
                .with_op("validate_config")
                .with_message(msg.to_string())
        };
        if self.reconciler.deployment_context.as_str().trim().is_empty() {
            return Err(invalid("reconciler.deployment_context cannot be empty"));
        }
        if self.deployment.statuses.is_empty() {
            return Err(invalid("deployment.statuses cannot be empty"));
        }
        if self
            .deployment
            .statuses
            .iter()
            .any(|s| matches!(s, ChangeStatus::Pending | ChangeStatus::Deployed))
        {
            return Err(invalid(
                "deployment.statuses may only contain APPLIED and FAILED",
            ));
        }
        Ok(())
    }
}
