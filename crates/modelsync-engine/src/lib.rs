//! modelsync Engine - Deployment orchestration
//!
//! Drives applied ledger changes into the semantic store:
//! - `run_deployment_cycle` walks the deployable frontier in id order
//! - `StatementDiff` decodes each change's payload
//! - `pending_conflicts` guards new batches against in-flight changes
//! - `EngineConfig` loads reconciler and deployment settings from TOML
//!
//! ## Logging Ownership
//!
//! The engine owns lifecycle logging for the deployment cycle
//! (`log_op_start!` / `log_op_end!` / `log_op_error!`). The ledger backends
//! use only `tracing::debug!()` for internal details.

pub mod codec;
pub mod config;
pub mod conflicts;
pub mod deploy;

pub use codec::StatementDiff;
pub use config::{DeploymentConfig, EngineConfig};
pub use conflicts::{pending_conflicts, request_conflicts};
pub use deploy::{run_deployment_cycle, DeploymentFailure, DeploymentReport};
