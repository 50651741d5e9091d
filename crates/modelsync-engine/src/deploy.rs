//! Deployment cycle
//!
//! One cycle pushes every deployable change into the semantic store:
//!
//! 1. The horizon is the ledger's last known model version; an empty ledger
//!    has nothing to deploy.
//! 2. Changes applied at or below the horizon, not yet deployed and in one of
//!    the configured statuses are processed in ascending id order.
//! 3. Each change is decoded, its removals validated against the store,
//!    saved through the reconciler and marked deployed.
//! 4. The first change that fails is marked failed and the cycle stops;
//!    later changes may depend on it.
//!
//! Ledger errors abort the cycle and are returned as-is.

use std::time::Instant;

use modelsync_core::errors::{ExError, Result, SyncError};
use modelsync_core::model::now_utc;
use modelsync_core::{
    log_op_end, log_op_error, log_op_start, ChangeId, ChangeLedger, Inconsistency, ModelChange,
    RdfRepository, SemanticReconciler, ValidationMessage,
};

use crate::codec::StatementDiff;
use crate::config::DeploymentConfig;

/// A change whose deployment failed during a cycle
#[derive(Debug, Clone)]
pub struct DeploymentFailure {
    pub change_id: ChangeId,
    pub error: ExError,
}

#[derive(Debug, Clone, Default)]
pub struct DeploymentReport {
    /// Version bound used for this cycle; `None` when the ledger was empty
    pub horizon: Option<u64>,
    pub deployed: Vec<ChangeId>,
    pub failed: Option<DeploymentFailure>,
    /// Changes left for a later cycle because an earlier one failed
    pub skipped: Vec<ChangeId>,
    /// Validation findings of the processed changes
    pub warnings: Vec<ValidationMessage>,
    /// Removal targets skipped by the reconciler
    pub inconsistencies: Vec<Inconsistency>,
}

impl DeploymentReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }
}

/// Run one deployment cycle
///
/// # Errors
///
/// Only ledger failures are returned as errors. A change that cannot be
/// deployed is recorded with `mark_failed` and reported in
/// `DeploymentReport::failed`.
pub fn run_deployment_cycle(
    ledger: &mut dyn ChangeLedger,
    repo: &mut dyn RdfRepository,
    reconciler: &SemanticReconciler,
    config: &DeploymentConfig,
) -> Result<DeploymentReport> {
    log_op_start!("deployment_cycle");
    let start = Instant::now();

    let result = run_cycle_impl(ledger, repo, reconciler, config).map_err(|e| {
        log_op_error!(
            "deployment_cycle",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "deployment_cycle",
        duration_ms = start.elapsed().as_millis() as u64,
        deployed = result.deployed.len(),
        failed = result.failed.is_some()
    );
    Ok(result)
}

fn run_cycle_impl(
    ledger: &mut dyn ChangeLedger,
    repo: &mut dyn RdfRepository,
    reconciler: &SemanticReconciler,
    config: &DeploymentConfig,
) -> Result<DeploymentReport> {
    let mut report = DeploymentReport {
        horizon: ledger.last_known_model_version()?,
        ..Default::default()
    };
    let Some(horizon) = report.horizon else {
        tracing::debug!("Ledger is empty; nothing to deploy");
        return Ok(report);
    };

    let changes = ledger.not_deployed_changes(horizon, &config.statuses)?;
    tracing::debug!(horizon, count = changes.len(), "Deployable changes");

    let mut pending = changes.into_iter();
    for change in pending.by_ref() {
        match deploy_change(&change, repo, reconciler, config, &mut report) {
            Ok(()) => {
                ledger.mark_deployed(&[change.id], now_utc())?;
                report.deployed.push(change.id);
            }
            Err(error) => {
                let error = error.with_request_id(change.request_id.clone());
                tracing::warn!(
                    change_id = change.id.get(),
                    path = change.path.as_str(),
                    err_code = error.code(),
                    "Deployment of change failed"
                );
                ledger.mark_failed(change.id, now_utc(), &error.to_string())?;
                report.failed = Some(DeploymentFailure {
                    change_id: change.id,
                    error,
                });
                break;
            }
        }
    }
    report.skipped = pending.map(|c| c.id).collect();

    Ok(report)
}

fn deploy_change(
    change: &ModelChange,
    repo: &mut dyn RdfRepository,
    reconciler: &SemanticReconciler,
    config: &DeploymentConfig,
    report: &mut DeploymentReport,
) -> Result<()> {
    let diff = StatementDiff::decode(change)?;

    let warnings = reconciler.validate_database_state(&*repo, &diff.remove)?;
    if !warnings.is_empty() {
        tracing::warn!(
            change_id = change.id.get(),
            count = warnings.len(),
            "Store state differs from what the change expects"
        );
        if config.block_on_validation_warnings {
            let count = warnings.len();
            report.warnings.extend(warnings);
            return Err(SyncError::ValidationBlocked {
                change_id: change.id.get(),
                count,
            }
            .into());
        }
        report.warnings.extend(warnings);
    }

    let saved = reconciler.save_changes(repo, &diff.add, &diff.remove)?;
    report.inconsistencies.extend(saved.inconsistencies);
    Ok(())
}
