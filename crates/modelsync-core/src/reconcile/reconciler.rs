//! Semantic reconciler
//!
//! Validates expected-vs-actual store state and applies statement diffs.
//!
//! ## Guarantees
//!
//! `save_changes` runs the whole diff inside one repository transaction:
//! removals first, then insertions into the deployment context. Any error
//! rolls the transaction back, so the store either reflects the full diff
//! or is left untouched. Insertion follows removal so that a triple present
//! in both `old` and `new` ends up stored.

use std::time::Instant;

use modelsync_core_types::schema::EVENT_INCONSISTENCY;
use serde::{Deserialize, Serialize};

use super::equivalence::LiteralEquivalenceClass;
use super::policy::{Inconsistency, InconsistencyPolicy, InconsistencyReason};
use crate::errors::{ExError, Result, SyncError};
use crate::model::{Iri, Statement, Term};
use crate::rdf::RdfRepository;
use crate::validation::{ValidationMessage, ValidationMessageCollector};
use crate::{log_op_end, log_op_error, log_op_start};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Named graph every added statement is written into
    pub deployment_context: Iri,
    #[serde(default)]
    pub inconsistency_policy: InconsistencyPolicy,
}

impl ReconcilerConfig {
    pub fn new(deployment_context: Iri) -> Self {
        Self {
            deployment_context,
            inconsistency_policy: InconsistencyPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: InconsistencyPolicy) -> Self {
        self.inconsistency_policy = policy;
        self
    }
}

/// Outcome of resolving one removal target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalResolution {
    /// Statements to remove; empty when an empty-literal target met an
    /// already empty predicate
    Resolved(Vec<Statement>),
    Inconsistent(Inconsistency),
}

/// What a successful `save_changes` did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Statements removed, with the graph they were removed from
    pub removed: Vec<Statement>,
    /// Number of statements inserted into the deployment context
    pub added: usize,
    /// Removal targets skipped under `WarnAndContinue`
    pub inconsistencies: Vec<Inconsistency>,
}

#[derive(Debug, Clone)]
pub struct SemanticReconciler {
    config: ReconcilerConfig,
}

impl SemanticReconciler {
    pub fn new(config: ReconcilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Compare `expected` with what the store currently holds
    ///
    /// Read-only. Drift is reported as messages; only repository failures
    /// are errors.
    pub fn validate_database_state(
        &self,
        repo: &dyn RdfRepository,
        expected: &[Statement],
    ) -> Result<Vec<ValidationMessage>> {
        let mut collector = ValidationMessageCollector::new();

        for stmt in expected {
            let found = distinct(repo.objects(&stmt.subject, &stmt.predicate)?);

            if stmt.object.is_empty_literal_marker() {
                if !found.is_empty() {
                    collector.add_excess(&stmt.subject, &stmt.predicate, &found);
                }
            } else if found.is_empty() {
                collector.add_missing(&stmt.subject, &stmt.predicate, &stmt.object);
            } else if !found.contains(&stmt.object) {
                collector.add_mismatch(&stmt.subject, &stmt.predicate, &stmt.object, &found);
            }
        }

        tracing::debug!(
            expected = expected.len(),
            messages = collector.len(),
            "Validated store state"
        );
        Ok(collector.into_messages())
    }

    /// Decide which stored statements a removal of `target` must delete
    pub fn resolve_removal_candidates(
        &self,
        repo: &dyn RdfRepository,
        target: &Statement,
    ) -> Result<RemovalResolution> {
        let found = repo.get_statements(Some(&target.subject), Some(&target.predicate), None)?;

        if found.is_empty() {
            if target.object.is_empty_literal_marker() {
                return Ok(RemovalResolution::Resolved(Vec::new()));
            }
            return Ok(self.inconsistent(target, InconsistencyReason::NothingFound));
        }

        match LiteralEquivalenceClass::candidates_for_removal(target, &found) {
            Some(candidates) => Ok(RemovalResolution::Resolved(candidates)),
            None => Ok(self.inconsistent(target, InconsistencyReason::Ambiguous)),
        }
    }

    /// Apply a statement diff to the store in one transaction
    ///
    /// # Errors
    ///
    /// - `InconsistencyDetected` under `FailFast` when a removal target
    ///   cannot be resolved
    /// - Repository errors, propagated as-is
    ///
    /// The transaction is rolled back in both cases.
    pub fn save_changes(
        &self,
        repo: &mut dyn RdfRepository,
        new: &[Statement],
        old: &[Statement],
    ) -> Result<SaveReport> {
        log_op_start!("save_changes", added = new.len(), removed = old.len());
        let start = Instant::now();

        repo.begin()?;
        let report = match self.apply_diff(repo, new, old) {
            Ok(report) => report,
            Err(e) => {
                if let Err(rollback_err) = repo.rollback() {
                    tracing::error!(error = %rollback_err, "Rollback failed after save error");
                }
                log_op_error!(
                    "save_changes",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                return Err(e);
            }
        };
        repo.commit().map_err(|e| {
            log_op_error!(
                "save_changes",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "save_changes",
            duration_ms = start.elapsed().as_millis() as u64,
            removed = report.removed.len(),
            added = report.added,
            inconsistencies = report.inconsistencies.len()
        );
        Ok(report)
    }

    fn apply_diff(
        &self,
        repo: &mut dyn RdfRepository,
        new: &[Statement],
        old: &[Statement],
    ) -> Result<SaveReport> {
        let mut report = SaveReport::default();

        // Resolve every target before touching the store so that removing
        // one value cannot change what a later target resolves to.
        let mut removals = Vec::new();
        for target in old {
            match self.resolve_removal_candidates(&*repo, target)? {
                RemovalResolution::Resolved(candidates) => removals.extend(candidates),
                RemovalResolution::Inconsistent(inconsistency) => {
                    if self.config.inconsistency_policy == InconsistencyPolicy::FailFast {
                        return Err(ExError::from(SyncError::from(&inconsistency))
                            .with_op("save_changes"));
                    }
                    report.inconsistencies.push(inconsistency);
                }
            }
        }
        removals.sort();
        removals.dedup();

        for stmt in &removals {
            repo.remove(stmt)?;
        }
        report.removed = removals;

        if !new.is_empty() {
            repo.add(new, &self.config.deployment_context)?;
        }
        report.added = new.len();

        Ok(report)
    }

    fn inconsistent(&self, target: &Statement, reason: InconsistencyReason) -> RemovalResolution {
        let inconsistency = Inconsistency {
            subject: target.subject.clone(),
            predicate: target.predicate.clone(),
            target: target.object.clone(),
            reason,
        };
        tracing::warn!(
            event = EVENT_INCONSISTENCY,
            subject = inconsistency.subject.as_str(),
            predicate = inconsistency.predicate.as_str(),
            target = %inconsistency.target,
            reason = reason.as_str(),
            "Removal target does not match store state"
        );
        RemovalResolution::Inconsistent(inconsistency)
    }
}

/// Drop duplicate objects (the same value stored in several graphs),
/// keeping first-seen order
fn distinct(terms: Vec<Term>) -> Vec<Term> {
    let mut out: Vec<Term> = Vec::with_capacity(terms.len());
    for t in terms {
        if !out.contains(&t) {
            out.push(t);
        }
    }
    out
}
