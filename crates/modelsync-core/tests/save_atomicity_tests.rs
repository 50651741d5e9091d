#![allow(clippy::unwrap_used, clippy::expect_used)]

/// A failure anywhere in `save_changes` leaves the store untouched
mod common;

use common::{fail_fast_reconciler, reconciler, repo_with, stmt};
use modelsync_core::{
    ExError, ExErrorKind, Iri, MemoryRepository, RdfRepository, Result, Statement, Term,
};

/// Repository whose inserts fail, to simulate a connection dropping after
/// removals went through
struct FailingInsertRepository {
    inner: MemoryRepository,
}

impl RdfRepository for FailingInsertRepository {
    fn get_statements(
        &self,
        subject: Option<&Iri>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> Result<Vec<Statement>> {
        self.inner.get_statements(subject, predicate, object)
    }

    fn add(&mut self, _statements: &[Statement], _context: &Iri) -> Result<()> {
        Err(ExError::new(ExErrorKind::Repository)
            .with_op("add")
            .with_message("connection reset"))
    }

    fn remove(&mut self, statement: &Statement) -> Result<()> {
        self.inner.remove(statement)
    }

    fn begin(&mut self) -> Result<()> {
        self.inner.begin()
    }

    fn commit(&mut self) -> Result<()> {
        self.inner.commit()
    }

    fn rollback(&mut self) -> Result<()> {
        self.inner.rollback()
    }
}

#[test]
fn test_insert_failure_rolls_back_removals() {
    // GIVEN a store holding the old value
    let mut repo = FailingInsertRepository {
        inner: repo_with(vec![Term::string("old")]),
    };

    // WHEN replacing it and the insert fails
    let err = reconciler()
        .save_changes(
            &mut repo,
            &[stmt(Term::string("new"))],
            &[stmt(Term::string("old"))],
        )
        .unwrap_err();

    // THEN the repository error propagates unchanged
    assert_eq!(err.kind(), ExErrorKind::Repository);
    assert_eq!(err.code(), "ERR_REPOSITORY");

    // AND the removal was rolled back
    assert!(repo.inner.contains_triple(&stmt(Term::string("old"))));
    assert_eq!(repo.inner.len(), 1);
    assert!(!repo.inner.in_transaction());
}

#[test]
fn test_fail_fast_aborts_before_any_removal() {
    // GIVEN one resolvable and one unresolvable removal target
    let mut repo = repo_with(vec![Term::string("present")]);
    let before = repo.get_statements(None, None, None).unwrap();

    // WHEN saving under fail-fast
    let err = fail_fast_reconciler()
        .save_changes(
            &mut repo,
            &[stmt(Term::iri("http://example.com/new"))],
            &[
                stmt(Term::string("present")),
                Statement::new(common::SUBJECT, "http://example.com/other", Term::string("gone")),
            ],
        )
        .unwrap_err();

    // THEN the error is an inconsistency and the store is unchanged
    assert_eq!(err.kind(), ExErrorKind::InconsistencyDetected);
    assert_eq!(err.op(), Some("save_changes"));
    assert_eq!(repo.get_statements(None, None, None).unwrap(), before);
}

#[test]
fn test_warn_and_continue_applies_the_rest() {
    // GIVEN the same inputs as the fail-fast case
    let mut repo = repo_with(vec![Term::string("present")]);

    // WHEN saving under the default policy
    let report = reconciler()
        .save_changes(
            &mut repo,
            &[stmt(Term::iri("http://example.com/new"))],
            &[
                stmt(Term::string("present")),
                Statement::new(common::SUBJECT, "http://example.com/other", Term::string("gone")),
            ],
        )
        .unwrap();

    // THEN the resolvable removal and the insert happen
    assert_eq!(report.removed.len(), 1);
    assert_eq!(report.added, 1);
    assert_eq!(report.inconsistencies.len(), 1);
    assert!(repo.contains_triple(&stmt(Term::iri("http://example.com/new"))));
    assert!(!repo.contains_triple(&stmt(Term::string("present"))));
}

#[test]
fn test_added_statements_land_in_deployment_context() {
    let mut repo = repo_with(vec![]);
    reconciler()
        .save_changes(&mut repo, &[stmt(Term::string("v"))], &[])
        .unwrap();
    let stored = repo.get_statements(None, None, None).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].context, Some(common::deploy_graph()));
}
