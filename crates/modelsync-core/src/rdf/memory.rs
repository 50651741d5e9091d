use std::collections::BTreeSet;

use super::RdfRepository;
use crate::errors::{ExError, ExErrorKind, Result};
use crate::model::{Iri, Statement, Term};

/// In-memory quad store
///
/// Statements are kept in a `BTreeSet`, so reads are deterministic.
/// Transactions snapshot the whole set on `begin` and restore it on
/// `rollback`.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    statements: BTreeSet<Statement>,
    snapshot: Option<BTreeSet<Statement>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with statements in `context`, outside any transaction
    pub fn with_statements(mut self, statements: &[Statement], context: &Iri) -> Self {
        for s in statements {
            self.statements.insert(s.clone().in_context(context.clone()));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Whether the triple is present in any graph
    pub fn contains_triple(&self, statement: &Statement) -> bool {
        self.statements.iter().any(|s| s.same_triple(statement))
    }

    fn no_transaction(op: &str) -> ExError {
        ExError::new(ExErrorKind::IllegalState)
            .with_op(op.to_string())
            .with_message("no active transaction")
    }
}

impl RdfRepository for MemoryRepository {
    fn get_statements(
        &self,
        subject: Option<&Iri>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> Result<Vec<Statement>> {
        Ok(self
            .statements
            .iter()
            .filter(|s| subject.map_or(true, |v| &s.subject == v))
            .filter(|s| predicate.map_or(true, |v| &s.predicate == v))
            .filter(|s| object.map_or(true, |v| &s.object == v))
            .cloned()
            .collect())
    }

    fn add(&mut self, statements: &[Statement], context: &Iri) -> Result<()> {
        for s in statements {
            self.statements.insert(s.clone().in_context(context.clone()));
        }
        Ok(())
    }

    fn remove(&mut self, statement: &Statement) -> Result<()> {
        match &statement.context {
            Some(_) => {
                self.statements.remove(statement);
            }
            None => self.statements.retain(|s| !s.same_triple(statement)),
        }
        Ok(())
    }

    fn begin(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            return Err(ExError::new(ExErrorKind::IllegalState)
                .with_op("begin")
                .with_message("transaction already active"));
        }
        self.snapshot = Some(self.statements.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or_else(|| Self::no_transaction("commit"))
    }

    fn rollback(&mut self) -> Result<()> {
        let snapshot = self
            .snapshot
            .take()
            .ok_or_else(|| Self::no_transaction("rollback"))?;
        self.statements = snapshot;
        Ok(())
    }
}
