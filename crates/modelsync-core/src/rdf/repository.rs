use crate::errors::Result;
use crate::model::{Iri, Statement, Term};

/// Connection to an RDF repository
///
/// Statements returned by `get_statements` carry the named graph they were
/// read from in `context`, so removing them targets that graph only.
pub trait RdfRepository {
    /// All statements matching the pattern; `None` is a wildcard.
    fn get_statements(
        &self,
        subject: Option<&Iri>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> Result<Vec<Statement>>;

    /// Insert statements into the named graph `context`.
    fn add(&mut self, statements: &[Statement], context: &Iri) -> Result<()>;

    /// Remove a statement. Without a context the triple is removed from
    /// every graph holding it.
    fn remove(&mut self, statement: &Statement) -> Result<()>;

    /// Start a unit of work; writes become visible to readers on this
    /// connection immediately but are discarded by `rollback`.
    ///
    /// # Errors
    ///
    /// `IllegalState` if a transaction is already active.
    fn begin(&mut self) -> Result<()>;

    /// # Errors
    ///
    /// `IllegalState` if no transaction is active.
    fn commit(&mut self) -> Result<()>;

    /// # Errors
    ///
    /// `IllegalState` if no transaction is active.
    fn rollback(&mut self) -> Result<()>;

    /// Current objects bound to (subject, predicate), across all graphs
    fn objects(&self, subject: &Iri, predicate: &Iri) -> Result<Vec<Term>> {
        Ok(self
            .get_statements(Some(subject), Some(predicate), None)?
            .into_iter()
            .map(|s| s.object)
            .collect())
    }
}
