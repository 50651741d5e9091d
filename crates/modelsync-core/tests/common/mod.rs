use modelsync_core::{
    InconsistencyPolicy, Iri, MemoryRepository, ReconcilerConfig, SemanticReconciler, Statement,
    Term,
};

pub const SUBJECT: &str = "http://example.com/model#Case";
pub const PREDICATE: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";

/// Named graph used as the deployment context in tests
#[allow(dead_code)]
pub fn deploy_graph() -> Iri {
    Iri::new("http://example.com/graph/deployed")
}

/// Statement on the shared test subject/predicate
#[allow(dead_code)]
pub fn stmt(object: Term) -> Statement {
    Statement::new(SUBJECT, PREDICATE, object)
}

/// Repository seeded with `objects` under the test subject/predicate
#[allow(dead_code)]
pub fn repo_with(objects: Vec<Term>) -> MemoryRepository {
    let statements: Vec<Statement> = objects.into_iter().map(stmt).collect();
    MemoryRepository::new().with_statements(&statements, &deploy_graph())
}

#[allow(dead_code)]
pub fn reconciler() -> SemanticReconciler {
    SemanticReconciler::new(ReconcilerConfig::new(deploy_graph()))
}

#[allow(dead_code)]
pub fn fail_fast_reconciler() -> SemanticReconciler {
    SemanticReconciler::new(
        ReconcilerConfig::new(deploy_graph()).with_policy(InconsistencyPolicy::FailFast),
    )
}
