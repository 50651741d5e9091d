//! Reconciliation of intended statement changes with the live store
//!
//! The store declares no per-predicate cardinality. Which existing triples a
//! removal must take out is inferred from the shape of the target literal
//! (see [`LiteralEquivalenceClass`]).

pub mod equivalence;
pub mod policy;
pub mod reconciler;

pub use equivalence::LiteralEquivalenceClass;
pub use policy::{Inconsistency, InconsistencyPolicy, InconsistencyReason};
pub use reconciler::{ReconcilerConfig, RemovalResolution, SaveReport, SemanticReconciler};
