//! modelsync Core - model-change ledger and semantic-store reconciliation
//!
//! This crate provides:
//! - `ModelChange` records with an explicit lifecycle state machine
//!   (`Pending → Applied → {Deployed | Failed}`)
//! - The `ChangeLedger` trait with an in-memory backend
//! - RDF terms, statements and the `RdfRepository` collaborator trait
//! - `SemanticReconciler`: store-state validation and transactional
//!   add/remove diffs with a literal-shape removal policy
//! - Structured errors (`ExError`) and the logging facility
//!
//! The SQLite ledger backend lives in `modelsync-store`; the deployment
//! cycle driver lives in `modelsync-engine`.

pub mod errors;
pub mod ledger;
pub mod logging_facility;
pub mod model;
pub mod rdf;
pub mod reconcile;
pub mod validation;

pub use modelsync_core_types as core_types;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, SyncError};
pub use ledger::{ChangeLedger, InMemoryLedger};
pub use model::{
    ChangeId, ChangeState, ChangeStatus, Iri, Literal, LiteralKind, ModelChange, Statement, Term,
};
pub use rdf::{MemoryRepository, RdfRepository};
pub use reconcile::{
    Inconsistency, InconsistencyPolicy, InconsistencyReason, LiteralEquivalenceClass,
    ReconcilerConfig, RemovalResolution, SaveReport, SemanticReconciler,
};
pub use validation::{MessageCode, ValidationMessage, ValidationMessageCollector};
