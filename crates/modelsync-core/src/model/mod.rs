pub mod change;
pub mod lifecycle;
pub mod rdf;

pub use change::{now_utc, ChangeId, ModelChange};
pub use lifecycle::{Applied, ChangeState, ChangeStatus, Deployed, Failed};
pub use rdf::{Iri, Literal, LiteralKind, Statement, Term};
