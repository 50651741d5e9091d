//! Semantic store access
//!
//! The triple store is an external collaborator. `RdfRepository` is the
//! narrow surface the reconciler needs; `MemoryRepository` backs tests and
//! embedded use.

pub mod memory;
pub mod repository;

pub use memory::MemoryRepository;
pub use repository::RdfRepository;
