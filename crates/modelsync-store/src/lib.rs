//! modelsync Store - SQLite persistence for the change ledger
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - `SqliteLedger`, the durable `ChangeLedger` backend

pub mod db;
pub mod errors;
pub mod ledger;
pub mod migrations;

// Re-export key types
pub use errors::Result;
pub use ledger::SqliteLedger;
