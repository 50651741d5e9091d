//! Core types shared across modelsync facilities
//!
//! This crate provides foundational types used by the error handling,
//! logging, ledger and reconciliation layers:
//!
//! - **Correlation types**: RequestId (change batch identifier)
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::RequestId;
