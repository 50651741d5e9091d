//! Non-fatal validation findings
//!
//! Findings describe drift between what a change expects the store to hold
//! and what it actually holds. They are data, never errors; the caller decides
//! whether they block a deployment.

pub mod collector;
pub mod message;

pub use collector::ValidationMessageCollector;
pub use message::{MessageCode, ValidationMessage};
