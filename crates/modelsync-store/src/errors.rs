//! Error handling for modelsync-store
//!
//! Wraps modelsync-core ExError with store-specific helpers

use modelsync_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// A persisted value that does not fit the domain type
pub fn corrupt_row(change_id: i64, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("read_change")
        .with_entity_id(change_id.to_string())
        .with_message(format!("corrupt model_changes row: {}", reason))
}

/// A version too large for SQLite's signed 64-bit integers
pub fn version_out_of_range(version: u64) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("sqlite")
        .with_message(format!("version {} exceeds the storable range", version))
}
