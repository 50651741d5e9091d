// Integration tests for the migration framework

use modelsync_store::migrations::{apply_migrations, compute_checksum, get_migrations};
use rusqlite::Connection;

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

#[test]
fn test_apply_migrations_on_empty_db() {
    // Given: An empty SQLite database
    let mut conn = setup_test_db();

    // When: Migrations are applied
    let result = apply_migrations(&mut conn);

    // Then: All migrations succeed
    assert!(result.is_ok(), "Migrations should succeed: {:?}", result.err());

    // And: The ledger tables exist (sqlite_sequence comes from AUTOINCREMENT)
    let tables = get_table_names(&conn);
    for expected in ["model_changes", "schema_version", "sqlite_sequence"] {
        assert!(
            tables.contains(&expected.to_string()),
            "Missing table: {}",
            expected
        );
    }
}

#[test]
fn test_migration_idempotency() {
    // Given: A database with migrations already applied
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    // When: Migrations are re-run
    let result = apply_migrations(&mut conn);

    // Then: Re-running succeeds without duplicate version entries
    assert!(result.is_ok(), "Re-running migrations should succeed");
    let version_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version_count, get_migrations().len() as i64);
}

#[test]
fn test_checksum_is_recorded() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    let checksum: String = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?",
            ["001_model_changes"],
            |row| row.get(0),
        )
        .unwrap();

    assert_eq!(checksum.len(), 64, "SHA256 checksum should be 64 hex chars");
    assert_eq!(checksum, compute_checksum(get_migrations()[0].sql));
}

#[test]
fn test_checksum_mismatch_is_rejected() {
    // Given: A database whose recorded checksum no longer matches the embedded SQL
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();
    conn.execute(
        "UPDATE schema_version SET checksum = 'edited' WHERE migration_id = '001_model_changes'",
        [],
    )
    .unwrap();

    // When: Migrations are re-run
    let err = apply_migrations(&mut conn).unwrap_err();

    // Then: The run fails with a persistence error naming the migration
    assert_eq!(err.code(), "ERR_PERSISTENCE");
    assert!(err.message().contains("001_model_changes"));
}

#[test]
fn test_schema_rejects_deployed_without_applied() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    let result = conn.execute(
        "INSERT INTO model_changes
            (request_id, path, initial_version, change_data, created_by, created_on, deployed_on, status)
         VALUES ('r', 'p', 1, '{}', 'u', 0, 5, 'DEPLOYED')",
        [],
    );
    assert!(result.is_err(), "CHECK constraint should reject the row");
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .unwrap();

    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}
