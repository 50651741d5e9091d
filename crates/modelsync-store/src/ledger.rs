//! SQLite change ledger
//!
//! Persists `ModelChange` rows in the `model_changes` table. The lifecycle
//! state is flattened into milestone columns on write and rebuilt through
//! `ChangeState::from_milestones` on read, so a corrupt row surfaces as an
//! error instead of an impossible state.
//!
//! `mark_deployed` and `mark_failed` are single guarded `UPDATE`s; replaying
//! them after a redelivery touches no rows.

use std::path::Path;

use chrono::{DateTime, Utc};
use modelsync_core::ledger::{queries, ChangeLedger};
use modelsync_core::model::{now_utc, ChangeId, ChangeState, ChangeStatus, ModelChange};
use modelsync_core::SyncError;
use modelsync_core_types::RequestId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::db;
use crate::errors::{corrupt_row, from_rusqlite, version_out_of_range, Result};
use crate::migrations::apply_migrations;

const SELECT_COLUMNS: &str = "SELECT id, request_id, path, initial_version, applied_version, \
     change_data, created_by, created_on, applied_on, deployed_on, failed_on, status_message \
     FROM model_changes";

/// Durable `ChangeLedger` backed by a single SQLite connection
pub struct SqliteLedger {
    conn: Connection,
}

impl SqliteLedger {
    /// Open (or create) a ledger database file and bring its schema up to date
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = db::open(path)?;
        db::configure(&conn)?;
        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory ledger
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    /// Wrap an existing connection, applying pending migrations
    pub fn from_connection(mut conn: Connection) -> Result<Self> {
        apply_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn query_changes(
        &self,
        where_clause: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<ModelChange>> {
        let sql = format!("{} WHERE {} ORDER BY id ASC", SELECT_COLUMNS, where_clause);
        let mut stmt = self.conn.prepare(&sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(params, ChangeRow::from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        rows.into_iter().map(ChangeRow::into_change).collect()
    }
}

impl ChangeLedger for SqliteLedger {
    fn append_change(
        &mut self,
        request_id: &RequestId,
        path: &str,
        initial_version: u64,
        created_by: &str,
        change_data: &str,
    ) -> Result<ModelChange> {
        queries::validate_path(path)?;
        let created_on = now_utc();
        self.conn
            .execute(
                "INSERT INTO model_changes
                    (request_id, path, initial_version, change_data, created_by, created_on, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    request_id.as_str(),
                    path,
                    to_sql_version(initial_version)?,
                    change_data,
                    created_by,
                    created_on.timestamp_millis(),
                    ChangeStatus::Pending.as_str(),
                ],
            )
            .map_err(from_rusqlite)?;
        let id = self.conn.last_insert_rowid();

        tracing::debug!(change_id = id, path, "Appended model change");
        Ok(ModelChange {
            id: ChangeId(from_sql_id(id)?),
            request_id: request_id.clone(),
            path: path.to_string(),
            initial_version,
            change_data: change_data.to_string(),
            created_by: created_by.to_string(),
            created_on,
            state: ChangeState::Pending,
        })
    }

    fn get_change(&self, id: ChangeId) -> Result<Option<ModelChange>> {
        let row = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![to_sql_id(id)?],
                ChangeRow::from_row,
            )
            .optional()
            .map_err(from_rusqlite)?;
        row.map(ChangeRow::into_change).transpose()
    }

    fn mark_applied(&mut self, id: ChangeId, applied_version: u64) -> Result<ModelChange> {
        let tx = self.conn.transaction().map_err(from_rusqlite)?;

        let row = tx
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![to_sql_id(id)?],
                ChangeRow::from_row,
            )
            .optional()
            .map_err(from_rusqlite)?
            .ok_or(SyncError::ChangeNotFound { change_id: id.get() })?;

        let mut change = row.into_change()?;
        change.state = change.state.apply(id.get(), applied_version, now_utc())?;

        write_state(&tx, &change)?;
        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(change_id = id.get(), applied_version, "Marked change applied");
        Ok(change)
    }

    fn changes_since(&self, version: u64) -> Result<Vec<ModelChange>> {
        self.query_changes(
            "applied_version > ?1 AND deployed_on IS NULL",
            params![to_sql_version(version)?],
        )
    }

    fn not_deployed_changes(
        &self,
        version: u64,
        statuses: &[ChangeStatus],
    ) -> Result<Vec<ModelChange>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = (0..statuses.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let mut values = vec![Value::Integer(to_sql_version(version)?)];
        values.extend(statuses.iter().map(|s| Value::Text(s.as_str().to_string())));
        self.query_changes(
            &format!(
                "applied_version <= ?1 AND deployed_on IS NULL AND status IN ({})",
                placeholders
            ),
            params_from_iter(values),
        )
    }

    fn changes_by_request_id(&self, request_id: &RequestId) -> Result<Vec<ModelChange>> {
        self.query_changes(
            "request_id = ?1 AND applied_version IS NULL",
            params![request_id.as_str()],
        )
    }

    fn not_deployed_changes_for_path(
        &self,
        path_prefix: &str,
        version: u64,
    ) -> Result<Vec<ModelChange>> {
        // substr keeps the prefix match case-sensitive, unlike LIKE
        self.query_changes(
            "deployed_on IS NULL AND applied_version <= ?2 \
             AND substr(path, 1, length(?1)) = ?1",
            params![path_prefix, to_sql_version(version)?],
        )
    }

    fn last_known_model_version(&self) -> Result<Option<u64>> {
        let max: Option<i64> = self
            .conn
            .query_row(
                "SELECT MAX(applied_version) FROM model_changes",
                [],
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;
        max.map(|v| u64::try_from(v).map_err(|_| corrupt_row(0, "negative applied_version")))
            .transpose()
    }

    fn mark_deployed(&mut self, ids: &[ChangeId], deployed_on: DateTime<Utc>) -> Result<usize> {
        let tx = self.conn.transaction().map_err(from_rusqlite)?;
        let mut affected = 0;
        {
            let mut stmt = tx
                .prepare(
                    "UPDATE model_changes
                     SET deployed_on = ?1, failed_on = NULL, status_message = NULL, status = ?2
                     WHERE id = ?3 AND applied_version IS NOT NULL AND deployed_on IS NULL",
                )
                .map_err(from_rusqlite)?;
            for id in ids {
                affected += stmt
                    .execute(params![
                        deployed_on.timestamp_millis(),
                        ChangeStatus::Deployed.as_str(),
                        to_sql_id(*id)?,
                    ])
                    .map_err(from_rusqlite)?;
            }
        }
        tx.commit().map_err(from_rusqlite)?;

        tracing::debug!(requested = ids.len(), affected, "Marked changes deployed");
        Ok(affected)
    }

    fn mark_failed(
        &mut self,
        id: ChangeId,
        failed_on: DateTime<Utc>,
        message: &str,
    ) -> Result<bool> {
        let affected = self
            .conn
            .execute(
                "UPDATE model_changes
                 SET failed_on = ?1, status_message = ?2, status = ?3
                 WHERE id = ?4 AND applied_version IS NOT NULL AND deployed_on IS NULL",
                params![
                    failed_on.timestamp_millis(),
                    message,
                    ChangeStatus::Failed.as_str(),
                    to_sql_id(id)?,
                ],
            )
            .map_err(from_rusqlite)?;
        Ok(affected == 1)
    }
}

/// Raw `model_changes` row, before domain validation
struct ChangeRow {
    id: i64,
    request_id: String,
    path: String,
    initial_version: i64,
    applied_version: Option<i64>,
    change_data: String,
    created_by: String,
    created_on: i64,
    applied_on: Option<i64>,
    deployed_on: Option<i64>,
    failed_on: Option<i64>,
    status_message: Option<String>,
}

impl ChangeRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            request_id: row.get(1)?,
            path: row.get(2)?,
            initial_version: row.get(3)?,
            applied_version: row.get(4)?,
            change_data: row.get(5)?,
            created_by: row.get(6)?,
            created_on: row.get(7)?,
            applied_on: row.get(8)?,
            deployed_on: row.get(9)?,
            failed_on: row.get(10)?,
            status_message: row.get(11)?,
        })
    }

    fn into_change(self) -> Result<ModelChange> {
        let id = self.id;
        let version = |v: i64| {
            u64::try_from(v).map_err(|_| corrupt_row(id, "negative version"))
        };
        let millis = |ms: i64| {
            DateTime::from_timestamp_millis(ms).ok_or_else(|| corrupt_row(id, "timestamp out of range"))
        };

        let change_id = from_sql_id(id)?;
        let state = ChangeState::from_milestones(
            change_id,
            self.applied_version.map(version).transpose()?,
            self.applied_on.map(millis).transpose()?,
            self.deployed_on.map(millis).transpose()?,
            self.failed_on.map(millis).transpose()?,
            self.status_message,
        )?;

        Ok(ModelChange {
            id: ChangeId(change_id),
            request_id: RequestId::from_string(self.request_id),
            path: self.path,
            initial_version: version(self.initial_version)?,
            change_data: self.change_data,
            created_by: self.created_by,
            created_on: millis(self.created_on)?,
            state,
        })
    }
}

/// Persist every lifecycle column from the change's current state
fn write_state(conn: &Connection, change: &ModelChange) -> Result<()> {
    conn.execute(
        "UPDATE model_changes
         SET applied_version = ?1, applied_on = ?2, deployed_on = ?3, failed_on = ?4,
             status = ?5, status_message = ?6
         WHERE id = ?7",
        params![
            change.applied_version().map(to_sql_version).transpose()?,
            change.applied_on().map(|t| t.timestamp_millis()),
            change.deployed_on().map(|t| t.timestamp_millis()),
            change.failed_on().map(|t| t.timestamp_millis()),
            change.status().as_str(),
            change.status_message(),
            to_sql_id(change.id)?,
        ],
    )
    .map_err(from_rusqlite)?;
    Ok(())
}

fn to_sql_version(version: u64) -> Result<i64> {
    i64::try_from(version).map_err(|_| version_out_of_range(version))
}

fn to_sql_id(id: ChangeId) -> Result<i64> {
    to_sql_version(id.get())
}

fn from_sql_id(id: i64) -> Result<u64> {
    u64::try_from(id).map_err(|_| corrupt_row(id, "negative id"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory_starts_empty() {
        let ledger = SqliteLedger::open_in_memory().unwrap();
        assert_eq!(ledger.last_known_model_version().unwrap(), None);
        assert!(ledger.changes_since(0).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_row_is_reported() {
        let mut ledger = SqliteLedger::open_in_memory().unwrap();
        let c = ledger
            .append_change(&RequestId::from("r"), "class=a", 1, "u", "{}")
            .unwrap();
        // Bypass the CHECK constraints to simulate a row written by another tool
        ledger
            .connection()
            .execute_batch(
                "PRAGMA ignore_check_constraints = ON;
                 UPDATE model_changes SET deployed_on = 1 WHERE id = 1;",
            )
            .unwrap();
        let err = ledger.get_change(c.id).unwrap_err();
        assert_eq!(err.kind(), modelsync_core::ExErrorKind::Internal);
    }

    #[test]
    fn test_empty_status_set_returns_nothing() {
        let mut ledger = SqliteLedger::open_in_memory().unwrap();
        let c = ledger
            .append_change(&RequestId::from("r"), "class=a", 1, "u", "{}")
            .unwrap();
        ledger.mark_applied(c.id, 1).unwrap();
        assert!(ledger.not_deployed_changes(5, &[]).unwrap().is_empty());
    }
}
