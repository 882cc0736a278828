//! SQLite implementation of the mastery store.

use crate::db::date_utils::{parse_sql_timestamp, to_sql_upper_bound, to_stored_timestamp};
use crate::db::error::DbError;
use crate::db::schema::{SCHEMA, SCHEMA_VERSION};
use chrono::{DateTime, Utc};
use mastery_core::{MasteryRecord, MasteryStore, ProgressStatus, StoreError};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

type Result<T> = std::result::Result<T, StoreError>;

const COLUMNS: &str = "user_id, item_id, mastery_score, status, ease_factor, interval_days, \
     due_at, consecutive_correct, last_reviewed_at, attempt_count, revision";

/// SQLite-backed `MasteryStore`. The connection is shared behind a mutex.
pub struct SqliteMasteryStore {
    conn: Mutex<Connection>,
}

impl SqliteMasteryStore {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> std::result::Result<Self, DbError> {
        let conn = Connection::open(path)?;
        Self::initialize(conn)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> std::result::Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> std::result::Result<Self, DbError> {
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        let version: i32 =
            conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
        if version != SCHEMA_VERSION {
            return Err(DbError::InvalidData(format!(
                "unsupported schema version {version}"
            )));
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::result::Result<MutexGuard<'_, Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    /// Number of records stored for a user.
    pub fn count_for_user(&self, user_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM mastery_records WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(DbError::from)?;
        Ok(count as usize)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<MasteryRecord> {
        let status_str: String = row.get(3)?;
        let status = ProgressStatus::from_str(&status_str)
            .ok_or_else(|| conversion_error(3, format!("unknown status {status_str}")))?;
        let due_str: String = row.get(6)?;
        let due_at = parse_sql_timestamp(&due_str)
            .ok_or_else(|| conversion_error(6, format!("bad due_at {due_str}")))?;
        let last_reviewed_at = match row.get::<_, Option<String>>(8)? {
            Some(s) => Some(
                parse_sql_timestamp(&s)
                    .ok_or_else(|| conversion_error(8, format!("bad last_reviewed_at {s}")))?,
            ),
            None => None,
        };
        let revision: i64 = row.get(10)?;

        Ok(MasteryRecord {
            user_id: row.get(0)?,
            item_id: row.get(1)?,
            mastery_score: row.get(2)?,
            status,
            ease_factor: row.get(4)?,
            interval_days: row.get(5)?,
            due_at,
            consecutive_correct: row.get(7)?,
            last_reviewed_at,
            attempt_count: row.get(9)?,
            revision: u64::try_from(revision)
                .map_err(|_| conversion_error(10, format!("negative revision {revision}")))?,
        })
    }

    fn select_one(conn: &Connection, user_id: &str, item_id: &str) -> std::result::Result<Option<MasteryRecord>, DbError> {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM mastery_records WHERE user_id = ?1 AND item_id = ?2"),
            params![user_id, item_id],
            Self::row_to_record,
        )
        .optional()
        .map_err(Into::into)
    }
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, message.into())
}

fn revision_param(revision: u64) -> std::result::Result<i64, DbError> {
    i64::try_from(revision).map_err(|_| DbError::InvalidData(format!("revision {revision} out of range")))
}

impl MasteryStore for SqliteMasteryStore {
    fn get(&self, user_id: &str, item_id: &str) -> Result<Option<MasteryRecord>> {
        let conn = self.conn()?;
        Ok(Self::select_one(&conn, user_id, item_id)?)
    }

    fn get_or_create(
        &self,
        user_id: &str,
        item_id: &str,
        now: DateTime<Utc>,
        initial_ease: f64,
    ) -> Result<MasteryRecord> {
        let created_due = to_stored_timestamp(now)?;
        let conn = self.conn()?;
        // The primary key makes the insert a no-op for an existing record.
        conn.execute(
            "INSERT OR IGNORE INTO mastery_records (user_id, item_id, ease_factor, due_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, item_id, initial_ease, created_due],
        )
        .map_err(DbError::from)?;

        Self::select_one(&conn, user_id, item_id)?.ok_or_else(|| {
            StoreError::Unavailable(format!("record {user_id}/{item_id} vanished after insert"))
        })
    }

    fn save(&self, record: &MasteryRecord) -> Result<MasteryRecord> {
        let expected = revision_param(record.revision)?;
        let due_str = to_stored_timestamp(record.due_at)?;
        let last_str = record
            .last_reviewed_at
            .map(to_stored_timestamp)
            .transpose()?;
        let conn = self.conn()?;

        let updated = conn
            .execute(
                "UPDATE mastery_records SET mastery_score = ?3, status = ?4, ease_factor = ?5, interval_days = ?6,
                    due_at = ?7, consecutive_correct = ?8, last_reviewed_at = ?9, attempt_count = ?10,
                    revision = revision + 1
                 WHERE user_id = ?1 AND item_id = ?2 AND revision = ?11",
                params![
                    record.user_id,
                    record.item_id,
                    record.mastery_score,
                    record.status.as_str(),
                    record.ease_factor,
                    record.interval_days,
                    due_str,
                    record.consecutive_correct,
                    last_str,
                    record.attempt_count,
                    expected,
                ],
            )
            .map_err(DbError::from)?;

        let stored = if updated == 1 {
            true
        } else if record.revision == 0 {
            let inserted = conn
                .execute(
                    &format!(
                        "INSERT OR IGNORE INTO mastery_records ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1)"
                    ),
                    params![
                        record.user_id,
                        record.item_id,
                        record.mastery_score,
                        record.status.as_str(),
                        record.ease_factor,
                        record.interval_days,
                        due_str,
                        record.consecutive_correct,
                        last_str,
                        record.attempt_count,
                    ],
                )
                .map_err(DbError::from)?;
            inserted == 1
        } else {
            false
        };

        if !stored {
            return Err(StoreError::Conflict {
                user_id: record.user_id.clone(),
                item_id: record.item_id.clone(),
                expected_revision: record.revision,
            });
        }
        Ok(MasteryRecord {
            revision: record.revision + 1,
            ..record.clone()
        })
    }

    fn list_due_for_user(
        &self,
        user_id: &str,
        as_of: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<MasteryRecord>> {
        let Some(bound) = to_sql_upper_bound(as_of) else {
            return Ok(Vec::new());
        };
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM mastery_records
                 WHERE user_id = ?1 AND due_at <= ?2
                 ORDER BY due_at ASC, item_id ASC
                 LIMIT ?3"
            ))
            .map_err(DbError::from)?;

        let records = stmt
            .query_map(
                params![user_id, bound, limit as i64],
                Self::row_to_record,
            )
            .map_err(DbError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(DbError::from)?;

        Ok(records)
    }

    fn list_unseen_for_user(
        &self,
        user_id: &str,
        candidate_item_ids: &[String],
        limit: usize,
    ) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT 1 FROM mastery_records WHERE user_id = ?1 AND item_id = ?2")
            .map_err(DbError::from)?;

        let mut considered = HashSet::new();
        let mut unseen = Vec::new();
        for item_id in candidate_item_ids {
            if unseen.len() >= limit {
                break;
            }
            if !considered.insert(item_id.as_str()) {
                continue;
            }
            let exists = stmt
                .exists(params![user_id, item_id])
                .map_err(DbError::from)?;
            if !exists {
                unseen.push(item_id.clone());
            }
        }
        Ok(unseen)
    }

    fn list_weakest_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<MasteryRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM mastery_records
                 WHERE user_id = ?1 AND attempt_count > 0 AND status != 'MASTERED'
                 ORDER BY mastery_score ASC, item_id ASC
                 LIMIT ?2"
            ))
            .map_err(DbError::from)?;

        let records = stmt
            .query_map(params![user_id, limit as i64], Self::row_to_record)
            .map_err(DbError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(DbError::from)?;

        Ok(records)
    }
}
