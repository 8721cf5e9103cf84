//! Processing ledger contracts and SQLite implementation.
//!
//! # Responsibility
//! - Record which lifelog ids have been handled, with timestamps.
//! - Answer membership, count and last-activity queries.
//!
//! # Invariants
//! - One row per lifelog id; a second insert for the same id fails with
//!   `StorageError::Duplicate` and leaves the table unchanged.
//! - Rows are never updated or deleted here.
//! - After `close()`, every operation fails with `StorageError::Closed`.

use crate::db::{open_location, DbError, StorageLocation};
use crate::model::lifelog::Lifelog;
use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

pub type StorageResult<T> = Result<T, StorageError>;

/// Ledger failure, distinguishable from application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("ledger is closed")]
    Closed,
    #[error("lifelog already recorded in ledger: {id}")]
    Duplicate { id: String },
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("invalid persisted ledger data: {0}")]
    InvalidData(String),
}

impl StorageError {
    /// True when the write was rejected by the unique id constraint.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    /// True when the ledger can no longer serve any request.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One persisted ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: String,
    pub title: String,
    /// Assigned by storage at insert time.
    pub processed_at: DateTime<Utc>,
    /// Copied from the lifelog when it was recorded.
    pub updated_at: String,
    pub start_time: String,
    pub end_time: String,
}

/// Persistent "already handled" store keyed by lifelog id.
pub trait ProcessedLedger {
    fn is_processed(&self, id: &str) -> StorageResult<bool>;
    /// Records `lifelog` as handled. Fails with `Duplicate` if already present.
    fn mark_as_processed(&self, lifelog: &Lifelog) -> StorageResult<()>;
    fn count(&self) -> StorageResult<u64>;
    fn last_processed_at(&self) -> StorageResult<Option<DateTime<Utc>>>;
    /// Releases storage. Closing twice is a no-op.
    fn close(&mut self) -> StorageResult<()>;
}

/// SQLite-backed ledger owning its connection.
pub struct SqliteLedger {
    conn: Option<Connection>,
}

impl SqliteLedger {
    /// Opens (and migrates) the ledger at `location`.
    pub fn open(location: &StorageLocation) -> StorageResult<Self> {
        let conn = open_location(location)?;
        info!("event=ledger_open module=repo status=ok location={location}");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Self::open(&StorageLocation::InMemory)
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn: Some(conn) }
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    /// Reads back one recorded entry.
    pub fn get_entry(&self, id: &str) -> StorageResult<Option<LedgerEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, processed_at, updated_at, start_time, end_time
             FROM processed_lifelogs
             WHERE id = ?1;",
        )?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row)?));
        }

        Ok(None)
    }

    fn conn(&self) -> StorageResult<&Connection> {
        self.conn.as_ref().ok_or(StorageError::Closed)
    }
}

impl ProcessedLedger for SqliteLedger {
    fn is_processed(&self, id: &str) -> StorageResult<bool> {
        let found = self
            .conn()?
            .query_row(
                "SELECT 1 FROM processed_lifelogs WHERE id = ?1;",
                [id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn mark_as_processed(&self, lifelog: &Lifelog) -> StorageResult<()> {
        let result = self.conn()?.execute(
            "INSERT INTO processed_lifelogs (
                id,
                title,
                updated_at,
                start_time,
                end_time
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                lifelog.id.as_str(),
                lifelog.title.as_str(),
                lifelog.updated_at.as_str(),
                lifelog.start_time.as_str(),
                lifelog.end_time.as_str(),
            ],
        );

        match result {
            Ok(_) => {
                debug!(
                    "event=ledger_write module=repo status=ok lifelog_id={}",
                    lifelog.id
                );
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StorageError::Duplicate {
                    id: lifelog.id.clone(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM processed_lifelogs;",
            [],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| StorageError::InvalidData(format!("negative ledger count `{count}`")))
    }

    fn last_processed_at(&self) -> StorageResult<Option<DateTime<Utc>>> {
        let latest: Option<i64> = self.conn()?.query_row(
            "SELECT MAX(processed_at) FROM processed_lifelogs;",
            [],
            |row| row.get(0),
        )?;

        latest.map(millis_to_datetime).transpose()
    }

    fn close(&mut self) -> StorageResult<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        conn.close().map_err(|(_, err)| StorageError::from(err))?;
        info!("event=ledger_close module=repo status=ok");
        Ok(())
    }
}

fn parse_entry_row(row: &Row<'_>) -> StorageResult<LedgerEntry> {
    Ok(LedgerEntry {
        id: row.get("id")?,
        title: row.get("title")?,
        processed_at: millis_to_datetime(row.get("processed_at")?)?,
        updated_at: row.get("updated_at")?,
        start_time: row.get("start_time")?,
        end_time: row.get("end_time")?,
    })
}

fn millis_to_datetime(millis: i64) -> StorageResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        StorageError::InvalidData(format!(
            "invalid processed_at value `{millis}` in processed_lifelogs.processed_at"
        ))
    })
}
