//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the processing ledger.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Ledger reads/writes happen only after migrations succeed.

use std::path::{Path, PathBuf};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_location};

/// Default ledger file, named after the dataset it tracks.
pub const DEFAULT_DATABASE_PATH: &str = "lifelogs.db";
/// Storage path value that selects an ephemeral in-memory database.
pub const IN_MEMORY_SENTINEL: &str = ":memory:";

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

/// Where the ledger database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// Durable file that survives process restarts.
    File(PathBuf),
    /// Scoped to the connection lifetime; used by tests.
    InMemory,
}

impl StorageLocation {
    /// Parses a configured path, honoring the `:memory:` sentinel.
    ///
    /// A blank value falls back to [`DEFAULT_DATABASE_PATH`].
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" => Self::File(PathBuf::from(DEFAULT_DATABASE_PATH)),
            IN_MEMORY_SENTINEL => Self::InMemory,
            path => Self::File(PathBuf::from(path)),
        }
    }

    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    pub fn is_durable(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

impl Default for StorageLocation {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_DATABASE_PATH))
    }
}

impl std::fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::InMemory => f.write_str(IN_MEMORY_SENTINEL),
        }
    }
}
