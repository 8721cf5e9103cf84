//! Ledger schema migrations.
//!
//! # Responsibility
//! - Keep the ordered list of schema steps for the processed-lifelog ledger.
//! - Bring a connection up to the newest step inside one transaction.
//!
//! # Invariants
//! - Step versions start at 1 and increase by exactly 1.
//! - Steps are additive only: new tables, columns or indexes.
//! - `PRAGMA user_version` always equals the last step applied.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "processed_lifelogs",
    sql: include_str!("0001_processed_lifelogs.sql"),
}];

/// Newest schema version this binary can write.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Reads the schema version recorded in the database header.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Applies every step newer than the stored version and returns the applied
/// versions in order. An up-to-date database yields an empty list.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the database was written by a
///   newer binary.
/// - Any SQLite failure; the transaction is rolled back and the stored
///   version is unchanged.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<Vec<u32>> {
    let from_version = schema_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > from_version)
        .collect();
    if pending.is_empty() {
        debug!("event=db_migrate module=db status=skip version={from_version}");
        return Ok(Vec::new());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={from_version} to_version={latest} steps={}",
        pending.len()
    );
    Ok(pending.iter().map(|step| step.version).collect())
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, schema_version, SCHEMA_STEPS};
    use rusqlite::Connection;

    #[test]
    fn step_versions_are_contiguous_from_one() {
        for (index, step) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step `{}`", step.name);
        }
    }

    #[test]
    fn reports_applied_steps_then_nothing_on_rerun() {
        let mut conn = Connection::open_in_memory().expect("open in-memory db");
        assert_eq!(schema_version(&conn).expect("read version"), 0);

        let applied = apply_migrations(&mut conn).expect("first apply");
        assert_eq!(applied, (1..=latest_version()).collect::<Vec<_>>());
        assert_eq!(schema_version(&conn).expect("read version"), latest_version());

        let applied = apply_migrations(&mut conn).expect("second apply");
        assert!(applied.is_empty());
    }
}
