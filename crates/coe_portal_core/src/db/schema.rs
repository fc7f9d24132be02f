//! Ordered schema steps for the session database.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Step {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

// Versions must stay strictly increasing.
const STEPS: &[Step] = &[Step {
    version: 1,
    name: "session_kv",
    sql: include_str!("sql/0001_session_kv.sql"),
}];

/// Highest schema version this build knows how to produce.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Reads `PRAGMA user_version`.
pub fn current_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Applies every step newer than the stored version, one transaction per
/// step. Returns how many steps ran.
pub fn upgrade(conn: &mut Connection) -> DbResult<usize> {
    let stored = current_version(conn)?;
    let latest = latest_version();
    if stored > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stored,
            latest_supported: latest,
        });
    }

    let mut applied = 0;
    for step in STEPS.iter().filter(|step| step.version > stored) {
        let as_migration_error = |source| DbError::Migration {
            version: step.version,
            name: step.name,
            source,
        };
        let tx = conn.transaction().map_err(as_migration_error)?;
        tx.execute_batch(step.sql).map_err(as_migration_error)?;
        tx.pragma_update(None, "user_version", step.version)
            .map_err(as_migration_error)?;
        tx.commit().map_err(as_migration_error)?;

        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
        applied += 1;
    }
    Ok(applied)
}
