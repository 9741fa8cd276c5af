//! Schema migrations tracked through `PRAGMA user_version`.
//!
//! # Invariants
//! - Versions start at 1 and increase by exactly one per step.
//! - Each step commits together with its `user_version` bump, so an
//!   interrupted upgrade resumes from the last finished step.
//! - A database stamped with a newer version than this binary knows is
//!   refused, never downgraded.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "activity_indexes",
        sql: include_str!("0002_activity_indexes.sql"),
    },
];

/// Highest schema version this build can produce.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Brings the connection up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = schema_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    for migration in pending(from_version) {
        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        tx.commit()?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    Ok(())
}

fn pending(from_version: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS
        .iter()
        .filter(move |migration| migration.version > from_version)
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending, MIGRATIONS};

    #[test]
    fn versions_are_contiguous_from_one() {
        for (index, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version as usize, index + 1, "{}", migration.name);
        }
        assert_eq!(latest_version() as usize, MIGRATIONS.len());
    }

    #[test]
    fn pending_skips_applied_steps() {
        let names: Vec<&str> = pending(1).map(|migration| migration.name).collect();
        assert_eq!(names, vec!["activity_indexes"]);
        assert_eq!(pending(latest_version()).count(), 0);
    }
}
